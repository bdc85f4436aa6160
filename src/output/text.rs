//! Plain-text rendering of a call tree for terminal output.

use crate::aggregator::TreeNode;

/// Render a tree as indented lines
///
/// **Public** - used by the `build --summary` command
///
/// Each line shows the frame name and its duration in milliseconds,
/// or `(unresolved)` for placeholders. Nodes deeper than `max_depth`
/// are collapsed into a single `...` line under their parent.
pub fn render_text_tree(root: &TreeNode<'_>, max_depth: usize) -> String {
    let mut lines = Vec::new();
    render_node(root, "", "", 0, max_depth, &mut lines);
    lines.join("\n")
}

fn render_node(
    node: &TreeNode<'_>,
    prefix: &str,
    child_prefix: &str,
    depth: usize,
    max_depth: usize,
    lines: &mut Vec<String>,
) {
    lines.push(format!("{}{} {}", prefix, node.name, describe(node)));

    if node.children.is_empty() {
        return;
    }

    if depth >= max_depth {
        lines.push(format!("{}└── ... ({} more)", child_prefix, node.children.len()));
        return;
    }

    let last = node.children.len() - 1;
    for (i, child) in node.children.iter().enumerate() {
        let (branch, indent) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        render_node(
            child,
            &format!("{}{}", child_prefix, branch),
            &format!("{}{}", child_prefix, indent),
            depth + 1,
            max_depth,
            lines,
        );
    }
}

fn describe(node: &TreeNode<'_>) -> String {
    match node.duration() {
        Some(d) => format!("[{} ms]", d.num_milliseconds()),
        None if node.is_placeholder() => "(unresolved)".to_string(),
        None => "[?]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build;
    use crate::parser::schema::{InvocationRecord, Perf, RunRecord};
    use chrono::{TimeZone, Utc};

    fn sample_run() -> RunRecord {
        let t = |ms: i64| Utc.timestamp_millis_opt(ms).unwrap();
        RunRecord::new(
            Perf::new(t(0), t(100)),
            vec![
                InvocationRecord::new(&["chain", "retriever"], Perf::new(t(10), t(30))),
                InvocationRecord::new(&["chain", "llm"], Perf::new(t(40), t(90))),
            ],
        )
    }

    #[test]
    fn test_render_text_tree() {
        let run = sample_run();
        let tree = build(&run);
        let text = render_text_tree(&tree, 8);

        let expected = [
            "App [100 ms]",
            "└── chain (unresolved)",
            "    ├── retriever [20 ms]",
            "    └── llm [50 ms]",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_text_tree_depth_limit() {
        let run = sample_run();
        let tree = build(&run);
        let text = render_text_tree(&tree, 1);

        assert!(text.contains("chain (unresolved)"));
        assert!(text.contains("... (2 more)"));
        assert!(!text.contains("retriever"));
    }
}
