//! Reconstruct the call tree of one app run from its flat call list.
//!
//! Every call carries its own stack (root-to-own-frame). Calls are folded
//! in observation order: each stack is walked from the root, matching
//! existing children by frame name and time containment, creating
//! placeholder ancestors where nothing matches, and finally closing the
//! call's own frame with its timing and record.
//!
//! Example: `[retriever] 0..10` followed by `[retriever, get_context] 2..8`
//! yields `App -> retriever -> get_context`, because 2..8 sits inside 0..10.

use crate::parser::schema::{InvocationRecord, Perf, RunRecord, StackFrame};
use crate::utils::config::{DEFAULT_MAX_DEPTH, ROOT_NODE_NAME};
use crate::utils::error::BuildError;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::Serialize;

/// A node in the reconstructed call tree
///
/// **Public** - handed to output writers and renderers
///
/// `raw` borrows the call that resolved this node from the `RunRecord`.
/// Placeholder ancestors have neither timing nor `raw` until a later call
/// closes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode<'a> {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<&'a InvocationRecord>,

    /// Children in the order their frames were first encountered
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode<'a>>,

    /// Set only on the run node created by `TreeNode::root`
    #[serde(skip)]
    synthetic: bool,
}

impl<'a> TreeNode<'a> {
    /// Create the synthetic root spanning the whole run
    pub fn root(perf: &Perf) -> Self {
        Self {
            name: ROOT_NODE_NAME.to_string(),
            start_time: perf.start_time,
            end_time: perf.end_time,
            raw: None,
            children: Vec::new(),
            synthetic: true,
        }
    }

    /// Create an unresolved ancestor frame
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_time: None,
            end_time: None,
            raw: None,
            children: Vec::new(),
            synthetic: false,
        }
    }

    fn resolved(frame: &StackFrame, call: &'a InvocationRecord) -> Self {
        Self {
            name: frame.name.clone(),
            start_time: call.perf.start_time,
            end_time: call.perf.end_time,
            raw: Some(call),
            children: Vec::new(),
            synthetic: false,
        }
    }

    /// Whether this node can stand for `frame` during `perf`
    ///
    /// Names must be equal. Each known end of this node must enclose the
    /// matching end of `perf`; an unknown end on this node matches anything,
    /// while an unknown end on `perf` cannot be shown to fit inside a known one.
    pub fn matches(&self, frame: &StackFrame, perf: &Perf) -> bool {
        if self.name != frame.name {
            return false;
        }

        let starts_before = match (self.start_time, perf.start_time) {
            (None, _) => true,
            (Some(own), Some(other)) => own <= other,
            (Some(_), None) => false,
        };

        let ends_after = match (self.end_time, perf.end_time) {
            (None, _) => true,
            (Some(own), Some(other)) => own >= other,
            (Some(_), None) => false,
        };

        starts_before && ends_after
    }

    /// Overwrite timing and record with those of `call`
    fn close(&mut self, call: &'a InvocationRecord) {
        self.start_time = call.perf.start_time;
        self.end_time = call.perf.end_time;
        self.raw = Some(call);
    }

    /// True only for the run node, whatever frame names appear below it
    pub fn is_root(&self) -> bool {
        self.synthetic
    }

    /// True until some call closes this node
    pub fn is_placeholder(&self) -> bool {
        self.raw.is_none() && self.start_time.is_none() && self.end_time.is_none()
    }

    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Pre-order traversal yielding `(depth, node)`; this node is depth 0
    pub fn depth_first(&self) -> Vec<(usize, &TreeNode<'a>)> {
        let mut out = Vec::new();
        let mut pending = vec![(0usize, self)];

        while let Some((depth, node)) = pending.pop() {
            out.push((depth, node));
            // Reverse so the first child is visited first
            for child in node.children.iter().rev() {
                pending.push((depth + 1, child));
            }
        }

        out
    }

    /// Follow the first child matching each name in turn
    pub fn find_path<S: AsRef<str>>(&self, names: &[S]) -> Option<&TreeNode<'a>> {
        names.iter().try_fold(self, |node, name| {
            let name: &str = name.as_ref();
            node.children.iter().find(|c| c.name == name)
        })
    }
}

/// Options for a tree build
///
/// **Public** - defaults are lenient, with no node bound and a
/// stack depth bound of `DEFAULT_MAX_DEPTH`
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Reject calls with an empty stack instead of skipping them
    pub strict: bool,

    /// Upper bound on created nodes (root excluded)
    pub max_nodes: Option<usize>,

    /// Upper bound on a single call's stack length
    pub max_depth: Option<usize>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_nodes: None,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Lift the stack depth bound
    pub fn unbounded_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }
}

/// Incremental call tree builder
///
/// **Public** - fold calls one at a time with `insert`, then `finish`
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    root: TreeNode<'a>,
    options: BuildOptions,
    node_count: usize,
    inserted: usize,
    skipped: Vec<usize>,
}

impl<'a> TreeBuilder<'a> {
    /// Start a tree whose root spans `perf`
    pub fn new(perf: &Perf) -> Self {
        Self::with_options(perf, BuildOptions::default())
    }

    pub fn with_options(perf: &Perf, options: BuildOptions) -> Self {
        Self {
            root: TreeNode::root(perf),
            options,
            node_count: 0,
            inserted: 0,
            skipped: Vec::new(),
        }
    }

    /// Fold one call into the tree
    ///
    /// # Errors
    /// * `BuildError::EmptyStack` - strict mode only
    /// * `BuildError::StackTooDeep` - the call's stack exceeds `max_depth`;
    ///   the tree is left untouched and the call is listed in `skipped`
    /// * `BuildError::NodeLimitExceeded` - the configured bound was reached
    pub fn insert(&mut self, call: &'a InvocationRecord) -> Result<(), BuildError> {
        let index = self.inserted;
        self.inserted += 1;

        if call.stack.is_empty() {
            if self.options.strict {
                return Err(BuildError::EmptyStack { index });
            }
            // Nothing to nest under; the tree is left untouched
            warn!("Skipping call {} with empty stack", index);
            self.skipped.push(index);
            return Ok(());
        }

        let depth = call.stack.len();
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                self.skipped.push(index);
                return Err(BuildError::StackTooDeep { index, depth });
            }
        }

        let last = depth - 1;
        let mut node = &mut self.root;

        for (depth, frame) in call.stack.iter().enumerate() {
            let found = node
                .children
                .iter()
                .position(|child| child.matches(frame, &call.perf));

            if depth == last {
                match found {
                    Some(i) => node.children[i].close(call),
                    None => {
                        Self::reserve(&mut self.node_count, self.options.max_nodes)?;
                        node.children.push(TreeNode::resolved(frame, call));
                    }
                }
                break;
            }

            let i = match found {
                Some(i) => i,
                None => {
                    Self::reserve(&mut self.node_count, self.options.max_nodes)?;
                    node.children.push(TreeNode::placeholder(frame.name.clone()));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[i];
        }

        Ok(())
    }

    fn reserve(node_count: &mut usize, max_nodes: Option<usize>) -> Result<(), BuildError> {
        if let Some(limit) = max_nodes {
            if *node_count >= limit {
                return Err(BuildError::NodeLimitExceeded(limit));
            }
        }
        *node_count += 1;
        Ok(())
    }

    /// Nodes created so far, root excluded
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Indices of calls left out of the tree (empty or too-deep stacks)
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    pub fn root(&self) -> &TreeNode<'a> {
        &self.root
    }

    pub fn finish(self) -> TreeNode<'a> {
        self.root
    }
}

/// Build the call tree of a run
///
/// **Public** - main entry point for tree building
///
/// Lenient: calls with an empty stack or a stack deeper than
/// `DEFAULT_MAX_DEPTH` are skipped (and logged), so this never fails.
pub fn build(run: &RunRecord) -> TreeNode<'_> {
    let mut builder = TreeBuilder::new(&run.perf);

    for call in &run.calls {
        // Only per-call rejections are possible without a node bound
        if let Err(e) = builder.insert(call) {
            warn!("Skipping call: {}", e);
        }
    }

    debug!(
        "Built tree with {} nodes from {} calls",
        builder.node_count(),
        run.calls.len()
    );

    builder.finish()
}

/// Build the call tree of a run with explicit options
///
/// **Public** - strict validation and size bounds
///
/// # Errors
/// * `BuildError::EmptyStack` - a call has no stack and `strict` is set
/// * `BuildError::StackTooDeep` - a call's stack exceeds `max_depth`
/// * `BuildError::NodeLimitExceeded` - the tree outgrew `max_nodes`
pub fn build_with_options(
    run: &RunRecord,
    options: BuildOptions,
) -> Result<TreeNode<'_>, BuildError> {
    let mut builder = TreeBuilder::with_options(&run.perf, options);

    for call in &run.calls {
        builder.insert(call)?;
    }

    debug!(
        "Built tree with {} nodes from {} calls ({} skipped)",
        builder.node_count(),
        run.calls.len(),
        builder.skipped().len()
    );

    Ok(builder.finish())
}
