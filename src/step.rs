//! Defines the [`StepTree`] forest and its [`StepNode`]s. Each node is one
//! line of a recipe's procedure. Nodes are stored in an arena owned by the
//! tree and refer to each other (parent and children) by [`NodeId`], so the
//! forest can be walked upwards without shared mutable pointers.

use std::fmt::{self, Write};

/// The number of spaces per depth level when printing an outline.
const OUTLINE_INDENT: usize = 2;

/// A handle to a [`StepNode`] inside of a [`StepTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One parsed instruction line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepNode {
    /// The trimmed instruction text. May be empty for lines which only exist
    /// to carry indentation.
    pub instruction: String,

    /// The recipe titles referenced from the instruction text.
    pub references: Vec<String>,

    depth: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl StepNode {
    /// Creates a detached node. The depth and parent are assigned when the
    /// node is attached to a [`StepTree`].
    pub fn new(instruction: impl Into<String>, references: Vec<String>) -> StepNode {
        StepNode {
            instruction: instruction.into(),
            references,
            depth: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    /// The depth of the node; roots are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An append-only forest of [`StepNode`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepTree {
    nodes: Vec<StepNode>,
    roots: Vec<NodeId>,
    depth: usize,
}

impl StepTree {
    pub fn new() -> StepTree {
        StepTree::default()
    }

    /// Attaches `node` as a new top-level root and returns its id.
    pub fn add_root(&mut self, mut node: StepNode) -> NodeId {
        node.depth = 0;
        node.parent = None;
        let id = self.insert(node);
        self.roots.push(id);
        id
    }

    /// Appends `node` to `parent`'s children and returns the new child's
    /// depth, which is always one more than the parent's. The forest's
    /// maximum depth is updated accordingly.
    pub fn add(&mut self, parent: NodeId, mut node: StepNode) -> usize {
        let depth = self[parent].depth + 1;
        node.depth = depth;
        node.parent = Some(parent);
        let id = self.insert(node);
        self.nodes[parent.0].children.push(id);
        self.depth = self.depth.max(depth);
        depth
    }

    /// Like [`StepTree::add`], but returns the id of the new child.
    pub(crate) fn add_child(&mut self, parent: NodeId, node: StepNode) -> NodeId {
        self.add(parent, node);
        NodeId(self.nodes.len() - 1)
    }

    fn insert(&mut self, node: StepNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// The maximum depth of any node in the forest.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&StepNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    /// Returns 1 for a leaf, otherwise the sum of the leaf counts of its
    /// children.
    pub fn count_leaves(&self, id: NodeId) -> usize {
        let node = &self[id];
        if node.is_leaf() {
            1
        } else {
            node.children.iter().map(|&c| self.count_leaves(c)).sum()
        }
    }

    /// The leaf descendants of `id` in left-to-right depth-first order. A leaf
    /// is its own sole leaf.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.collect_leaves(id, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, id: NodeId, leaves: &mut Vec<NodeId>) {
        let node = &self[id];
        if node.is_leaf() {
            leaves.push(id);
        }
        for &child in &node.children {
            self.collect_leaves(child, leaves);
        }
    }

    /// Every leaf in the forest, in document order.
    pub fn all_leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        for &root in &self.roots {
            self.collect_leaves(root, &mut leaves);
        }
        leaves
    }

    /// Every node in the forest, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &StepNode)> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = &self[id];
            stack.extend(node.children.iter().rev().copied());
            Some((id, node))
        })
    }

    /// Renders the forest as indented text, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for (_, node) in self.iter() {
            // writing to a String never fails
            let _ = writeln!(
                out,
                "{:indent$}{}",
                "",
                node.instruction,
                indent = node.depth * OUTLINE_INDENT
            );
        }
        out
    }
}

impl std::ops::Index<NodeId> for StepTree {
    type Output = StepNode;

    fn index(&self, id: NodeId) -> &StepNode {
        &self.nodes[id.0]
    }
}

impl fmt::Display for StepTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.outline())
    }
}
