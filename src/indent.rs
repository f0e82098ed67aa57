//! Builds a [`StepTree`] from indented lines of text. Deeper indentation nests
//! a line under the most recent line with a strictly shallower depth; a line
//! with no such ancestor starts a new top-level step.

use crate::reference::ReferenceExtractor;
use crate::step::{NodeId, StepNode, StepTree};

/// The default number of whitespace characters per indentation level.
pub const DEFAULT_INDENT_WIDTH: usize = 2;

/// Incrementally builds a [`StepTree`], one line at a time.
pub struct IndentTreeBuilder<'a> {
    tree: StepTree,

    /// The most recently added node.
    cursor: Option<NodeId>,

    /// Whitespace characters per indentation level. A tab always counts as a
    /// whole level.
    indent_width: usize,

    extractor: &'a ReferenceExtractor,
}

impl<'a> IndentTreeBuilder<'a> {
    /// Creates a builder. An `indent_width` of zero is treated as one.
    pub fn new(extractor: &'a ReferenceExtractor, indent_width: usize) -> Self {
        IndentTreeBuilder {
            tree: StepTree::new(),
            cursor: None,
            indent_width: indent_width.max(1),
            extractor,
        }
    }

    /// Measures a raw line's leading whitespace in indentation levels.
    pub fn indent_level(&self, line: &str) -> usize {
        let width: usize = line
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| if c == '\t' { self.indent_width } else { 1 })
            .sum();
        width / self.indent_width
    }

    /// Adds a raw, untrimmed line.
    pub fn push_line(&mut self, line: &str) -> NodeId {
        let level = self.indent_level(line);
        self.push(line.trim(), level)
    }

    /// Adds a line of already-trimmed `text` at indentation `level` and
    /// returns the id of the new node.
    pub fn push(&mut self, text: &str, level: usize) -> NodeId {
        let node = StepNode::new(text, self.extractor.extract(text));

        let mut cursor = match self.cursor {
            None => {
                let id = self.tree.add_root(node);
                self.cursor = Some(id);
                return id;
            }
            Some(cursor) => cursor,
        };

        while self.tree[cursor].depth() >= level {
            match self.tree.parent(cursor) {
                Some(parent) => cursor = parent,
                None => break,
            }
        }

        let id = if self.tree[cursor].depth() < level {
            self.tree.add_child(cursor, node)
        } else {
            self.tree.add_root(node)
        };
        self.cursor = Some(id);
        id
    }

    pub fn finish(self) -> StepTree {
        self.tree
    }
}

/// Parses a multi-line procedure block into a [`StepTree`].
pub fn parse_steps(block: &str, extractor: &ReferenceExtractor, indent_width: usize) -> StepTree {
    let mut builder = IndentTreeBuilder::new(extractor, indent_width);
    for line in block.split('\n') {
        builder.push_line(line.trim_end_matches('\r'));
    }
    builder.finish()
}
