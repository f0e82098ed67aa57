//! Renders a recipe's [`StepTree`] as an HTML table. Every non-empty leaf step
//! gets a row; its ancestors are emitted as cells to its right, each spanning
//! the rows of all of its leaves, so that shared parent steps visually merge
//! across the rows they cover.
//!
//! For example, the steps
//!
//! ```text
//! Mix
//!   flour
//!   sugar
//! Bake
//! ```
//!
//! render as a two-column table where `Mix` occupies one cell spanning the
//! `flour` and `sugar` rows, and `Bake` spans both columns of the last row.

use crate::reference::ReferenceExtractor;
use crate::step::{NodeId, StepTree};
use std::collections::HashSet;
use std::fmt::Write;

/// Renders [`StepTree`]s into span tables.
pub struct SpanTableRenderer<'a> {
    extractor: &'a ReferenceExtractor,
}

impl<'a> SpanTableRenderer<'a> {
    pub fn new(extractor: &'a ReferenceExtractor) -> Self {
        SpanTableRenderer { extractor }
    }

    /// Renders the table rows for `tree` preceded by a full-width servings
    /// row.
    pub fn render(&self, tree: &StepTree, servings: &str) -> String {
        let width = 1 + tree.depth();
        let mut out = String::from("<table>");
        // writing to a String never fails
        let _ = write!(
            out,
            r#"<tr><td colspan="{}" style="text-align: center;"><b>Servings:</b> {}</td></tr>"#,
            width, servings
        );
        out.push_str(&self.render_rows(tree));
        out.push_str("</table>");
        out
    }

    /// Renders one `<tr>` per non-empty leaf, in document order.
    pub fn render_rows(&self, tree: &StepTree) -> String {
        let width = 1 + tree.depth();
        let mut printed: HashSet<NodeId> = HashSet::new();
        let mut out = String::new();

        for leaf in tree.all_leaves() {
            let node = &tree[leaf];
            if node.instruction.is_empty() {
                continue;
            }

            out.push_str("<tr>");
            let mut ancestor = match node.parent() {
                None => {
                    let _ = write!(
                        out,
                        r#"<td colspan="{}" style="text-align: center;"><b>{}</b></td>"#,
                        width,
                        self.extractor.link(&node.instruction)
                    );
                    out.push_str("</tr>");
                    continue;
                }
                parent => parent,
            };

            let _ = write!(
                out,
                r#"<td colspan="{}">{}</td>"#,
                width - node.depth(),
                self.extractor.link(&node.instruction)
            );

            while let Some(id) = ancestor {
                if !printed.insert(id) {
                    break;
                }
                let _ = write!(
                    out,
                    r#"<td rowspan="{}">{}</td>"#,
                    printable_leaves(tree, id),
                    self.extractor.link(&tree[id].instruction).replace(',', ",<br>")
                );
                ancestor = tree.parent(id);
            }
            out.push_str("</tr>");
        }
        out
    }
}

/// The number of rows an ancestor cell spans: its leaves that produce a row.
/// This equals [`StepTree::count_leaves`] unless whitespace-only lines were
/// nested beneath it.
fn printable_leaves(tree: &StepTree, id: NodeId) -> usize {
    tree.leaves(id)
        .into_iter()
        .filter(|&leaf| !tree[leaf].instruction.is_empty())
        .count()
}
