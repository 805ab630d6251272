//! Delete rules, routed by the kind of the deleted node.

use super::Patcher;
use crate::core::{PatchError, Result, Span};
use crate::tree::{ranges, NodeId, NodeKind};

impl Patcher<'_> {
    /// Removes a target node's text. `is_move` marks the delete half of a
    /// Move, which keeps different bounds for operator nodes.
    pub(super) fn delete_code(&mut self, id: NodeId, is_move: bool) -> Result<()> {
        let node = self.target.node(id)?;
        let file = self.target.file_name().to_string();
        let span = node.span;

        match node.kind {
            NodeKind::BinaryOperator => {
                let op = node.operator_span.ok_or(PatchError::RangeUnavailable {
                    file: file.clone(),
                    span,
                })?;
                if is_move {
                    // The move takes the whole expression; deleting from
                    // the node begin instead of the operator location.
                    let range = self.target.deletion_range(id)?;
                    self.rewriter.remove(&file, range)
                } else {
                    self.rewriter.remove(&file, op)
                }
            }

            NodeKind::DeclStmt | NodeKind::Macro => {
                let range = self.target.deletion_range(id)?;
                self.rewriter.remove_with_line(&file, range)
            }

            NodeKind::MemberExpr => {
                // Drop the access operator and the member, keep the base.
                let op = node.operator_span.ok_or(PatchError::RangeUnavailable {
                    file: file.clone(),
                    span,
                })?;
                self.rewriter
                    .remove_with_line(&file, Span::new(op.begin, span.end))
            }

            NodeKind::ParenExpr => {
                if span.len() < 2 {
                    return Err(PatchError::RangeUnavailable { file, span });
                }
                self.rewriter
                    .remove(&file, Span::new(span.begin, span.begin + 1))?;
                self.rewriter
                    .remove(&file, Span::new(span.end - 1, span.end))
            }

            NodeKind::IfStmt => {
                // Remove the keyword and condition, keep the then-branch.
                let then_begin = node
                    .children
                    .get(1)
                    .map(|&then| self.target.node(then).map(|n| n.span.begin))
                    .transpose()?
                    .ok_or(PatchError::RangeUnavailable {
                        file: file.clone(),
                        span,
                    })?;
                self.rewriter
                    .remove_with_line(&file, Span::new(span.begin, then_begin))
            }

            NodeKind::DeclRefExpr => {
                let mut range = self.target.deletion_range(id)?;
                if let Some(parent) = node.parent.and_then(|p| self.target.get(p)) {
                    let is_last_arg = parent.kind == NodeKind::CallExpr
                        && parent.children.len() > 1
                        && parent.children.last() == Some(&id);
                    if is_last_arg {
                        // The final argument absorbs its leading comma and
                        // keeps its own end, or the closing paren would go
                        // with it.
                        let begin =
                            ranges::absorb_leading_comma(self.target.source(), span.begin);
                        range = Span::new(begin, span.end);
                    }
                }
                self.rewriter.remove_with_line(&file, range)
            }

            _ => {
                let range = self.target.deletion_range(id)?;
                self.rewriter.remove_with_line(&file, range)
            }
        }
    }
}
