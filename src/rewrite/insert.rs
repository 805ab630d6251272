//! Insert rules, routed by the kind of the target parent: the syntactic
//! context, not the inserted node, dictates the edit shape.

use super::Patcher;
use crate::core::{PatchError, Result, Span};
use crate::translate::filter_skipped_calls;
use crate::tree::{ranges, NodeId, NodeKind, SyntaxTree};

impl Patcher<'_> {
    /// Inserts the text of `node` (from `source_tree`) into the target
    /// parent at the given child offset. The extracted subtree is copied
    /// as one byte span, then identifier-translated and skip-filtered.
    pub(super) fn insert_code(
        &mut self,
        source_tree: &SyntaxTree,
        node: NodeId,
        parent_id: NodeId,
        offset: usize,
    ) -> Result<()> {
        let parent = self.target.node(parent_id)?;
        let parent_kind = parent.kind;
        let parent_span = parent.span;
        let parent_operator_span = parent.operator_span;
        let children = parent.children.clone();
        let n = children.len();
        let file = self.target.file_name().to_string();
        let src_kind = source_tree.node(node)?.kind;

        // List-shaped parents re-splice raw element text; statement-shaped
        // parents take the range-expanded extraction so trailing
        // delimiters travel with the statement.
        let extract = match parent_kind {
            NodeKind::EnumDecl
            | NodeKind::RecordDecl
            | NodeKind::InitListExpr
            | NodeKind::MemberExpr => source_tree.node(node)?.span,
            _ => source_tree.deletion_range(node)?,
        };
        let raw = source_tree.text(extract)?.to_string();
        let filtered = filter_skipped_calls(source_tree, node, raw, self.skip_list)?;
        let translated = self.translator.translate(source_tree, node, filtered)?;
        let text = translated.trim().to_string();
        if text.is_empty() {
            tracing::debug!("insert text empty after filtering, nothing to do");
            return Ok(());
        }

        match parent_kind {
            NodeKind::CompoundStmt => {
                let mut stmt = text;
                if matches!(src_kind, NodeKind::BinaryOperator | NodeKind::ReturnStmt)
                    && !stmt.contains(';')
                {
                    stmt.push(';');
                }
                let stmt = format!("\n{stmt}\n");
                let pos = if offset == 0 || n == 0 {
                    // Right after the opening brace.
                    ranges::first_token_end(self.target.source(), parent_span.begin)
                } else {
                    let prev = children[offset.min(n) - 1];
                    let mut anchor = prev;
                    // A trailing cast keeps its payload in the operand;
                    // land after the operand instead.
                    if self.target.node(prev)?.kind == NodeKind::CStyleCastExpr {
                        if let Some(&operand) = self.target.node(prev)?.children.last() {
                            anchor = operand;
                        }
                    }
                    self.target.deletion_range(anchor)?.end
                };
                self.rewriter.insert(&file, pos, stmt)
            }

            NodeKind::IfStmt => {
                if offset == 0 {
                    let pos = match children.first() {
                        Some(&cond) => self.target.node(cond)?.span.begin,
                        None => parent_span.begin,
                    };
                    self.rewriter.insert(&file, pos, format!("{text} "))
                } else if n == 0 {
                    self.rewriter.insert(&file, parent_span.end, format!(" {text}"))
                } else {
                    let stmt = if offset > 1 {
                        format!("\nelse {text}")
                    } else {
                        format!(" {text}")
                    };
                    let prev = children[offset.min(n) - 1];
                    let pos = self.target.node(prev)?.span.end;
                    self.rewriter.insert(&file, pos, stmt)
                }
            }

            NodeKind::BinaryOperator => {
                let op = parent_operator_span.ok_or(PatchError::RangeUnavailable {
                    file: file.clone(),
                    span: parent_span,
                })?;
                if offset == 0 {
                    self.rewriter.insert(&file, op.begin, format!("{text} "))
                } else {
                    self.rewriter.insert(&file, op.end, format!(" {text}"))
                }
            }

            NodeKind::CallExpr => {
                // Offsets address argument positions; children[0] is the
                // callee.
                let num_args = n.saturating_sub(1);
                if offset < num_args {
                    let arg = children[offset + 1];
                    let pos = self.target.node(arg)?.span.begin;
                    self.rewriter.insert(&file, pos, format!("{text}, "))
                } else {
                    let pos = closing_paren(self.target, parent_span);
                    let stmt = if num_args == 0 {
                        text
                    } else {
                        format!(", {text}")
                    };
                    self.rewriter.insert(&file, pos, stmt)
                }
            }

            NodeKind::VarDecl => {
                if offset == 0 {
                    self.rewriter
                        .insert(&file, parent_span.begin, format!("{text} "))
                } else {
                    // Initializer grafted onto the declaration: strip
                    // statement punctuation from the payload first.
                    let cleaned: String = text
                        .chars()
                        .map(|c| if c == ';' || c == ',' { ' ' } else { c })
                        .collect();
                    let stmt = format!(" = {}", cleaned.trim());
                    self.rewriter.insert(&file, parent_span.end, stmt)
                }
            }

            NodeKind::EnumDecl => {
                if offset < n {
                    let pos = self.target.node(children[offset])?.span.begin;
                    self.rewriter.insert(&file, pos, format!("{text}, "))
                } else if n > 0 {
                    let pos = self.target.node(children[n - 1])?.span.end;
                    self.rewriter.insert(&file, pos, format!(", {text}"))
                } else {
                    let pos = closing_brace(self.target, parent_span);
                    self.rewriter.insert(&file, pos, text)
                }
            }

            NodeKind::RecordDecl => {
                if offset < n {
                    let pos = self.target.node(children[offset])?.span.begin;
                    self.rewriter.insert(&file, pos, format!("{text}\n"))
                } else if n > 0 {
                    let pos = self.target.deletion_range(children[n - 1])?.end;
                    self.rewriter.insert(&file, pos, format!("\n{text}"))
                } else {
                    let pos = closing_brace(self.target, parent_span);
                    self.rewriter.insert(&file, pos, format!("{text}\n"))
                }
            }

            NodeKind::InitListExpr => {
                if offset < n {
                    let pos = self.target.node(children[offset])?.span.begin;
                    self.rewriter.insert(&file, pos, format!("{text},\n"))
                } else if n > 0 {
                    let pos = self.target.node(children[n - 1])?.span.end;
                    self.rewriter.insert(&file, pos, format!(", {text}"))
                } else {
                    let pos = closing_brace(self.target, parent_span);
                    self.rewriter.insert(&file, pos, text)
                }
            }

            NodeKind::LabelStmt => {
                let mut stmt = text;
                if !stmt.contains(';') {
                    stmt.push_str("; ");
                }
                if offset == 0 || n == 0 {
                    let pos = match children.first() {
                        Some(&first) => self.target.node(first)?.span.begin,
                        None => parent_span.end,
                    };
                    self.rewriter.insert(&file, pos, stmt)
                } else {
                    let prev = children[offset.min(n) - 1];
                    let pos = self.target.node(prev)?.span.end;
                    self.rewriter.insert(&file, pos, format!(" {stmt}"))
                }
            }

            NodeKind::MemberExpr => {
                let pos = if offset == 0 {
                    parent_span.begin
                } else {
                    // The member-name location sits right after the access
                    // operator.
                    parent_operator_span
                        .map(|s| s.end)
                        .unwrap_or(parent_span.end)
                };
                self.rewriter.insert(&file, pos, text)
            }

            NodeKind::CaseStmt => {
                if offset == 0 || n == 0 {
                    let pos = match children.first() {
                        Some(&value) => self.target.node(value)?.span.begin,
                        None => parent_span.end,
                    };
                    self.rewriter.insert(&file, pos, format!("{text} "))
                } else if offset < n {
                    let pos = self.target.node(children[offset])?.span.begin;
                    self.rewriter.insert(&file, pos, format!("{text} "))
                } else {
                    let pos = self.target.deletion_range(children[n - 1])?.end;
                    self.rewriter.insert(&file, pos, format!(" {text}"))
                }
            }

            _ => {
                if offset == 0 && n == 0 {
                    self.rewriter
                        .insert(&file, parent_span.begin, format!("{text} "))
                } else if offset == 0 {
                    let pos = ranges::first_token_end(self.target.source(), parent_span.begin);
                    self.rewriter.insert(&file, pos, format!(" {text} "))
                } else if offset <= n.saturating_sub(1) {
                    let pos = self.target.node(children[offset])?.span.begin;
                    self.rewriter.insert(&file, pos, format!("{text} "))
                } else if n > 0 {
                    let pos = self.target.node(children[n - 1])?.span.end;
                    self.rewriter.insert(&file, pos, format!(" {text}"))
                } else {
                    self.rewriter
                        .insert(&file, parent_span.begin, format!("{text} "))
                }
            }
        }
    }
}

/// Offset of the closing parenthesis of a call span.
fn closing_paren(tree: &SyntaxTree, span: Span) -> usize {
    if tree.source().as_bytes().get(span.end.wrapping_sub(1)) == Some(&b')') {
        span.end - 1
    } else {
        span.end
    }
}

/// Offset of the closing brace of a braced construct.
fn closing_brace(tree: &SyntaxTree, span: Span) -> usize {
    if tree.source().as_bytes().get(span.end.wrapping_sub(1)) == Some(&b'}') {
        span.end - 1
    } else {
        span.end
    }
}
