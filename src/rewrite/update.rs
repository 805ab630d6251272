//! Update rules: change a node's value (identifier, literal, operator)
//! while leaving its structure alone.

use super::Patcher;
use crate::core::{PatchError, Result};
use crate::translate::replace_all;
use crate::tree::{NodeId, NodeKind};

impl Patcher<'_> {
    /// Rewrites the target node's value to the destination node's value.
    pub(super) fn update_code(&mut self, to: NodeId, target_id: NodeId) -> Result<()> {
        let upd = self.destination.node(to)?;
        let tgt = self.target.node(target_id)?;
        let file = self.target.file_name().to_string();

        // Operator updates swap the operator token in place; the operand
        // gap between the operator and the right-hand side stays as it is.
        if tgt.kind == NodeKind::BinaryOperator {
            let op = tgt.operator_span.ok_or(PatchError::RangeUnavailable {
                file: file.clone(),
                span: tgt.span,
            })?;
            let spelling = match (&upd.value, upd.operator_span) {
                (Some(v), _) => v.clone(),
                (None, Some(span)) => self.destination.text(span)?.to_string(),
                (None, None) => {
                    return Err(PatchError::RangeUnavailable {
                        file,
                        span: tgt.span,
                    })
                }
            };
            let spelling = self.translator.translate(self.destination, to, spelling)?;
            return self.rewriter.replace(&file, op, spelling);
        }

        let range = tgt.span;
        let mut new_value = upd.value.clone().unwrap_or_default();
        let mut old_value = tgt.value.clone().unwrap_or_default();

        if upd.kind == NodeKind::StringLiteral {
            new_value = format!("\"{new_value}\"");
        }
        if tgt.kind == NodeKind::StringLiteral {
            old_value = format!("\"{old_value}\"");
        }

        if tgt.kind == NodeKind::MemberExpr {
            // Member values spell the access operator; strip it when
            // present so bare names pass through untouched.
            new_value = strip_member_separator(&new_value).to_string();
            old_value = strip_member_separator(&old_value).to_string();
        } else if matches!(
            tgt.kind,
            NodeKind::IntegerLiteral | NodeKind::FloatingLiteral
        ) {
            // Prefer the lexed spelling over the node value: suffixes and
            // bases survive that way.
            new_value = self.destination.node_text(to)?.to_string();
            old_value = self.target.node_text(target_id)?.to_string();
        }

        if upd.kind == NodeKind::StringLiteral {
            new_value.retain(|c| c != '\n');
        }

        let new_value = self.translator.translate(self.destination, to, new_value)?;

        if new_value.is_empty() {
            // Nothing to splice textually; substitute the whole range with
            // the update node's source text.
            let fallback = self.destination.node_text(to)?.to_string();
            return self.rewriter.replace(&file, range, fallback);
        }

        let statement = self.target.text(range)?.to_string();
        let updated = if tgt.kind == NodeKind::StringLiteral {
            splice_string_literal(&statement, &old_value, &new_value)
        } else {
            replace_all(&statement, &old_value, &new_value)
        };

        if tgt.kind == NodeKind::Macro {
            // In-place first; when another edit already claimed the range,
            // climb to the parent and splice the updated text there.
            match self.rewriter.replace(&file, range, updated.clone()) {
                Err(PatchError::ReplacementOverlap { .. }) => {
                    let parent = tgt.parent.ok_or(PatchError::RangeUnavailable {
                        file: file.clone(),
                        span: range,
                    })?;
                    let parent_span = self.target.node(parent)?.span;
                    let parent_stmt = self.target.text(parent_span)?.to_string();
                    let spliced = replace_all(&parent_stmt, &statement, &updated);
                    self.rewriter.replace(&file, parent_span, spliced)
                }
                other => other,
            }
        } else {
            self.rewriter.replace(&file, range, updated)
        }
    }
}

/// Drops a leading `->` or `.` from a member value. Values that do not
/// start with a separator come back unchanged.
fn strip_member_separator(value: &str) -> &str {
    value
        .strip_prefix("->")
        .or_else(|| value.strip_prefix('.'))
        .unwrap_or(value)
}

/// String-literal matching encodes spaces as `_` on both sides so spaces in
/// the literal cannot disturb the search; the splice itself happens on the
/// unencoded text at the matched offset.
fn splice_string_literal(statement: &str, old: &str, new: &str) -> String {
    let encoded_statement = statement.replace(' ', "_");
    let encoded_old = old.replace(' ', "_");
    match encoded_statement.find(&encoded_old) {
        Some(pos) => {
            let mut out = String::with_capacity(statement.len() + new.len());
            out.push_str(&statement[..pos]);
            out.push_str(new);
            out.push_str(&statement[pos + old.len()..]);
            out
        }
        None => statement.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_member_separator() {
        assert_eq!(strip_member_separator("->len"), "len");
        assert_eq!(strip_member_separator(".cap"), "cap");
        assert_eq!(strip_member_separator("plain"), "plain");
    }

    #[test]
    fn test_splice_string_literal_with_spaces() {
        let out = splice_string_literal("\"hello world\"", "\"hello world\"", "\"bye now\"");
        assert_eq!(out, "\"bye now\"");
    }

    #[test]
    fn test_splice_missing_match_is_identity() {
        let out = splice_string_literal("\"abc\"", "\"zzz\"", "\"new\"");
        assert_eq!(out, "\"abc\"");
    }
}
