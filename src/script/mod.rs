/*!
# Edit script

Line-oriented edit records. One record per line:

```text
Insert  <KindB>(<IdB>) into <KindC>(<IdC>) at <Offset>
Move    <KindB>(<IdB>) into <KindC>(<IdC>) at <Offset>
Replace <KindC>(<IdC>) with <KindB>(<IdB>)
Update  <KindC>(<IdC>) to <KindB>(<IdB>)
Delete  <Kind>(<Id>)
UpdateMove ...   (reserved; parsed and skipped)
```

For `Insert`/`Replace`/`Update`, node `B` lives in the destination tree and
node `C` in the target tree; `Move`/`Delete` name target-tree nodes only.
*/

use crate::core::{PatchError, Result};
use crate::tree::{NodeId, NodeKind};
use std::fmt;
use std::path::Path;

/// A `Kind(Id)` reference into one tree, as spelled by the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub id: NodeId,
}

impl fmt::Display for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}

/// One edit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Insert {
        node: NodeSpec,
        parent: NodeSpec,
        offset: usize,
    },
    Move {
        node: NodeSpec,
        parent: NodeSpec,
        offset: usize,
    },
    Replace {
        target: NodeSpec,
        with: NodeSpec,
    },
    Update {
        target: NodeSpec,
        to: NodeSpec,
    },
    Delete {
        node: NodeSpec,
    },
    /// Reserved by the script grammar; this version ignores it.
    UpdateMove,
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Insert {
                node,
                parent,
                offset,
            } => write!(f, "Insert {node} into {parent} at {offset}"),
            EditOp::Move {
                node,
                parent,
                offset,
            } => write!(f, "Move {node} into {parent} at {offset}"),
            EditOp::Replace { target, with } => write!(f, "Replace {target} with {with}"),
            EditOp::Update { target, to } => write!(f, "Update {target} to {to}"),
            EditOp::Delete { node } => write!(f, "Delete {node}"),
            EditOp::UpdateMove => f.write_str("UpdateMove"),
        }
    }
}

/// A parsed script line with enough context to report failures.
#[derive(Debug, Clone)]
pub struct ScriptLine {
    pub number: usize,
    pub text: String,
    pub op: EditOp,
}

/// An ordered edit script. Script order is the canonical application order;
/// the engine never re-sequences.
#[derive(Debug, Clone, Default)]
pub struct EditScript {
    pub lines: Vec<ScriptLine>,
}

impl EditScript {
    pub fn parse(text: &str) -> Result<EditScript> {
        let mut lines = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let number = idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let op = parse_line(line).map_err(|reason| PatchError::ScriptParse {
                line_number: number,
                line: line.to_string(),
                reason,
            })?;
            lines.push(ScriptLine {
                number,
                text: line.to_string(),
                op,
            });
        }
        Ok(EditScript { lines })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<EditScript> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

fn parse_line(line: &str) -> std::result::Result<EditOp, String> {
    let (op, rest) = line
        .split_once(' ')
        .map(|(op, rest)| (op, rest.trim()))
        .unwrap_or((line, ""));
    match op {
        "Insert" | "Move" => {
            let (node, rest) = take_node_spec(rest)?;
            let rest = expect_word(rest, "into")?;
            let (parent, rest) = take_node_spec(rest)?;
            let rest = expect_word(rest, "at")?;
            let offset: usize = rest
                .trim()
                .parse()
                .map_err(|_| format!("invalid offset {:?}", rest.trim()))?;
            Ok(if op == "Insert" {
                EditOp::Insert {
                    node,
                    parent,
                    offset,
                }
            } else {
                EditOp::Move {
                    node,
                    parent,
                    offset,
                }
            })
        }
        "Replace" => {
            let (target, rest) = take_node_spec(rest)?;
            let rest = expect_word(rest, "with")?;
            let (with, rest) = take_node_spec(rest)?;
            expect_end(rest)?;
            Ok(EditOp::Replace { target, with })
        }
        "Update" => {
            let (target, rest) = take_node_spec(rest)?;
            let rest = expect_word(rest, "to")?;
            let (to, rest) = take_node_spec(rest)?;
            expect_end(rest)?;
            Ok(EditOp::Update { target, to })
        }
        "Delete" => {
            let (node, rest) = take_node_spec(rest)?;
            expect_end(rest)?;
            Ok(EditOp::Delete { node })
        }
        "UpdateMove" => Ok(EditOp::UpdateMove),
        other => Err(format!("unknown operation {other:?}")),
    }
}

/// Parses a leading `Kind(Id)` and returns the remainder.
fn take_node_spec(input: &str) -> std::result::Result<(NodeSpec, &str), String> {
    let input = input.trim_start();
    let open = input
        .find('(')
        .ok_or_else(|| format!("expected Kind(Id) in {input:?}"))?;
    let close = input[open..]
        .find(')')
        .map(|i| open + i)
        .ok_or_else(|| format!("unterminated node reference in {input:?}"))?;
    let label = &input[..open];
    let kind = NodeKind::parse_label(label)
        .ok_or_else(|| format!("unknown node kind {label:?}"))?;
    let id: u32 = input[open + 1..close]
        .parse()
        .map_err(|_| format!("invalid node id in {input:?}"))?;
    Ok((
        NodeSpec {
            kind,
            id: NodeId(id),
        },
        &input[close + 1..],
    ))
}

fn expect_word<'a>(input: &'a str, word: &str) -> std::result::Result<&'a str, String> {
    let input = input.trim_start();
    input
        .strip_prefix(word)
        .map(str::trim_start)
        .ok_or_else(|| format!("expected {word:?} in {input:?}"))
}

fn expect_end(input: &str) -> std::result::Result<(), String> {
    if input.trim().is_empty() {
        Ok(())
    } else {
        Err(format!("trailing garbage {:?}", input.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert() {
        let script =
            EditScript::parse("Insert BinaryOperator(7) into CompoundStmt(3) at 1\n").unwrap();
        assert_eq!(script.len(), 1);
        assert_eq!(
            script.lines[0].op,
            EditOp::Insert {
                node: NodeSpec {
                    kind: NodeKind::BinaryOperator,
                    id: NodeId(7)
                },
                parent: NodeSpec {
                    kind: NodeKind::CompoundStmt,
                    id: NodeId(3)
                },
                offset: 1,
            }
        );
    }

    #[test]
    fn test_parse_all_operations() {
        let text = "Delete DeclStmt(12)\n\
                    Replace IfStmt(4) with IfStmt(9)\n\
                    Update BinaryOperator(5) to BinaryOperator(11)\n\
                    Move ReturnStmt(6) into CompoundStmt(2) at 0\n\
                    UpdateMove ReturnStmt(6) into CompoundStmt(2) at 0\n";
        let script = EditScript::parse(text).unwrap();
        assert_eq!(script.len(), 5);
        assert!(matches!(script.lines[0].op, EditOp::Delete { .. }));
        assert!(matches!(script.lines[1].op, EditOp::Replace { .. }));
        assert!(matches!(script.lines[2].op, EditOp::Update { .. }));
        assert!(matches!(script.lines[3].op, EditOp::Move { .. }));
        assert!(matches!(script.lines[4].op, EditOp::UpdateMove));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let script = EditScript::parse("\n\nDelete Macro(3)\n\n").unwrap();
        assert_eq!(script.len(), 1);
        assert_eq!(script.lines[0].number, 3);
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let err = EditScript::parse("Delete DeclStmt(12)\nFrobnicate Foo(1)\n").unwrap_err();
        match err {
            PatchError::ScriptParse {
                line_number, line, ..
            } => {
                assert_eq!(line_number, 2);
                assert!(line.contains("Frobnicate"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = EditScript::parse("Delete NoSuchKind(12)\n").unwrap_err();
        assert!(matches!(err, PatchError::ScriptParse { .. }));
    }

    #[test]
    fn test_display_round_trips() {
        let text = "Insert BinaryOperator(7) into CompoundStmt(3) at 1\n\
                    Replace IfStmt(4) with IfStmt(9)\n\
                    Delete DeclStmt(12)\n";
        let script = EditScript::parse(text).unwrap();
        let printed: String = script
            .lines
            .iter()
            .map(|l| format!("{}\n", l.op))
            .collect();
        assert_eq!(printed, text);
    }

    #[test]
    fn test_offset_must_be_integer() {
        let err =
            EditScript::parse("Insert VarDecl(1) into CompoundStmt(2) at many\n").unwrap_err();
        assert!(matches!(err, PatchError::ScriptParse { .. }));
    }
}
