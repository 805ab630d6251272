/*!
# Structural rewriter

Interprets an edit script against the destination and target trees and
accumulates text edits in the replacement buffer. Each operation resolves
its node references (with the script-kind pre-check), routes to a per-kind
handler, and records `(range, text)` pairs; a failed operation aborts the
run and no partial output is produced.
*/

pub mod buffer;
mod delete;
mod insert;
mod replace;
mod update;

pub use buffer::{RewriteOptions, Rewriter};

use crate::core::{PatchError, Result};
use crate::script::{EditOp, EditScript, NodeSpec, ScriptLine};
use crate::translate::{SkipList, Translator, VariableMap};
use crate::tree::{NodeId, SyntaxTree};
use anyhow::Context;

/// Applies edit scripts to the target program's source text.
///
/// Insert/Replace/Update payload nodes are resolved in the destination
/// tree; Move/Delete operate entirely within the target tree. The input
/// trees are borrowed immutably for the patcher's lifetime; the only
/// mutable state is the replacement buffer.
pub struct Patcher<'a> {
    destination: &'a SyntaxTree,
    target: &'a SyntaxTree,
    skip_list: &'a SkipList,
    translator: Translator<'a>,
    rewriter: Rewriter,
}

impl<'a> Patcher<'a> {
    pub fn new(
        destination: &'a SyntaxTree,
        target: &'a SyntaxTree,
        var_map: &'a VariableMap,
        skip_list: &'a SkipList,
    ) -> Patcher<'a> {
        Patcher {
            destination,
            target,
            skip_list,
            translator: Translator::new(var_map),
            rewriter: Rewriter::new(),
        }
    }

    /// Applies every script line in order. The first failure aborts with
    /// the offending line attached.
    pub fn apply(&mut self, script: &EditScript) -> anyhow::Result<()> {
        for line in &script.lines {
            self.apply_line(line)
                .with_context(|| format!("script line {}: {}", line.number, line.text))?;
        }
        Ok(())
    }

    /// Flushes the accumulated edits into the rewritten target buffer.
    /// With no edits recorded the target text passes through unchanged.
    pub fn finish(self) -> Result<String> {
        self.rewriter
            .apply(self.target.file_name(), self.target.source())
    }

    fn apply_line(&mut self, line: &ScriptLine) -> Result<()> {
        tracing::debug!("applying {:?}", line.text);
        self.translator.begin_operation();
        match &line.op {
            EditOp::Insert {
                node,
                parent,
                offset,
            } => {
                let node = self.resolve(self.destination, node)?;
                let parent = self.resolve(self.target, parent)?;
                self.insert_code(self.destination, node, parent, *offset)
            }
            EditOp::Move {
                node,
                parent,
                offset,
            } => {
                let moving = self.resolve(self.target, node)?;
                let parent = self.resolve(self.target, parent)?;
                self.delete_code(moving, true)?;
                self.insert_code(self.target, moving, parent, *offset)
            }
            EditOp::Replace { target, with } => {
                let with = self.resolve(self.destination, with)?;
                let target = self.resolve(self.target, target)?;
                self.replace_code(with, target)
            }
            EditOp::Update { target, to } => {
                let to = self.resolve(self.destination, to)?;
                let target = self.resolve(self.target, target)?;
                self.update_code(to, target)
            }
            EditOp::Delete { node } => {
                let node = self.resolve(self.target, node)?;
                self.delete_code(node, false)
            }
            EditOp::UpdateMove => {
                tracing::warn!("UpdateMove is reserved and ignored");
                Ok(())
            }
        }
    }

    /// Resolves a script node reference and checks the spelled kind against
    /// the resolved node.
    fn resolve(&self, tree: &SyntaxTree, spec: &NodeSpec) -> Result<NodeId> {
        let node = tree.node(spec.id)?;
        if node.kind != spec.kind {
            return Err(PatchError::ScriptKindMismatch {
                id: spec.id.0,
                expected: spec.kind.label().to_string(),
                found: node.kind.label().to_string(),
            });
        }
        Ok(spec.id)
    }
}
