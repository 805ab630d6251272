//! Replace rules. Statement replacements under a block keep the old
//! statement's punctuation in place; everything else substitutes the range.

use super::Patcher;
use crate::core::Result;
use crate::tree::{NodeId, NodeKind};

impl Patcher<'_> {
    /// Replaces the target node with the translated text of a destination
    /// node.
    pub(super) fn replace_code(&mut self, with: NodeId, target_id: NodeId) -> Result<()> {
        let src_span = self.destination.node(with)?.span;
        let raw = self.destination.text(src_span)?.to_string();
        let text = self
            .translator
            .translate(self.destination, with, raw)?
            .trim()
            .to_string();
        if text.is_empty() {
            tracing::debug!("replacement text empty after translation, nothing to do");
            return Ok(());
        }

        let tgt = self.target.node(target_id)?;
        let tgt_span = tgt.span;
        let tgt_kind = tgt.kind;
        let file = self.target.file_name().to_string();
        let parent = tgt.parent.map(|p| self.target.node(p)).transpose()?;
        let index = self.target.position_in_parent(target_id)?.unwrap_or(0);

        match parent {
            Some(parent)
                if parent.kind == NodeKind::CompoundStmt && tgt_kind != NodeKind::Macro =>
            {
                // Splice the new statement in front and drop the old body;
                // the old statement's terminator survives to close the new
                // text.
                let (pos, stmt) = if index > 0 {
                    let prev = parent.children[index - 1];
                    (self.target.deletion_range(prev)?.end, format!("\n{text}"))
                } else {
                    (tgt_span.begin, text)
                };
                self.rewriter.insert(&file, pos, stmt)?;
                self.rewriter.remove(&file, tgt_span)
            }
            Some(parent) if parent.kind == NodeKind::IfStmt && index != 0 => {
                self.rewriter
                    .replace(&file, tgt_span, format!("\n{text};"))
            }
            _ => self.rewriter.replace(&file, tgt_span, text),
        }
    }
}
