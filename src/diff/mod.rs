/*!
# Tree differencing

A coarse two-pass matcher that turns a pair of trees into edit-script
lines. Identical subtrees are paired top-down by structural hash, then
leftovers are paired against their matched parents by kind and position.
The result is deliberately conservative: unmatched destination subtrees
become whole-subtree `Insert`s (their inner nodes ride along as one byte
span when applied), unmatched source subtrees become `Delete`s, value
disagreements become `Update`s and re-parented pairs become `Move`s.
*/

use crate::core::Result;
use crate::script::{EditOp, NodeSpec};
use crate::tree::{NodeId, SyntaxTree};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// A computed matching between a source and a destination tree.
pub struct TreeDiff<'a> {
    src: &'a SyntaxTree,
    dst: &'a SyntaxTree,
    src_to_dst: Vec<Option<NodeId>>,
    dst_to_src: Vec<Option<NodeId>>,
}

impl<'a> TreeDiff<'a> {
    pub fn new(src: &'a SyntaxTree, dst: &'a SyntaxTree) -> Result<TreeDiff<'a>> {
        let mut diff = TreeDiff {
            src,
            dst,
            src_to_dst: vec![None; src.len()],
            dst_to_src: vec![None; dst.len()],
        };
        diff.match_identical_subtrees()?;
        // The roots always correspond; pass 2 descends from there.
        if !src.is_empty()
            && !dst.is_empty()
            && diff.src_to_dst[0].is_none()
            && diff.dst_to_src[0].is_none()
        {
            diff.src_to_dst[0] = Some(dst.root());
            diff.dst_to_src[0] = Some(src.root());
        }
        diff.match_by_parent_and_kind()?;
        Ok(diff)
    }

    /// Matched `(src, dst)` pairs in source pre-order.
    pub fn matches(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.src_to_dst
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|d| (NodeId(i as u32), d)))
    }

    pub fn mapped_to_dst(&self, src: NodeId) -> Option<NodeId> {
        self.src_to_dst.get(src.index()).copied().flatten()
    }

    pub fn mapped_to_src(&self, dst: NodeId) -> Option<NodeId> {
        self.dst_to_src.get(dst.index()).copied().flatten()
    }

    /// Pass 1: greedy top-down pairing of structurally identical subtrees.
    fn match_identical_subtrees(&mut self) -> Result<()> {
        let src_hashes = subtree_hashes(self.src)?;
        let dst_hashes = subtree_hashes(self.dst)?;
        let mut by_hash: HashMap<u64, Vec<NodeId>> = HashMap::new();
        for id in self.dst.preorder() {
            by_hash.entry(dst_hashes[id.index()]).or_default().push(id);
        }

        for src_id in self.src.preorder() {
            if self.src_to_dst[src_id.index()].is_some() {
                continue;
            }
            let Some(candidates) = by_hash.get(&src_hashes[src_id.index()]) else {
                continue;
            };
            let Some(&dst_id) = candidates
                .iter()
                .find(|d| self.dst_to_src[d.index()].is_none())
            else {
                continue;
            };
            // Identical hashes mean identical shapes; pair the subtrees
            // node for node.
            let src_ids: Vec<u32> = self.src.subtree(src_id)?.collect();
            let dst_ids: Vec<u32> = self.dst.subtree(dst_id)?.collect();
            debug_assert_eq!(src_ids.len(), dst_ids.len());
            for (s, d) in src_ids.into_iter().zip(dst_ids) {
                self.src_to_dst[s as usize] = Some(NodeId(d));
                self.dst_to_src[d as usize] = Some(NodeId(s));
            }
        }
        Ok(())
    }

    /// Pass 2: pair leftovers whose parents matched, by kind and child
    /// position. This is where `Update` and `Move` candidates come from.
    fn match_by_parent_and_kind(&mut self) -> Result<()> {
        for src_id in self.src.preorder() {
            if self.src_to_dst[src_id.index()].is_some() {
                continue;
            }
            let node = self.src.node(src_id)?;
            let Some(dst_parent) = node
                .parent
                .and_then(|p| self.src_to_dst[p.index()])
            else {
                continue;
            };
            let position = self.src.position_in_parent(src_id)?.unwrap_or(0);
            let dst_children = self.dst.children(dst_parent)?;
            let candidate = dst_children
                .iter()
                .enumerate()
                .filter(|(_, d)| self.dst_to_src[d.index()].is_none())
                .filter(|(_, d)| {
                    self.dst
                        .get(**d)
                        .map(|n| n.kind == node.kind)
                        .unwrap_or(false)
                })
                .min_by_key(|(i, _)| i.abs_diff(position))
                .map(|(_, d)| *d);
            if let Some(dst_id) = candidate {
                self.src_to_dst[src_id.index()] = Some(dst_id);
                self.dst_to_src[dst_id.index()] = Some(src_id);
            }
        }
        Ok(())
    }

    /// Emits the edit script transforming the source tree into the
    /// destination tree. Script node references follow the patcher's
    /// convention: payload nodes are destination ids, targets source ids.
    pub fn script(&self) -> Result<Vec<EditOp>> {
        let mut ops = Vec::new();

        for dst_id in self.dst.preorder() {
            let dst_node = self.dst.node(dst_id)?;
            match self.mapped_to_src(dst_id) {
                None => {
                    // Whole inserted subtrees travel as one operation; the
                    // descendants are part of the copied byte span.
                    let parent_matched = dst_node
                        .parent
                        .and_then(|p| self.mapped_to_src(p));
                    let Some(src_parent) = parent_matched else {
                        continue;
                    };
                    let offset = self.insert_offset(dst_id)?;
                    ops.push(EditOp::Insert {
                        node: self.spec_dst(dst_id)?,
                        parent: self.spec_src(src_parent)?,
                        offset,
                    });
                }
                Some(src_id) => {
                    let src_node = self.src.node(src_id)?;
                    if src_node.value != dst_node.value {
                        ops.push(EditOp::Update {
                            target: self.spec_src(src_id)?,
                            to: self.spec_dst(dst_id)?,
                        });
                    }
                    let src_parent = src_node.parent;
                    let expected = dst_node
                        .parent
                        .and_then(|p| self.mapped_to_src(p));
                    if src_parent != expected {
                        if let Some(new_parent) = expected {
                            let offset = self.insert_offset(dst_id)?;
                            ops.push(EditOp::Move {
                                node: self.spec_src(src_id)?,
                                parent: self.spec_src(new_parent)?,
                                offset,
                            });
                        }
                    }
                }
            }
        }

        // Deletions last, roots only: descendants disappear with them.
        for src_id in self.src.preorder() {
            if self.mapped_to_dst(src_id).is_some() {
                continue;
            }
            let node = self.src.node(src_id)?;
            let parent_unmatched = node
                .parent
                .map(|p| self.mapped_to_dst(p).is_none())
                .unwrap_or(false);
            if parent_unmatched {
                continue;
            }
            ops.push(EditOp::Delete {
                node: self.spec_src(src_id)?,
            });
        }

        Ok(ops)
    }

    /// Script offset for inserting at this destination node's position.
    /// Call-expression offsets address argument slots, so the callee child
    /// does not count.
    fn insert_offset(&self, dst_id: NodeId) -> Result<usize> {
        let position = self.dst.position_in_parent(dst_id)?.unwrap_or(0);
        let parent_kind = self
            .dst
            .node(dst_id)?
            .parent
            .map(|p| self.dst.node(p).map(|n| n.kind))
            .transpose()?;
        Ok(match parent_kind {
            Some(crate::tree::NodeKind::CallExpr) => position.saturating_sub(1),
            _ => position,
        })
    }

    fn spec_src(&self, id: NodeId) -> Result<NodeSpec> {
        Ok(NodeSpec {
            kind: self.src.node(id)?.kind,
            id,
        })
    }

    fn spec_dst(&self, id: NodeId) -> Result<NodeSpec> {
        Ok(NodeSpec {
            kind: self.dst.node(id)?.kind,
            id,
        })
    }
}

/// Structural hash per subtree: kind, value, identifier and the child
/// hashes in order. Children precede parents in the computation, which the
/// reverse id walk gives for free.
fn subtree_hashes(tree: &SyntaxTree) -> Result<Vec<u64>> {
    let mut hashes = vec![0u64; tree.len()];
    for idx in (0..tree.len()).rev() {
        let id = NodeId(idx as u32);
        let node = tree.node(id)?;
        let mut hasher = DefaultHasher::new();
        node.kind.hash(&mut hasher);
        node.value.hash(&mut hasher);
        node.identifier.hash(&mut hasher);
        for child in &node.children {
            hashes[child.index()].hash(&mut hasher);
        }
        hashes[idx] = hasher.finish();
    }
    Ok(hashes)
}
