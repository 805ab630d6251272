/*!
# Condition instrumentation

A degenerate one-shot patcher: every `if` condition in the functions of the
main file is wrapped in a `flip_callback(<cond>, <id>)` call, and a header
with the callback's forward declaration is prepended. It exercises the
minimal rewrite contracts: range extraction, text composition and insertion
at a computed location.
*/

use crate::core::Result;
use crate::rewrite::Rewriter;
use crate::tree::{NodeId, NodeKind, SyntaxTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HEADER: &str = "#include <stdbool.h>\n#include <stdint.h>\n\
                      extern bool flip_callback(bool condition, uint32_t id);\n\n";

/// Wraps if-conditions in `flip_callback` calls.
pub struct Instrumenter {
    rng: StdRng,
}

impl Instrumenter {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded construction gives byte-identical output across runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produces the instrumented source text. The input tree is untouched.
    pub fn instrument(&mut self, tree: &SyntaxTree) -> Result<String> {
        let mut rewriter = Rewriter::new();
        let file = tree.file_name().to_string();
        let mut wrapped = 0usize;

        for id in tree.preorder() {
            let node = tree.node(id)?;
            if node.kind != NodeKind::FunctionDecl {
                continue;
            }
            // Only functions of the file being rewritten; declarations
            // dragged in from elsewhere keep their conditions.
            if node.file.as_deref() != Some(tree.file_name()) {
                continue;
            }
            wrapped += self.wrap_conditions(tree, id, &mut rewriter)?;
        }

        if wrapped > 0 {
            rewriter.insert(&file, 0, HEADER)?;
        }
        tracing::info!(count = wrapped, "conditions wrapped");
        rewriter.apply(&file, tree.source())
    }

    fn wrap_conditions(
        &mut self,
        tree: &SyntaxTree,
        root: NodeId,
        rewriter: &mut Rewriter,
    ) -> Result<usize> {
        let file = tree.file_name();
        let mut count = 0usize;
        for id in tree.subtree(root)?.map(NodeId) {
            let node = tree.node(id)?;
            if node.kind != NodeKind::IfStmt {
                continue;
            }
            let Some(&cond) = node.children.first() else {
                continue;
            };
            let cond_span = tree.node(cond)?.span;
            let probe_id: u16 = self.rng.gen();
            rewriter.insert(file, cond_span.begin, "flip_callback( ")?;
            rewriter.insert(file, cond_span.end, format!(" ,{probe_id})"))?;
            count += 1;
        }
        Ok(count)
    }
}

impl Default for Instrumenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind label of the first pre-order node whose line range covers `line`,
/// the root excluded. Mirrors the lookup mode of the original line tool.
pub fn kind_at_line(tree: &SyntaxTree, line: usize) -> Option<&'static str> {
    for id in tree.preorder().skip(1) {
        let node = tree.get(id)?;
        let start = tree.position(node.span.begin).line;
        let end = tree.position(node.span.end).line;
        if start <= line && line <= end {
            return Some(node.kind.label());
        }
    }
    None
}
