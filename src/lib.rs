/*!
# astgraft

Source-to-source tools that transplant and instrument C code at the
syntax-tree level. Given the syntax trees of two revisions of a donor
program and of a related target program, an edit script naming nodes by
kind and id, and a variable map translating identifiers between the
programs, the engine rewrites the target's source text to incorporate the
edits.

## Architecture

```text
astgraft
├── core        - Error taxonomy, byte spans, line index
├── tree        - Pre-order node arena, tree-sitter C builder, range
│                 engine, JSON/text dump
├── script      - Edit-script records and line parser
├── translate   - Variable map, skip list, identifier translator
├── rewrite     - Replacement buffer and the per-kind rewriters
├── diff        - Coarse top-down differ emitting script lines
└── instrument  - flip_callback condition wrapping
```

## Tools

- `tree-dump` - JSON or text dump of a file's syntax tree
- `tree-diff` - edit-script lines between two revisions
- `patcher` - applies a script to the target program
- `instrumenter` - wraps if-conditions in `flip_callback` probes

## Library usage

```rust,no_run
use astgraft::{EditScript, Patcher, SkipList, SyntaxTree, VariableMap};

# fn main() -> anyhow::Result<()> {
let destination = SyntaxTree::parse_file("fixed.c")?;
let target = SyntaxTree::parse_file("vulnerable.c")?;
let script = EditScript::load("edits.script")?;
let map = VariableMap::load("vars.map")?;
let skip = SkipList::default();

let mut patcher = Patcher::new(&destination, &target, &map, &skip);
patcher.apply(&script)?;
print!("{}", patcher.finish()?);
# Ok(())
# }
```
*/

pub mod core;
pub mod diff;
pub mod instrument;
pub mod rewrite;
pub mod script;
pub mod translate;
pub mod tree;

pub use crate::core::{LineIndex, PatchError, Position, Result, Span};
pub use diff::TreeDiff;
pub use instrument::Instrumenter;
pub use rewrite::{Patcher, RewriteOptions, Rewriter};
pub use script::{EditOp, EditScript, NodeSpec};
pub use translate::{SkipList, Translator, VariableMap};
pub use tree::{Node, NodeId, NodeKind, SyntaxTree};
