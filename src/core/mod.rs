/*!
# Core Module

Shared primitives for the patch engine: the error taxonomy and the
source-position types used by the tree view, the rewriters and the CLI tools.
*/

pub mod errors;
pub mod position;

pub use errors::{PatchError, Result};
pub use position::{LineIndex, Position, Span};
