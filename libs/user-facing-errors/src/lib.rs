//! Rendering of user-facing client errors: the error formats, the invocation header and the
//! annotated echo of the offending arguments.

mod error_format;
mod print_json;
mod print_stack;

pub mod query_engine;

pub use error_format::{ErrorFormat, strip_ansi};
pub use print_json::{MissingItem, PrintJsonWithErrorsArgs, print_json_with_errors, stringify_object};
pub use print_stack::{Callsite, PrintStackArgs, PrintStackResult, print_stack};
pub use query_engine::ValidationError;
