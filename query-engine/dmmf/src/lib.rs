//! The DMMF (data model meta format) as consumed by the client: the serde AST of the JSON
//! document and a resolved, read-only helper answering schema lookups.

mod error;
mod helper;
mod serialization_ast;
mod types;

#[cfg(test)]
mod tests;

pub use error::DmmfError;
pub use helper::DmmfHelper;
pub use serialization_ast::*;
pub use types::*;
