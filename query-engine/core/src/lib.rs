//! Construction, validation, serialization and unpacking of client query documents.

pub mod error;
pub mod query_document;

pub use error::*;
pub use query_document::*;
