use thiserror::Error;

/// Failures while mapping an engine response back onto a document. They mean the response
/// does not belong to the document it is unpacked against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnpackError {
    #[error("Could not find field {name} in document {document}")]
    FieldNotFound { name: String, document: String },

    #[error("Can't get children for field {field} with child {child}")]
    NoChildren { field: String, child: String },

    #[error("Can't find child {child} of field {field}")]
    ChildNotFound { child: String, field: String },

    #[error("Can't unpack a response without a field path")]
    EmptyPath,
}
