use dmmf::DmmfError;
use query_core::UnpackError;
use thiserror::Error;
use user_facing_errors::ValidationError;

use crate::EngineError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The arguments of the call do not fit the schema.
    #[error("{}", _0)]
    Validation(#[from] ValidationError),

    /// The client and the schema descriptor disagree, e.g. a model without mappings.
    #[error("{}", _0)]
    Internal(String),

    /// The engine executed the request and reported errors.
    #[error("{}", _0)]
    Engine(String),

    #[error("{}", _0)]
    Transport(#[from] EngineError),
}

impl ClientError {
    pub fn internal(message: impl ToString) -> Self {
        Self::Internal(message.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<DmmfError> for ClientError {
    fn from(e: DmmfError) -> Self {
        Self::internal(e)
    }
}

impl From<UnpackError> for ClientError {
    fn from(e: UnpackError) -> Self {
        Self::internal(format!("Error unpacking the engine response: {}", e))
    }
}
