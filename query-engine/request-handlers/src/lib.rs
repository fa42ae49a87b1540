//! The client side of a request: from a model action and its arguments to a validated query
//! document, through the engine, and back to typed values.

mod action;
mod config;
mod delegate;
mod engine;
mod error;
mod handler;

pub mod logger;

pub use action::Action;
pub use config::ClientConfig;
pub use delegate::ModelDelegate;
pub use engine::{EngineError, QueryEngine};
pub use error::ClientError;
pub use handler::{RequestHandler, RequestParams, Unpacker};
pub use logger::{LogFormat, Logger};

pub type Result<T> = std::result::Result<T, ClientError>;
