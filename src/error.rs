//! Error type for the core stages.
//!
//! Data-quality problems (bad marker pairs, degenerate epochs, waves outside
//! every window) are never errors: they end up in rejection/overlap logs or
//! drop counts. Only structural problems that would make the output
//! meaningless are reported here.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("empty input: {what}")]
    EmptyInput { what: &'static str },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("non-finite {field} at row {index}")]
    NonFinite { field: &'static str, index: usize },

    #[error("missing required field '{field}' at row {index}")]
    MissingField { field: &'static str, index: usize },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfig { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
