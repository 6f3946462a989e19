//! Error types for contract checking.

use std::path::PathBuf;

use thiserror::Error;

/// Input failures. A contract violation is not an error; it is a failing
/// [`crate::ContractReport`].
#[derive(Error, Debug)]
pub enum ContractError {
    /// Input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema pack is not valid JSON or has the wrong shape.
    #[error("Invalid schema pack: {0}")]
    InvalidPack(String),

    /// Schema pack declares no domains.
    #[error("Schema pack is empty")]
    EmptyPack,

    /// Gate source declares no rules.
    #[error("Invalid gate source: {0}")]
    InvalidGateSource(String),

    /// Live schema could not be fetched.
    #[error("Failed to fetch schema: {0}")]
    Fetch(String),
}

pub type ContractResult<T> = Result<T, ContractError>;
