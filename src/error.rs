//! Crate-wide error taxonomy.
//!
//! Two categories cover every failure: [`Error::InvalidArgument`] for
//! malformed input, cross-entity mismatches, and policy violations, and
//! [`Error::InvalidBitstream`] solely for leb128 decode overflow or
//! truncation. There is no fatal/recoverable distinction at this layer; a
//! failing call returns immediately and the caller decides disposition.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed input, mismatched cross-entity data, or a policy violation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An undecodable leb128 byte sequence.
    #[error("invalid bitstream: {0}")]
    InvalidBitstream(String),
}

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn invalid_bitstream(message: impl Into<String>) -> Self {
        Error::InvalidBitstream(message.into())
    }
}
