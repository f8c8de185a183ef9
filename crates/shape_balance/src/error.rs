//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, unknown or unregistered descriptors, and failed pool
//! operations. A donor search that finds nothing is not an error; it is reported
//! through [`crate::balance::PassOutcome::NoDonor`].
use thiserror::Error;

use crate::descriptor::DescriptorPair;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown descriptor kind '{name}'")]
    UnknownKind { name: String },

    #[error("pool for {pair} is already registered")]
    DuplicatePair { pair: DescriptorPair },

    #[error("no pool registered for {pair}")]
    UnregisteredPair { pair: DescriptorPair },

    #[error("pool for {pair} is empty")]
    EmptyPool { pair: DescriptorPair },

    #[error("instance index {index} out of range for {pair} (len {len})")]
    IndexOutOfRange {
        pair: DescriptorPair,
        index: usize,
        len: usize,
    },

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
