//! Error types shared by every container in the crate.
//!
//! Positional access is strict: an index outside `[0, len)` is always an
//! `OutOfRange` error carrying the offending index and the current length.
//! Key-based removal on the hash map is lenient and never produces an error.

use thiserror::Error;

/// Errors raised by positional and sizing operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Index not in `[0, len)`.
    #[error("index out of bounds: index {index}, size {len}")]
    OutOfRange { index: usize, len: usize },

    /// A sizing request that cannot be honored as given.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
}

/// Reasons a resize request is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidArgument {
    /// Shrinking below the live length without explicit permission.
    #[error("new size {requested} is smaller than the {len} live elements")]
    WouldTruncate { requested: usize, len: usize },

    #[error("new size must be non-zero")]
    ZeroSize,
}

impl Error {
    #[inline]
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Error::OutOfRange { index, len }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_index_and_size() {
        let e = Error::out_of_range(7, 3);
        assert_eq!(e.to_string(), "index out of bounds: index 7, size 3");
    }

    #[test]
    fn invalid_argument_converts_and_nests_message() {
        let e: Error = InvalidArgument::WouldTruncate {
            requested: 2,
            len: 5,
        }
        .into();
        assert_eq!(
            e.to_string(),
            "invalid argument: new size 2 is smaller than the 5 live elements"
        );
        assert_eq!(
            Error::from(InvalidArgument::ZeroSize),
            Error::InvalidArgument(InvalidArgument::ZeroSize)
        );
    }
}
