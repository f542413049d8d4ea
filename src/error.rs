//! Errors returned by positional operations on a [`SkipList`](crate::SkipList).

use thiserror::Error;

/// The only recoverable failure: an index outside the operation's bound.
///
/// Bounds are checked before the list is touched, so a returned error
/// always means the list is exactly as it was before the call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message() {
        let err = Error::OutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 out of range for length 3");
    }
}
