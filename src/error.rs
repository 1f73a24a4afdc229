//! Error types for `FacetFind`

use arrayvec::ArrayString;
use thiserror::Error;

use crate::types::{MAX_DIMENSION_VALUES, MAX_LABEL_LENGTH};

/// Maximum length of error messages
pub const MAX_ERROR_LENGTH: usize = 256;

/// Custom result type for `FacetFind` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for `FacetFind`
///
/// # Design
/// - Message buffers are fixed-size (`MAX_ERROR_LENGTH`), longer messages are truncated
/// - Buffers are boxed to keep `Result<T>` small on the happy path
#[derive(Debug, Error)]
pub enum Error {
    /// Search options are absent or structurally incomplete
    #[error("Invalid argument: {0}")]
    InvalidArgument(Box<ArrayString<MAX_ERROR_LENGTH>>),

    /// Catalog or schema configuration is malformed
    #[error("Catalog error: {0}")]
    Catalog(Box<ArrayString<MAX_ERROR_LENGTH>>),

    /// IO operation failed
    #[error("Error: {0}")]
    Io(#[from] std::io::Error),

    /// Dimension holds more values than a filter can address
    #[error("Error: A dimension may hold at most {} values", MAX_DIMENSION_VALUES)]
    TooManyValues,

    /// Dimension label exceeded the maximum length
    #[error("Error: Dimension labels may be at most {} bytes", MAX_LABEL_LENGTH)]
    LabelTooLong,
}

/// Copy `msg` into a fixed-size buffer, truncating at a char boundary
fn bounded(msg: &str) -> Box<ArrayString<MAX_ERROR_LENGTH>> {
    let mut buf = ArrayString::new();
    for ch in msg.chars() {
        if buf.try_push(ch).is_err() {
            break;
        }
    }
    Box::new(buf)
}

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument(msg: &str) -> Self {
        Self::InvalidArgument(bounded(msg))
    }

    /// Create a new catalog error
    pub fn catalog(msg: &str) -> Self {
        Self::Catalog(bounded(msg))
    }

    /// Get a user-friendly error message with action items
    #[must_use]
    pub fn user_message(&self) -> ArrayString<MAX_ERROR_LENGTH> {
        let mut msg = ArrayString::new();
        match self {
            Self::InvalidArgument(detail) => {
                let _ = msg.try_push_str("Error: ");
                let _ = msg.try_push_str(detail);
                let _ = msg.try_push_str("\nTip: Run 'facet values' to list the known colors and sizes");
            },
            Self::Catalog(detail) => {
                let _ = msg.try_push_str("Error: ");
                let _ = msg.try_push_str(detail);
                let _ = msg.try_push_str("\nTip: Check the catalog file for typos in labels");
            },
            Self::Io(e) => {
                let _ = msg.try_push_str(&format!(
                    "Error: {e}\nTip: Check that the catalog file exists and is readable"
                ));
            },
            Self::TooManyValues => {
                let _ = msg.try_push_str(&format!(
                    "Error: Too many values in a dimension (max {MAX_DIMENSION_VALUES})\nTip: \
                     Merge rarely used values"
                ));
            },
            Self::LabelTooLong => {
                let _ = msg.try_push_str(&format!(
                    "Error: Label too long (max {MAX_LABEL_LENGTH} bytes)\nTip: Use a shorter \
                     name for the value"
                ));
            },
        }
        msg
    }
}
