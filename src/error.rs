//! Error types for colour-space resolution and image painting.
//!
//! The variants follow the interpreter error taxonomy: syntax, range and type
//! checks, undefined names, limit checks and allocation failures. Whether a
//! given error aborts the current image, the current page, or nothing at all
//! is decided by [`RenderOptions`](crate::config::RenderOptions).

use crate::object::ObjectRef;

/// Result type alias for painting operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while resolving colour spaces or painting images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed header, box or dictionary shape
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Numeric value outside its permitted range
    #[error("Range check: {0}")]
    RangeCheck(String),

    /// Object has wrong type at a structural position
    #[error("Type check: expected {expected}, found {found}")]
    TypeCheck {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// Name or resource could not be resolved
    #[error("Undefined: {0}")]
    Undefined(String),

    /// Implementation limit exceeded (array sizes, stalled consumers, short data)
    #[error("Limit check: {0}")]
    LimitCheck(String),

    /// Buffer allocation failed
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// A named resource or indirect object resolves back to itself
    #[error("Circular reference detected: {0}")]
    CircularReference(String),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),

    /// Referenced object not present in the store
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectRef),

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Image sample data shorter than its declared geometry
    #[error("Image data error: {0}")]
    ImageData(String),

    /// Recoverable condition promoted to an error by the stop-on-warning policy
    #[error("Warning escalated to error: {0}")]
    Escalated(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::TypeCheck`] built from the offending object.
    pub fn type_check(expected: &str, found: &crate::object::Object) -> Self {
        Error::TypeCheck {
            expected: expected.to_string(),
            found: found.type_name().to_string(),
        }
    }

    /// Whether the default best-effort policy may substitute a default and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Syntax(_) | Error::RangeCheck(_) | Error::Undefined(_))
    }
}
