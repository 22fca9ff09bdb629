//! Error taxonomy shared by every kernel operation.
//!
//! The set of outcomes is closed: success is `Ok(..)` (code 0) and every
//! failure maps to exactly one [`Error`] variant with a stable numeric code.
use thiserror::Error;

/// Result type alias using the kernel [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Failure outcomes of vector and matrix operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The allocator could not provide memory.
    #[error("Memory allocation failed")]
    Alloc,

    /// A required handle was absent.
    #[error("NULL pointer argument")]
    Null,

    /// Shapes or lengths of the operands do not match.
    #[error("Dimension/size mismatch or invalid size")]
    Dim,

    /// Index or requested size outside the valid bounds, including
    /// size-arithmetic overflow and configured maximums.
    #[error("Index or value out of range")]
    Range,

    /// An argument violates a structural precondition.
    #[error("Invalid argument")]
    InvalidArg,

    /// The operation would divide by a near-zero quantity.
    #[error("Division by zero")]
    DivZero,
}

impl Error {
    /// Every variant, ordered by code.
    pub const ALL: [Error; 6] = [
        Error::Alloc,
        Error::Null,
        Error::Dim,
        Error::Range,
        Error::InvalidArg,
        Error::DivZero,
    ];

    /// Numeric code of the outcome. `0` is reserved for success.
    pub const fn code(self) -> i32 {
        match self {
            Error::Alloc => 1,
            Error::Null => 2,
            Error::Dim => 3,
            Error::Range => 4,
            Error::InvalidArg => 5,
            Error::DivZero => 6,
        }
    }

    /// Inverse of [`Error::code`]. Returns `None` for `0` and unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }
}

/// Human-readable description of a numeric outcome code.
pub fn describe(code: i32) -> String {
    match code {
        0 => "Success".to_string(),
        _ => match Error::from_code(code) {
            Some(err) => err.to_string(),
            None => "Unknown error code".to_string(),
        },
    }
}
