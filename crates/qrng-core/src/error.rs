//! Error type and the numeric error-code table.
//!
//! Codes are negative integers so they survive FFI, HTTP and Python
//! boundaries unchanged. `0` means success and has no [`QrngError`] variant.

/// Errors returned by generator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QrngError {
    /// No usable generator context.
    #[error("Null context error")]
    NullContext,

    /// No usable output buffer.
    #[error("Null buffer error")]
    NullBuffer,

    /// Zero-length request or mismatched buffer lengths.
    #[error("Invalid length error")]
    InvalidLength,

    /// The entropy estimate fell below the required minimum.
    #[error("Insufficient entropy error")]
    InsufficientEntropy,

    /// Lower bound greater than upper bound.
    #[error("Invalid range parameters")]
    InvalidRange,
}

pub type Result<T> = std::result::Result<T, QrngError>;

/// Code reported for a successful operation.
pub const SUCCESS: i32 = 0;

impl QrngError {
    /// Numeric error code.
    pub fn code(self) -> i32 {
        match self {
            Self::NullContext => -1,
            Self::NullBuffer => -2,
            Self::InvalidLength => -3,
            Self::InsufficientEntropy => -4,
            Self::InvalidRange => -5,
        }
    }

    /// Map a numeric code back to its error. `None` for success and unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::NullContext),
            -2 => Some(Self::NullBuffer),
            -3 => Some(Self::InvalidLength),
            -4 => Some(Self::InsufficientEntropy),
            -5 => Some(Self::InvalidRange),
            _ => None,
        }
    }

    /// Static description, identical to the `Display` output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NullContext => "Null context error",
            Self::NullBuffer => "Null buffer error",
            Self::InvalidLength => "Invalid length error",
            Self::InsufficientEntropy => "Insufficient entropy error",
            Self::InvalidRange => "Invalid range parameters",
        }
    }
}

/// Human-readable description of an error code.
///
/// ```
/// assert_eq!(qrng_core::error_string(-3), "Invalid length error");
/// assert_eq!(qrng_core::error_string(0), "Success");
/// assert_eq!(qrng_core::error_string(42), "Unknown error");
/// ```
pub fn error_string(code: i32) -> &'static str {
    if code == SUCCESS {
        return "Success";
    }
    match QrngError::from_code(code) {
        Some(err) => err.as_str(),
        None => "Unknown error",
    }
}
