use std::fmt;

/// Error returned by every fallible fieldmap operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An input failed the validity check at entry. Raised before any mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A value could not be coerced into the required kind.
    #[error("conversion failed: {0}")]
    Conversion(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /// Add context to the error, preserving the variant.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            Error::InvalidArgument(msg) => Error::InvalidArgument(format!("{ctx}: {msg}")),
            Error::Conversion(msg) => Error::Conversion(format!("{ctx}: {msg}")),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion(_))
    }
}

// ---------------------------------------------------------------------------
// From impls: parse errors of the standard library → Conversion
// ---------------------------------------------------------------------------

impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::conversion(e.to_string())
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(e: std::num::ParseFloatError) -> Self {
        Self::conversion(e.to_string())
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(e: std::num::TryFromIntError) -> Self {
        Self::conversion(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_with_context_keeps_variant() {
        // Arrange
        let err = Error::conversion("bad digits");

        // Act
        let err = err.with_context("field 'age'");

        // Assert
        assert_eq!(err, Error::Conversion("field 'age': bad digits".to_string()));
        assert_eq!(err.to_string(), "conversion failed: field 'age': bad digits");
    }

    #[rstest]
    fn test_parse_int_error_maps_to_conversion() {
        // Act
        let err: Error = "x1".parse::<i32>().unwrap_err().into();

        // Assert
        assert!(err.is_conversion());
    }
}
