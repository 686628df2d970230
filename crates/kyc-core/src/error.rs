//! # Validation Errors
//!
//! Errors raised by the validating constructors of the identifier newtypes.

use thiserror::Error;

/// A value failed the format check of its identifier type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Not of the form `GHA-` + 9 digits + `-` + 1 check digit.
    #[error("invalid Ghana Card number: {0:?}")]
    InvalidGhanaCardNumber(String),

    /// Not 6 to 15 ASCII digits.
    #[error("invalid mobile money number: {0:?}")]
    InvalidMomoNumber(String),

    /// Mobile money is only offered under the Ghana dialling code.
    #[error("unsupported country code: {0:?}")]
    UnsupportedCountryCode(String),
}
