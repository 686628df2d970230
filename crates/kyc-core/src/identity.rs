//! # Identifier Newtypes
//!
//! Validated wrappers for the identifiers collected by the wizard.
//!
//! ## Formats
//!
//! - Ghana Card (NIA personal ID): `GHA-XXXXXXXXX-X`, nine digits followed by
//!   one check digit.
//! - Mobile money subscriber number: 6 to 15 digits, no leading `+`.
//! - Country code: the dialling prefix, currently only `+233`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Dialling prefix for Ghana. Mobile money numbers are collected under it.
pub const GHANA_COUNTRY_CODE: &str = "+233";

const GHANA_CARD_PREFIX: &str = "GHA-";
const GHANA_CARD_LEN: usize = 15;

/// Deserialize through `new()` so invalid values are rejected at the
/// serde boundary instead of being accepted silently.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Ghana Card number
// ---------------------------------------------------------------------------

/// A Ghana Card number in `GHA-123456789-1` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GhanaCardNumber(String);

impl_validating_deserialize!(GhanaCardNumber);

impl GhanaCardNumber {
    /// Validate and wrap a Ghana Card number.
    ///
    /// The whole string must match; surrounding whitespace is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidGhanaCardNumber`] on any mismatch.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        if !Self::is_well_formed(&raw) {
            return Err(ValidationError::InvalidGhanaCardNumber(raw));
        }
        Ok(Self(raw))
    }

    /// Structural check without allocating.
    pub fn is_well_formed(raw: &str) -> bool {
        let bytes = raw.as_bytes();
        if bytes.len() != GHANA_CARD_LEN || !raw.starts_with(GHANA_CARD_PREFIX) {
            return false;
        }
        let serial = &bytes[4..13];
        serial.iter().all(u8::is_ascii_digit) && bytes[13] == b'-' && bytes[14].is_ascii_digit()
    }

    /// The number as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trailing check digit.
    pub fn check_digit(&self) -> char {
        // Length and ASCII-ness were checked in `new`.
        char::from(self.0.as_bytes()[GHANA_CARD_LEN - 1])
    }

    /// Masked form for logs and summaries: `GHA-*******89-1`.
    pub fn masked(&self) -> String {
        format!("{GHANA_CARD_PREFIX}*******{}", &self.0[11..])
    }
}

impl std::fmt::Display for GhanaCardNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for GhanaCardNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Mobile money number
// ---------------------------------------------------------------------------

/// A mobile money subscriber number without its country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MomoNumber(String);

impl_validating_deserialize!(MomoNumber);

impl MomoNumber {
    /// Shortest accepted subscriber number.
    pub const MIN_DIGITS: usize = 6;
    /// Longest accepted subscriber number.
    pub const MAX_DIGITS: usize = 15;

    /// Validate and wrap a subscriber number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMomoNumber`] unless the value is
    /// 6 to 15 ASCII digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        if !Self::is_well_formed(&raw) {
            return Err(ValidationError::InvalidMomoNumber(raw));
        }
        Ok(Self(raw))
    }

    /// Structural check without allocating.
    pub fn is_well_formed(raw: &str) -> bool {
        (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&raw.len())
            && raw.bytes().all(|b| b.is_ascii_digit())
    }

    /// The digits as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MomoNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Country code
// ---------------------------------------------------------------------------

/// Dialling prefix for the mobile money number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CountryCode(String);

impl_validating_deserialize!(CountryCode);

impl CountryCode {
    /// Accept a supported dialling prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedCountryCode`] for anything other
    /// than [`GHANA_COUNTRY_CODE`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        if raw != GHANA_COUNTRY_CODE {
            return Err(ValidationError::UnsupportedCountryCode(raw));
        }
        Ok(Self(raw))
    }

    /// The Ghana prefix.
    pub fn ghana() -> Self {
        Self(GHANA_COUNTRY_CODE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CountryCode {
    fn default() -> Self {
        Self::ghana()
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
