//! # Request and Response Types
//!
//! Typed shapes of the two remote operations:
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | POST | `/api/kyc/verify-identity` | JSON `{number}` | `{verified, message?}` |
//! | POST | `/api/kyc/submit` | multipart | `{message, full_name?}` |

use kyc_core::{CountryCode, FileRef, FormField, FormValues, GhanaCardNumber, MomoNumber};
use serde::{Deserialize, Serialize};

use crate::error::{KycApiError, PayloadError};

/// Multipart part names, in the order they are sent.
pub mod parts {
    pub const NUMBER: &str = "number";
    pub const FRONT_IMAGE: &str = "front_image";
    pub const BACK_IMAGE: &str = "back_image";
    pub const MOMO_COUNTRY_CODE: &str = "momo_country_code";
    pub const MOMO_NUMBER: &str = "momo_number";
    pub const SELFIE: &str = "selfie";
}

// -- Identity verification ----------------------------------------------------

/// Body of the identity-number check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyIdentityRequest {
    pub number: GhanaCardNumber,
}

/// Result of the identity-number check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyIdentityResponse {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerifyIdentityResponse {
    pub fn verified() -> Self {
        Self {
            verified: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            verified: false,
            message: Some(message.into()),
        }
    }
}

// -- KYC submission -----------------------------------------------------------

/// The complete KYC bundle, validated and ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycSubmission {
    pub number: GhanaCardNumber,
    pub front_image: FileRef,
    pub back_image: FileRef,
    pub momo_country_code: CountryCode,
    pub momo_number: MomoNumber,
    pub selfie: FileRef,
}

impl KycSubmission {
    /// Build the bundle from the form.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] naming the first field that is missing or
    /// malformed, in step order.
    pub fn from_form(values: &FormValues) -> Result<Self, PayloadError> {
        let number = GhanaCardNumber::new(values.identity_number.as_str()).map_err(|source| {
            if values.identity_number.is_empty() {
                PayloadError::Missing(FormField::IdentityNumber)
            } else {
                PayloadError::Invalid {
                    field: FormField::IdentityNumber,
                    source,
                }
            }
        })?;
        let front_image = required_file(values, FormField::IdentityFrontImage)?;
        let back_image = required_file(values, FormField::IdentityBackImage)?;
        let momo_country_code =
            CountryCode::new(values.momo.country_code.as_str()).map_err(|source| {
                PayloadError::Invalid {
                    field: FormField::MomoCountryCode,
                    source,
                }
            })?;
        let momo_number = MomoNumber::new(values.momo.number.as_str()).map_err(|source| {
            if values.momo.number.is_empty() {
                PayloadError::Missing(FormField::MomoNumber)
            } else {
                PayloadError::Invalid {
                    field: FormField::MomoNumber,
                    source,
                }
            }
        })?;
        let selfie = required_file(values, FormField::SelfieImage)?;

        Ok(Self {
            number,
            front_image,
            back_image,
            momo_country_code,
            momo_number,
            selfie,
        })
    }

    /// Encode as `multipart/form-data`: text parts for the numbers, file
    /// parts for the images.
    pub fn to_multipart(&self) -> Result<reqwest::multipart::Form, KycApiError> {
        Ok(reqwest::multipart::Form::new()
            .text(parts::NUMBER, self.number.as_str().to_string())
            .part(parts::FRONT_IMAGE, file_part(parts::FRONT_IMAGE, &self.front_image)?)
            .part(parts::BACK_IMAGE, file_part(parts::BACK_IMAGE, &self.back_image)?)
            .text(
                parts::MOMO_COUNTRY_CODE,
                self.momo_country_code.as_str().to_string(),
            )
            .text(parts::MOMO_NUMBER, self.momo_number.as_str().to_string())
            .part(parts::SELFIE, file_part(parts::SELFIE, &self.selfie)?))
    }
}

fn required_file(values: &FormValues, field: FormField) -> Result<FileRef, PayloadError> {
    values
        .file(field)
        .cloned()
        .ok_or(PayloadError::Missing(field))
}

fn file_part(
    part: &'static str,
    file: &FileRef,
) -> Result<reqwest::multipart::Part, KycApiError> {
    reqwest::multipart::Part::bytes(file.bytes().to_vec())
        .file_name(file.name().to_string())
        .mime_str(file.content_type())
        .map_err(|source| KycApiError::InvalidPart { part, source })
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitKycResponse {
    pub message: String,
    /// Full name resolved from the identity record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}
