//! # kyc-client -- Typed Rust client for the KYC verification service
//!
//! Provides typed access to the two remote operations the wizard depends on:
//! - **Identity check** via `POST /api/kyc/verify-identity`
//! - **KYC submission** via `POST /api/kyc/submit` (multipart)
//!
//! ## Architecture
//!
//! The [`KycService`] trait abstracts over the remote backend. Production
//! deployments use [`KycClient`], which wraps a `reqwest::Client`; tests and
//! offline development use [`MockKycService`]. The wizard is generic over the
//! trait and never issues HTTP requests itself.
//!
//! ## Retry Policy
//!
//! None. A transport fault is returned to the caller as
//! [`KycApiError::Http`]; retrying is a user action.

pub mod config;
pub mod error;
pub mod mock;
pub mod types;

pub use config::{ConfigError, KycClientConfig};
pub use error::{KycApiError, PayloadError};
pub use mock::MockKycService;
pub use types::{KycSubmission, SubmitKycResponse, VerifyIdentityRequest, VerifyIdentityResponse};

use std::time::Duration;

use kyc_core::GhanaCardNumber;

/// Path of the identity-number check, relative to the base URL.
const VERIFY_IDENTITY_PATH: &str = "api/kyc/verify-identity";

/// Path of the KYC submission, relative to the base URL.
const SUBMIT_PATH: &str = "api/kyc/submit";

/// The remote collaborator consumed by the wizard.
///
/// Implementations resolve every call to either a typed response or a
/// [`KycApiError`]; they never panic on network failure.
#[allow(async_fn_in_trait)]
pub trait KycService {
    /// Check an identity number against the registry.
    async fn verify_identity(
        &self,
        number: &GhanaCardNumber,
    ) -> Result<VerifyIdentityResponse, KycApiError>;

    /// Submit the complete KYC bundle.
    async fn submit_kyc(
        &self,
        submission: &KycSubmission,
    ) -> Result<SubmitKycResponse, KycApiError>;

    /// Return the human-readable name of this implementation.
    fn service_name(&self) -> &str;
}

/// HTTP client for the KYC service.
#[derive(Debug, Clone)]
pub struct KycClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl KycClient {
    /// Create a new client from configuration.
    pub fn new(config: KycClientConfig) -> Result<Self, KycApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|_| KycApiError::Config(ConfigError::InvalidToken))?,
            );
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| KycApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Check an identity number.
    ///
    /// Calls `POST {base}/api/kyc/verify-identity`.
    pub async fn verify_identity(
        &self,
        number: &GhanaCardNumber,
    ) -> Result<VerifyIdentityResponse, KycApiError> {
        let endpoint = "POST /api/kyc/verify-identity";
        let url = format!("{}{VERIFY_IDENTITY_PATH}", self.base_url);
        let body = VerifyIdentityRequest {
            number: number.clone(),
        };

        tracing::debug!(number = %number.masked(), "verifying identity number");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| KycApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        Self::decode(endpoint, resp).await
    }

    /// Submit the complete KYC bundle as `multipart/form-data`.
    ///
    /// Calls `POST {base}/api/kyc/submit`.
    pub async fn submit_kyc(
        &self,
        submission: &KycSubmission,
    ) -> Result<SubmitKycResponse, KycApiError> {
        let endpoint = "POST /api/kyc/submit";
        let url = format!("{}{SUBMIT_PATH}", self.base_url);
        let form = submission.to_multipart()?;

        tracing::debug!(
            number = %submission.number.masked(),
            front_bytes = submission.front_image.len(),
            back_bytes = submission.back_image.len(),
            selfie_bytes = submission.selfie.len(),
            "submitting KYC bundle"
        );
        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| KycApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        Self::decode(endpoint, resp).await
    }

    /// Map a non-2xx status to [`KycApiError::ApiError`], otherwise decode
    /// the JSON body.
    async fn decode<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, KycApiError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(endpoint, status, "KYC service rejected request");
            return Err(KycApiError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| KycApiError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }
}

impl KycService for KycClient {
    async fn verify_identity(
        &self,
        number: &GhanaCardNumber,
    ) -> Result<VerifyIdentityResponse, KycApiError> {
        KycClient::verify_identity(self, number).await
    }

    async fn submit_kyc(
        &self,
        submission: &KycSubmission,
    ) -> Result<SubmitKycResponse, KycApiError> {
        KycClient::submit_kyc(self, submission).await
    }

    fn service_name(&self) -> &str {
        "KycClient"
    }
}
