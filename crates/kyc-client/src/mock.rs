//! # Mock KYC Service
//!
//! Scripted [`KycService`] for tests and offline development. Replies are
//! queued per operation and consumed one per call; once a queue is empty the
//! mock answers with the default success reply. Every call is recorded so
//! tests can assert on how often, and with what, the service was invoked.

use std::collections::VecDeque;

use kyc_core::GhanaCardNumber;
use parking_lot::Mutex;

use crate::error::KycApiError;
use crate::types::{KycSubmission, SubmitKycResponse, VerifyIdentityResponse};
use crate::KycService;

/// One scripted reply.
#[derive(Debug, Clone)]
enum MockReply<T> {
    /// 2xx with a body.
    Ok(T),
    /// Non-2xx with a raw body.
    Rejected { status: u16, body: String },
    /// No response at all.
    Unavailable,
}

impl<T> MockReply<T> {
    fn into_result(self, endpoint: &str) -> Result<T, KycApiError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Rejected { status, body } => Err(KycApiError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            }),
            Self::Unavailable => Err(KycApiError::Unavailable {
                endpoint: endpoint.into(),
                reason: "mock service is offline".into(),
            }),
        }
    }
}

/// Scripted in-memory KYC service.
#[derive(Debug, Default)]
pub struct MockKycService {
    verify_replies: Mutex<VecDeque<MockReply<VerifyIdentityResponse>>>,
    submit_replies: Mutex<VecDeque<MockReply<SubmitKycResponse>>>,
    verify_calls: Mutex<Vec<GhanaCardNumber>>,
    submit_calls: Mutex<Vec<KycSubmission>>,
}

impl MockKycService {
    /// A mock that verifies every number and accepts every submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 2xx verification reply.
    pub fn with_verification(self, response: VerifyIdentityResponse) -> Self {
        self.verify_replies.lock().push_back(MockReply::Ok(response));
        self
    }

    /// Queue a non-2xx verification reply.
    pub fn with_verification_rejected(self, status: u16, body: impl Into<String>) -> Self {
        self.verify_replies.lock().push_back(MockReply::Rejected {
            status,
            body: body.into(),
        });
        self
    }

    /// Queue a verification call that never reaches the service.
    pub fn with_verification_unavailable(self) -> Self {
        self.verify_replies.lock().push_back(MockReply::Unavailable);
        self
    }

    /// Queue a 2xx submission reply.
    pub fn with_submission(self, response: SubmitKycResponse) -> Self {
        self.submit_replies.lock().push_back(MockReply::Ok(response));
        self
    }

    /// Queue a non-2xx submission reply.
    pub fn with_submission_rejected(self, status: u16, body: impl Into<String>) -> Self {
        self.submit_replies.lock().push_back(MockReply::Rejected {
            status,
            body: body.into(),
        });
        self
    }

    /// Queue a submission that never reaches the service.
    pub fn with_submission_unavailable(self) -> Self {
        self.submit_replies.lock().push_back(MockReply::Unavailable);
        self
    }

    /// Numbers passed to `verify_identity`, in call order.
    pub fn verify_calls(&self) -> Vec<GhanaCardNumber> {
        self.verify_calls.lock().clone()
    }

    /// Bundles passed to `submit_kyc`, in call order.
    pub fn submit_calls(&self) -> Vec<KycSubmission> {
        self.submit_calls.lock().clone()
    }
}

impl KycService for MockKycService {
    async fn verify_identity(
        &self,
        number: &GhanaCardNumber,
    ) -> Result<VerifyIdentityResponse, KycApiError> {
        self.verify_calls.lock().push(number.clone());
        let reply = self.verify_replies.lock().pop_front();
        reply
            .unwrap_or_else(|| MockReply::Ok(VerifyIdentityResponse::verified()))
            .into_result("POST /api/kyc/verify-identity")
    }

    async fn submit_kyc(
        &self,
        submission: &KycSubmission,
    ) -> Result<SubmitKycResponse, KycApiError> {
        self.submit_calls.lock().push(submission.clone());
        let reply = self.submit_replies.lock().pop_front();
        reply
            .unwrap_or_else(|| {
                MockReply::Ok(SubmitKycResponse {
                    message: "KYC Completed!".into(),
                    full_name: None,
                })
            })
            .into_result("POST /api/kyc/submit")
    }

    fn service_name(&self) -> &str {
        "MockKycService"
    }
}
