//! # Submission Controller
//!
//! Assembles the KYC bundle from the form, sends it, and records the
//! outcome. On success the controller keeps an immutable snapshot of the
//! values that were sent; the live form may change afterwards without
//! affecting the result. On failure the form is left untouched so the user
//! can retry.
//!
//! Like the verification gate, a submission is split into `begin` and
//! `resolve` so a host can drive the remote call itself. A ticket whose
//! reply never comes goes back through `abandon`, which fails the
//! submission so the user can retry.

use kyc_client::{KycApiError, KycService, KycSubmission, SubmitKycResponse};
use kyc_core::FormValues;

use crate::error::WizardError;
use crate::notification::Notifications;

/// Shown when a failed submission carries no message.
pub const SUBMIT_FAILED_MESSAGE: &str = "Submission failed. Please try again.";

/// Shown when the service accepts the bundle with an empty message.
pub const SUBMIT_SUCCEEDED_MESSAGE: &str = "KYC submitted successfully.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded {
        response: SubmitKycResponse,
        /// The values exactly as submitted.
        snapshot: FormValues,
    },
    Failed(String),
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Permission to send one bundle. Consumed by `resolve` or `abandon`.
#[derive(Debug)]
#[must_use = "an unresolved ticket keeps the submission pending; resolve or abandon it"]
pub struct SubmissionTicket {
    submission: KycSubmission,
    snapshot: FormValues,
}

impl SubmissionTicket {
    /// The bundle to send.
    pub fn submission(&self) -> &KycSubmission {
        &self.submission
    }

    /// The form values the bundle was built from.
    pub fn snapshot(&self) -> &FormValues {
        &self.snapshot
    }
}

#[derive(Debug, Default)]
pub struct SubmissionController {
    state: SubmissionState,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Build the bundle and mark the submission pending.
    ///
    /// # Errors
    ///
    /// [`WizardError::Busy`] while a submission is in flight,
    /// [`WizardError::Completed`] after one succeeded, and
    /// [`WizardError::Payload`] if the form cannot form a bundle. The state
    /// is unchanged on error.
    pub fn begin(&mut self, values: &FormValues) -> Result<SubmissionTicket, WizardError> {
        match self.state {
            SubmissionState::Pending => {
                return Err(WizardError::Busy {
                    operation: "submission",
                })
            }
            SubmissionState::Succeeded { .. } => return Err(WizardError::Completed),
            SubmissionState::Idle | SubmissionState::Failed(_) => {}
        }

        let submission = KycSubmission::from_form(values)?;
        self.state = SubmissionState::Pending;
        tracing::info!(number = %submission.number.masked(), "submitting KYC bundle");
        Ok(SubmissionTicket {
            submission,
            snapshot: values.clone(),
        })
    }

    /// Apply the reply for a ticket and emit one notification.
    pub fn resolve(
        &mut self,
        ticket: SubmissionTicket,
        reply: Result<SubmitKycResponse, KycApiError>,
        notifications: &mut Notifications,
    ) -> &SubmissionState {
        self.state = match reply {
            Ok(response) => {
                tracing::info!(
                    number = %ticket.submission.number.masked(),
                    has_full_name = response.full_name.is_some(),
                    "KYC bundle accepted"
                );
                if response.message.trim().is_empty() {
                    notifications.success(SUBMIT_SUCCEEDED_MESSAGE);
                } else {
                    notifications.success(response.message.as_str());
                }
                SubmissionState::Succeeded {
                    response,
                    snapshot: ticket.snapshot,
                }
            }
            Err(e) => {
                tracing::warn!(
                    number = %ticket.submission.number.masked(),
                    error = %e,
                    "KYC submission failed"
                );
                let message = e
                    .remote_message()
                    .unwrap_or_else(|| SUBMIT_FAILED_MESSAGE.to_string());
                notifications.error(message.as_str());
                SubmissionState::Failed(message)
            }
        };
        &self.state
    }

    /// Give up on a ticket whose reply will never arrive.
    ///
    /// Fails the submission with the generic message and one error
    /// notification; the form is left as it was.
    pub fn abandon(
        &mut self,
        ticket: SubmissionTicket,
        notifications: &mut Notifications,
    ) -> &SubmissionState {
        tracing::warn!(number = %ticket.submission.number.masked(), "KYC submission abandoned");
        self.release(notifications);
        &self.state
    }

    fn release(&mut self, notifications: &mut Notifications) {
        if self.state.is_pending() {
            notifications.error(SUBMIT_FAILED_MESSAGE);
            self.state = SubmissionState::Failed(SUBMIT_FAILED_MESSAGE.to_string());
        }
    }

    /// Arm a guard that abandons the pending submission unless disarmed.
    pub(crate) fn guard<'a>(
        &'a mut self,
        notifications: &'a mut Notifications,
    ) -> InFlightSubmission<'a> {
        InFlightSubmission {
            controller: self,
            notifications,
            armed: true,
        }
    }

    /// Send `values` through `service` and wait for the outcome.
    pub async fn submit<S: KycService>(
        &mut self,
        service: &S,
        values: &FormValues,
        notifications: &mut Notifications,
    ) -> Result<SubmissionState, WizardError> {
        let ticket = self.begin(values)?;
        let guard = self.guard(notifications);
        let reply = service.submit_kyc(ticket.submission()).await;
        guard.disarm();
        Ok(self.resolve(ticket, reply, notifications).clone())
    }
}

/// Abandons a pending submission when dropped before the reply arrives.
pub(crate) struct InFlightSubmission<'a> {
    controller: &'a mut SubmissionController,
    notifications: &'a mut Notifications,
    armed: bool,
}

impl InFlightSubmission<'_> {
    /// The reply arrived; leave the ticket to `resolve`.
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightSubmission<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("KYC submission dropped before a reply");
            self.controller.release(self.notifications);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationLevel;
    use kyc_client::{MockKycService, PayloadError};
    use kyc_core::{FileRef, FormField};

    fn complete_form() -> FormValues {
        let mut v = FormValues::new();
        v.identity_number = "GHA-123456789-1".into();
        v.identity_front_image = Some(FileRef::new("front.jpg", "image/jpeg", vec![1]));
        v.identity_back_image = Some(FileRef::new("back.jpg", "image/jpeg", vec![2]));
        v.momo.number = "244000000".into();
        v.selfie_image = Some(FileRef::new("selfie.jpg", "image/jpeg", vec![3]));
        v
    }

    #[tokio::test]
    async fn success_captures_snapshot_and_notifies() {
        let service = MockKycService::new().with_submission(SubmitKycResponse {
            message: "KYC Completed!".into(),
            full_name: Some("Jane Doe".into()),
        });
        let mut controller = SubmissionController::new();
        let mut notes = Notifications::new();
        let values = complete_form();

        let state = controller.submit(&service, &values, &mut notes).await.unwrap();
        match state {
            SubmissionState::Succeeded { response, snapshot } => {
                assert_eq!(response.full_name.as_deref(), Some("Jane Doe"));
                assert_eq!(snapshot, values);
            }
            other => panic!("expected Succeeded, got: {other:?}"),
        }
        let drained = notes.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].level, NotificationLevel::Success);
        assert_eq!(drained[0].message, "KYC Completed!");
    }

    #[tokio::test]
    async fn failure_is_retryable() {
        let service = MockKycService::new()
            .with_submission_rejected(422, r#"{"message":"Selfie unclear"}"#)
            .with_submission_unavailable();
        let mut controller = SubmissionController::new();
        let mut notes = Notifications::new();
        let values = complete_form();

        let state = controller.submit(&service, &values, &mut notes).await.unwrap();
        assert_eq!(state.error(), Some("Selfie unclear"));

        let state = controller.submit(&service, &values, &mut notes).await.unwrap();
        assert_eq!(state.error(), Some(SUBMIT_FAILED_MESSAGE));

        let state = controller.submit(&service, &values, &mut notes).await.unwrap();
        assert!(state.is_succeeded());

        let levels: Vec<_> = notes.drain().into_iter().map(|n| n.level).collect();
        assert_eq!(
            levels,
            vec![
                NotificationLevel::Error,
                NotificationLevel::Error,
                NotificationLevel::Success
            ]
        );
        assert_eq!(service.submit_calls().len(), 3);
    }

    #[test]
    fn begin_rejects_reentry_and_completion() {
        let mut controller = SubmissionController::new();
        let values = complete_form();
        let ticket = controller.begin(&values).unwrap();
        assert!(controller.state().is_pending());
        assert_eq!(
            controller.begin(&values).unwrap_err(),
            WizardError::Busy {
                operation: "submission"
            }
        );

        let mut notes = Notifications::new();
        controller.resolve(
            ticket,
            Ok(SubmitKycResponse {
                message: String::new(),
                full_name: None,
            }),
            &mut notes,
        );
        assert_eq!(notes.drain()[0].message, SUBMIT_SUCCEEDED_MESSAGE);
        assert_eq!(controller.begin(&values).unwrap_err(), WizardError::Completed);
    }

    #[test]
    fn abandoned_submission_fails_and_can_be_retried() {
        let mut controller = SubmissionController::new();
        let mut notes = Notifications::new();
        let values = complete_form();
        let ticket = controller.begin(&values).unwrap();

        let state = controller.abandon(ticket, &mut notes);
        assert_eq!(state.error(), Some(SUBMIT_FAILED_MESSAGE));
        let drained = notes.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].level, NotificationLevel::Error);

        assert!(controller.begin(&values).is_ok());
    }

    #[test]
    fn dropped_guard_fails_the_pending_submission() {
        let mut controller = SubmissionController::new();
        let mut notes = Notifications::new();
        let _ticket = controller.begin(&complete_form()).unwrap();
        drop(controller.guard(&mut notes));
        assert_eq!(controller.state().error(), Some(SUBMIT_FAILED_MESSAGE));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn incomplete_form_leaves_state_idle() {
        let mut controller = SubmissionController::new();
        let mut values = complete_form();
        values.selfie_image = None;
        assert_eq!(
            controller.begin(&values).unwrap_err(),
            WizardError::Payload(PayloadError::Missing(FormField::SelfieImage))
        );
        assert_eq!(controller.state(), &SubmissionState::Idle);
    }

    #[test]
    fn snapshot_is_insulated_from_later_edits() {
        let mut controller = SubmissionController::new();
        let mut values = complete_form();
        let ticket = controller.begin(&values).unwrap();
        values.momo.number = "200000000".into();

        let mut notes = Notifications::new();
        let state = controller.resolve(
            ticket,
            Ok(SubmitKycResponse {
                message: "KYC Completed!".into(),
                full_name: None,
            }),
            &mut notes,
        );
        match state {
            SubmissionState::Succeeded { snapshot, .. } => {
                assert_eq!(snapshot.momo.number, "244000000");
            }
            other => panic!("expected Succeeded, got: {other:?}"),
        }
    }
}
