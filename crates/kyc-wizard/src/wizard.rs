//! # Wizard Session
//!
//! One [`Wizard`] owns the single form, the step machine, the verification
//! gate, the submission controller, the preview handles, and the pending
//! notifications for the lifetime of a session.
//!
//! ## Driving the Session
//!
//! Hosts that own their event loop use the split-phase API:
//!
//! ```text
//! request_next()  ── Verify(ticket) ──▶ host calls verify-identity ──▶ resolve_verification()
//! begin_submit()  ── Send(ticket)   ──▶ host calls submit-kyc      ──▶ resolve_submission()
//! ```
//!
//! Between the two halves the host may keep delivering input: editing the
//! identity number while a check is in flight makes its reply stale. Hosts
//! that are happy to await in place use [`Wizard::next`] and
//! [`Wizard::submit`], which run both halves against a [`KycService`].
//!
//! Re-entrant Continue or Submit presses while a call is in flight resolve
//! to `Ignored`; nothing is cancelled. A host that stops waiting for a reply
//! hands the ticket back through [`Wizard::abandon_verification`] or
//! [`Wizard::abandon_submission`]; the async drivers do the same when their
//! future is dropped, so the session never stays busy.
//!
//! Back stays available while a submission is in flight. If that
//! submission fails, the session returns to the selfie step, where Submit
//! can be pressed again.

use kyc_client::{
    KycApiError, KycService, PayloadError, SubmitKycResponse, VerifyIdentityResponse,
};
use kyc_core::{FileRef, FormField, FormValues, GhanaCardNumber};

use crate::error::WizardError;
use crate::gate::{GateOutcome, VerificationGate, VerificationState, VerificationTicket};
use crate::notification::{Notification, Notifications};
use crate::preview::{ImageSlot, PreviewHandle, PreviewManager};
use crate::result::ResultSummary;
use crate::step::{StepMachine, StepTransitionRecord, WizardPhase, WizardStep};
use crate::submission::{
    SubmissionController, SubmissionState, SubmissionTicket, SUBMIT_FAILED_MESSAGE,
};
use crate::validation::{validate_step, FieldErrors};

/// Result of pressing Continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// Moved to the given step.
    Advanced(WizardStep),
    /// The step has errors; its fields are now touched.
    Invalid(FieldErrors),
    /// The identity check failed; the message is shown on step 0.
    VerificationFailed(String),
    /// The identity check resolved for a number that has since changed.
    Stale,
    /// A call is already in flight.
    Ignored,
}

/// First half of Continue.
#[derive(Debug)]
pub enum NextStep {
    /// Resolved without a remote call.
    Done(NextOutcome),
    /// Run the identity check, then call [`Wizard::resolve_verification`].
    Verify(VerificationTicket),
}

/// Result of pressing Submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded(ResultSummary),
    /// Still on the final step; every value is intact.
    Failed(String),
    Invalid(FieldErrors),
    Ignored,
}

/// First half of Submit.
#[derive(Debug)]
pub enum SubmitStep {
    Done(SubmitOutcome),
    /// Send the bundle, then call [`Wizard::resolve_submission`].
    Send(SubmissionTicket),
}

/// A KYC wizard session.
#[derive(Debug, Default)]
pub struct Wizard {
    values: FormValues,
    steps: StepMachine,
    gate: VerificationGate,
    submission: SubmissionController,
    previews: PreviewManager,
    notifications: Notifications,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    // ── State ────────────────────────────────────────────────────────

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn phase(&self) -> WizardPhase {
        self.steps.phase()
    }

    /// The active step, or `None` on the result screen.
    pub fn current_step(&self) -> Option<WizardStep> {
        self.steps.current_step()
    }

    pub fn verification(&self) -> &VerificationState {
        self.gate.state()
    }

    pub fn submission(&self) -> &SubmissionState {
        self.submission.state()
    }

    pub fn transitions(&self) -> &[StepTransitionRecord] {
        self.steps.transitions()
    }

    pub fn preview(&self, slot: ImageSlot) -> Option<&PreviewHandle> {
        self.previews.handle(slot)
    }

    pub fn previews(&self) -> &PreviewManager {
        &self.previews
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Set the Ghana Card number as typed.
    ///
    /// A changed value discards any verification outcome for the old one.
    pub fn set_identity_number(&mut self, value: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editable(FormField::IdentityNumber)?;
        let value = value.into();
        if value != self.values.identity_number {
            self.values.identity_number = value;
            self.gate.invalidate();
        }
        Ok(())
    }

    pub fn set_identity_front_image(&mut self, file: Option<FileRef>) -> Result<(), WizardError> {
        self.set_image(ImageSlot::IdentityFront, file)
    }

    pub fn set_identity_back_image(&mut self, file: Option<FileRef>) -> Result<(), WizardError> {
        self.set_image(ImageSlot::IdentityBack, file)
    }

    pub fn set_momo_country_code(&mut self, value: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editable(FormField::MomoCountryCode)?;
        self.values.momo.country_code = value.into();
        Ok(())
    }

    pub fn set_momo_number(&mut self, value: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editable(FormField::MomoNumber)?;
        self.values.momo.number = value.into();
        Ok(())
    }

    pub fn set_selfie_image(&mut self, file: Option<FileRef>) -> Result<(), WizardError> {
        self.set_image(ImageSlot::Selfie, file)
    }

    fn set_image(&mut self, slot: ImageSlot, file: Option<FileRef>) -> Result<(), WizardError> {
        let field = slot.field();
        self.ensure_editable(field)?;
        let target = match slot {
            ImageSlot::IdentityFront => &mut self.values.identity_front_image,
            ImageSlot::IdentityBack => &mut self.values.identity_back_image,
            ImageSlot::Selfie => &mut self.values.selfie_image,
        };
        *target = file;
        self.previews.assign(slot, target.as_ref());
        Ok(())
    }

    fn ensure_editable(&self, field: FormField) -> Result<(), WizardError> {
        match self.phase() {
            WizardPhase::Result => Err(WizardError::Completed),
            WizardPhase::Collecting(step) if WizardStep::of_field(field) == step => Ok(()),
            phase => Err(WizardError::FieldNotEditable {
                field,
                step: phase.to_string(),
            }),
        }
    }

    /// Mark a field as touched (e.g. on blur) so its error shows.
    pub fn touch(&mut self, field: FormField) {
        self.steps.touch(field);
    }

    // ── Derived view ─────────────────────────────────────────────────

    /// Every validation error of the active step.
    pub fn field_errors(&self) -> FieldErrors {
        match self.current_step() {
            Some(step) => validate_step(&self.values, step),
            None => FieldErrors::default(),
        }
    }

    /// Errors of the active step for fields the user has touched.
    pub fn visible_errors(&self) -> FieldErrors {
        self.field_errors().retain(|f| self.steps.is_touched(f))
    }

    /// The identity check failure shown on step 0.
    pub fn verification_error(&self) -> Option<&str> {
        self.gate.state().error()
    }

    /// Whether a verification or submission call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.gate.is_in_flight() || self.submission.state().is_pending()
    }

    /// Whether the Continue control is enabled.
    pub fn can_continue(&self) -> bool {
        matches!(self.current_step(), Some(step) if !step.is_final()) && !self.is_busy()
    }

    /// Whether the Back control is enabled.
    pub fn can_go_back(&self) -> bool {
        self.current_step().and_then(|s| s.previous()).is_some()
    }

    /// Whether the Submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.current_step() == Some(WizardStep::Selfie) && !self.is_busy()
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Go back one step. No-op on the first step and on the result.
    pub fn back(&mut self) -> bool {
        self.steps.back()
    }

    /// First half of Continue: validate, then either finish locally or ask
    /// for an identity check.
    pub fn request_next(&mut self) -> Result<NextStep, WizardError> {
        let step = match self.phase() {
            WizardPhase::Result => return Err(WizardError::Completed),
            WizardPhase::Collecting(step) if step.is_final() => {
                return Err(WizardError::InvalidTransition {
                    from: self.phase().to_string(),
                    to: "next step".to_string(),
                })
            }
            WizardPhase::Collecting(step) => step,
        };
        if self.is_busy() {
            tracing::debug!(%step, "continue ignored while a call is in flight");
            return Ok(NextStep::Done(NextOutcome::Ignored));
        }

        let errors = validate_step(&self.values, step);
        if !errors.is_empty() {
            self.steps.touch_step(step);
            return Ok(NextStep::Done(NextOutcome::Invalid(errors)));
        }

        match step {
            WizardStep::IdentityDocument => {
                if self.gate.is_verified_for(&self.values.identity_number) {
                    let next = self.steps.advance("identity number already verified")?;
                    return Ok(NextStep::Done(NextOutcome::Advanced(next)));
                }
                let number = GhanaCardNumber::new(self.values.identity_number.as_str())
                    .map_err(|source| PayloadError::Invalid {
                        field: FormField::IdentityNumber,
                        source,
                    })?;
                Ok(NextStep::Verify(self.gate.begin(number)?))
            }
            _ => {
                let next = self.steps.advance("step valid")?;
                Ok(NextStep::Done(NextOutcome::Advanced(next)))
            }
        }
    }

    /// Second half of Continue: apply the identity check reply.
    pub fn resolve_verification(
        &mut self,
        ticket: VerificationTicket,
        reply: Result<VerifyIdentityResponse, KycApiError>,
    ) -> Result<NextOutcome, WizardError> {
        match self.gate.resolve(ticket, reply) {
            GateOutcome::Verified => {
                let next = self.steps.advance("identity number verified")?;
                Ok(NextOutcome::Advanced(next))
            }
            GateOutcome::Failed(message) => Ok(NextOutcome::VerificationFailed(message)),
            GateOutcome::Stale => Ok(NextOutcome::Stale),
        }
    }

    /// Give up on an identity check whose reply will never arrive.
    ///
    /// Step 0 shows the generic failure message and Continue is enabled
    /// again.
    pub fn abandon_verification(&mut self, ticket: VerificationTicket) -> NextOutcome {
        match self.gate.abandon(ticket) {
            GateOutcome::Failed(message) => NextOutcome::VerificationFailed(message),
            GateOutcome::Verified | GateOutcome::Stale => NextOutcome::Stale,
        }
    }

    /// Press Continue and await any identity check.
    ///
    /// Dropping the returned future mid-call abandons the check.
    pub async fn next<S: KycService>(&mut self, service: &S) -> Result<NextOutcome, WizardError> {
        match self.request_next()? {
            NextStep::Done(outcome) => Ok(outcome),
            NextStep::Verify(ticket) => {
                let guard = self.gate.guard(&ticket);
                let reply = service.verify_identity(ticket.number()).await;
                guard.disarm();
                self.resolve_verification(ticket, reply)
            }
        }
    }

    // ── Submission ───────────────────────────────────────────────────

    /// First half of Submit: validate the selfie step and snapshot the form.
    pub fn begin_submit(&mut self) -> Result<SubmitStep, WizardError> {
        match self.phase() {
            WizardPhase::Result => return Err(WizardError::Completed),
            WizardPhase::Collecting(WizardStep::Selfie) => {}
            phase => {
                return Err(WizardError::InvalidTransition {
                    from: phase.to_string(),
                    to: "submit".to_string(),
                })
            }
        }
        if self.is_busy() {
            tracing::debug!("submit ignored while a call is in flight");
            return Ok(SubmitStep::Done(SubmitOutcome::Ignored));
        }

        let errors = validate_step(&self.values, WizardStep::Selfie);
        if !errors.is_empty() {
            self.steps.touch_step(WizardStep::Selfie);
            return Ok(SubmitStep::Done(SubmitOutcome::Invalid(errors)));
        }

        Ok(SubmitStep::Send(self.submission.begin(&self.values)?))
    }

    /// Second half of Submit: apply the service reply.
    ///
    /// Success shows the result and releases every preview. Failure puts
    /// the session back on the selfie step with every value intact.
    pub fn resolve_submission(
        &mut self,
        ticket: SubmissionTicket,
        reply: Result<SubmitKycResponse, KycApiError>,
    ) -> Result<SubmitOutcome, WizardError> {
        let state = self
            .submission
            .resolve(ticket, reply, &mut self.notifications);
        if let SubmissionState::Failed(message) = state {
            let message = message.clone();
            self.steps.return_to(WizardStep::Selfie, "submission failed")?;
            return Ok(SubmitOutcome::Failed(message));
        }
        let summary = ResultSummary::from_state(state);
        self.steps.complete("submission accepted")?;
        self.previews.teardown();
        summary
            .map(SubmitOutcome::Succeeded)
            .ok_or_else(|| WizardError::InvalidTransition {
                from: "submission".to_string(),
                to: "result".to_string(),
            })
    }

    /// Give up on a submission whose reply will never arrive.
    ///
    /// Same as a failed reply: generic message, one error notification,
    /// back on the selfie step.
    pub fn abandon_submission(
        &mut self,
        ticket: SubmissionTicket,
    ) -> Result<SubmitOutcome, WizardError> {
        let state = self.submission.abandon(ticket, &mut self.notifications);
        let message = state.error().unwrap_or(SUBMIT_FAILED_MESSAGE).to_string();
        self.steps.return_to(WizardStep::Selfie, "submission abandoned")?;
        Ok(SubmitOutcome::Failed(message))
    }

    /// Press Submit and await the service.
    ///
    /// Dropping the returned future mid-call fails the submission.
    pub async fn submit<S: KycService>(&mut self, service: &S) -> Result<SubmitOutcome, WizardError> {
        match self.begin_submit()? {
            SubmitStep::Done(outcome) => Ok(outcome),
            SubmitStep::Send(ticket) => {
                let guard = self.submission.guard(&mut self.notifications);
                let reply = service.submit_kyc(ticket.submission()).await;
                guard.disarm();
                self.resolve_submission(ticket, reply)
            }
        }
    }

    // ── Output ───────────────────────────────────────────────────────

    /// The result screen contents, once submission succeeded.
    pub fn result_summary(&self) -> Option<ResultSummary> {
        ResultSummary::from_state(self.submission.state())
    }

    /// Take the notifications not yet shown.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Release every preview handle. Also runs on drop.
    pub fn teardown(&mut self) {
        self.previews.teardown();
    }
}
