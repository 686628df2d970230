//! # Verification Gate
//!
//! Wraps the remote identity-number check that guards the move from the
//! identity document step to the mobile money step.
//!
//! The check is split into [`VerificationGate::begin`], which hands out a
//! ticket, and [`VerificationGate::resolve`], which applies the reply. Each
//! ticket carries the gate generation it was issued under; editing the
//! number bumps the generation, so a reply for an older number resolves as
//! [`GateOutcome::Stale`] and leaves the state untouched.
//!
//! Only a `Verified` outcome is cached, and only for the exact number that
//! was verified. Failures are never cached: pressing Continue again re-runs
//! the check.
//!
//! A ticket that will never be resolved must be handed back through
//! [`VerificationGate::abandon`]. The async drivers do this themselves when
//! their future is dropped mid-call, so the gate always leaves `Pending`.

use kyc_client::{KycApiError, KycService, VerifyIdentityResponse};
use kyc_core::GhanaCardNumber;
use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// Shown when a transport fault carries no message.
pub const VERIFY_UNAVAILABLE_MESSAGE: &str = "Unable to verify Ghana Card number. Please try again.";

/// Shown when the service declines without a message.
pub const VERIFY_REJECTED_MESSAGE: &str = "Ghana Card number could not be verified.";

/// Outcome of the identity check for the current number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerificationState {
    #[default]
    NotStarted,
    Pending,
    Verified,
    Failed(String),
}

impl VerificationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The failure message, if the last check failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Permission to run one identity check. Consumed by `resolve` or `abandon`.
#[derive(Debug)]
#[must_use = "an unresolved ticket keeps the gate busy; resolve or abandon it"]
pub struct VerificationTicket {
    number: GhanaCardNumber,
    generation: u64,
}

impl VerificationTicket {
    /// The number to send.
    pub fn number(&self) -> &GhanaCardNumber {
        &self.number
    }
}

/// What a resolved reply did to the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Verified,
    Failed(String),
    /// The number changed while the call was in flight; the reply was
    /// discarded.
    Stale,
}

/// Single-flight identity check with a success cache.
#[derive(Debug, Default)]
pub struct VerificationGate {
    state: VerificationState,
    generation: u64,
    in_flight: Option<u64>,
    verified_number: Option<GhanaCardNumber>,
}

impl VerificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    /// Whether a call has been issued and not yet resolved.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether `number` has a cached successful check.
    pub fn is_verified_for(&self, number: &str) -> bool {
        self.state == VerificationState::Verified
            && self
                .verified_number
                .as_ref()
                .is_some_and(|n| n.as_str() == number)
    }

    /// Forget any outcome. Called whenever the number is edited.
    ///
    /// A call already in flight keeps running; its reply will be stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.verified_number = None;
        if self.state != VerificationState::NotStarted {
            tracing::debug!(generation = self.generation, "identity verification invalidated");
        }
        self.state = VerificationState::NotStarted;
    }

    /// Start a check. Fails with [`WizardError::Busy`] while one is in flight.
    pub fn begin(&mut self, number: GhanaCardNumber) -> Result<VerificationTicket, WizardError> {
        if self.in_flight.is_some() {
            return Err(WizardError::Busy {
                operation: "identity verification",
            });
        }
        self.in_flight = Some(self.generation);
        self.state = VerificationState::Pending;
        tracing::info!(number = %number.masked(), generation = self.generation, "verifying identity number");
        Ok(VerificationTicket {
            number,
            generation: self.generation,
        })
    }

    /// Apply the reply for a ticket.
    pub fn resolve(
        &mut self,
        ticket: VerificationTicket,
        reply: Result<VerifyIdentityResponse, KycApiError>,
    ) -> GateOutcome {
        self.in_flight = None;

        if ticket.generation != self.generation {
            tracing::info!(
                number = %ticket.number.masked(),
                issued = ticket.generation,
                current = self.generation,
                "discarding stale identity verification reply"
            );
            return GateOutcome::Stale;
        }

        match reply {
            Ok(resp) if resp.verified => {
                tracing::info!(number = %ticket.number.masked(), "identity number verified");
                self.state = VerificationState::Verified;
                self.verified_number = Some(ticket.number);
                GateOutcome::Verified
            }
            Ok(resp) => {
                let message = resp
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| VERIFY_REJECTED_MESSAGE.to_string());
                tracing::info!(number = %ticket.number.masked(), %message, "identity number not verified");
                self.fail(message)
            }
            Err(e) => {
                tracing::warn!(number = %ticket.number.masked(), error = %e, "identity verification failed");
                let message = e
                    .remote_message()
                    .unwrap_or_else(|| VERIFY_UNAVAILABLE_MESSAGE.to_string());
                self.fail(message)
            }
        }
    }

    /// Give up on a ticket whose reply will never arrive.
    ///
    /// The gate fails with the generic transport message, unless the number
    /// changed meanwhile, in which case the ticket was stale anyway.
    pub fn abandon(&mut self, ticket: VerificationTicket) -> GateOutcome {
        self.release(ticket.generation)
    }

    fn release(&mut self, issued: u64) -> GateOutcome {
        if self.in_flight != Some(issued) {
            return GateOutcome::Stale;
        }
        self.in_flight = None;
        if issued != self.generation {
            tracing::info!(issued, current = self.generation, "stale identity verification abandoned");
            return GateOutcome::Stale;
        }
        tracing::warn!(generation = issued, "identity verification abandoned before a reply");
        self.fail(VERIFY_UNAVAILABLE_MESSAGE.to_string())
    }

    /// Arm a guard that abandons `ticket` unless disarmed.
    pub(crate) fn guard(&mut self, ticket: &VerificationTicket) -> InFlightVerification<'_> {
        InFlightVerification {
            gate: self,
            issued: Some(ticket.generation),
        }
    }

    fn fail(&mut self, message: String) -> GateOutcome {
        self.verified_number = None;
        self.state = VerificationState::Failed(message.clone());
        GateOutcome::Failed(message)
    }

    /// Run one check against `service` to completion.
    pub async fn verify_identity_number<S: KycService>(
        &mut self,
        service: &S,
        number: GhanaCardNumber,
    ) -> Result<VerificationState, WizardError> {
        let ticket = self.begin(number)?;
        let guard = self.guard(&ticket);
        let reply = service.verify_identity(ticket.number()).await;
        guard.disarm();
        self.resolve(ticket, reply);
        Ok(self.state.clone())
    }
}

/// Abandons an in-flight check when dropped before the reply arrives.
pub(crate) struct InFlightVerification<'a> {
    gate: &'a mut VerificationGate,
    issued: Option<u64>,
}

impl InFlightVerification<'_> {
    /// The reply arrived; leave the ticket to `resolve`.
    pub(crate) fn disarm(mut self) {
        self.issued = None;
    }
}

impl Drop for InFlightVerification<'_> {
    fn drop(&mut self) {
        if let Some(issued) = self.issued.take() {
            self.gate.release(issued);
        }
    }
}
