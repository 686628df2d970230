//! # Wizard Errors
//!
//! Rejected uses of the session API. Remote failures are not errors here:
//! they resolve to `VerificationState::Failed` or `SubmissionState::Failed`.

use kyc_client::PayloadError;
use kyc_core::FormField;
use thiserror::Error;

/// Errors returned by wizard operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// The operation is not defined for the current phase.
    #[error("invalid wizard transition: {from} -> {to}")]
    InvalidTransition {
        /// Current phase.
        from: String,
        /// Attempted target.
        to: String,
    },

    /// The field is not an input of the active step.
    #[error("{field} is not editable on step {step}")]
    FieldNotEditable {
        /// The field the caller tried to change.
        field: FormField,
        /// The active step.
        step: String,
    },

    /// The same operation is already in flight.
    #[error("{operation} already in flight")]
    Busy {
        /// Which suspending operation.
        operation: &'static str,
    },

    /// The KYC bundle was accepted; the session only shows the result.
    #[error("wizard is complete")]
    Completed,

    /// The form could not be turned into a request.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),
}
