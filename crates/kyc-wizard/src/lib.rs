//! # kyc-wizard -- Control logic of the KYC identity-verification wizard
//!
//! Collects a Ghana Card number with front and back images, a mobile money
//! number, and a selfie across three steps, then submits them as one bundle.
//!
//! ## Components
//!
//! - [`validation`]: per-step schema validation producing field error maps.
//! - [`step`]: the step state machine, touched fields, transition log.
//! - [`gate`]: the remote identity check between steps 0 and 1.
//! - [`preview`]: revocable preview handles, one per image field.
//! - [`submission`]: bundle assembly, send, outcome, snapshot.
//! - [`result`]: the result screen as a pure projection of the snapshot.
//! - [`wizard`]: the session that owns all of the above.
//!
//! ## Execution Model
//!
//! Single-threaded. Only the identity check and the submission suspend, and
//! both go through a [`kyc_client::KycService`]. Nothing is cancelled; a
//! verification reply for a number that has since been edited is discarded.

pub mod error;
pub mod gate;
pub mod notification;
pub mod preview;
pub mod result;
pub mod step;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use error::WizardError;
pub use gate::{GateOutcome, VerificationGate, VerificationState, VerificationTicket};
pub use notification::{Notification, NotificationLevel, Notifications};
pub use preview::{ImageSlot, PreviewHandle, PreviewId, PreviewManager};
pub use result::{DocumentLine, ResultSummary};
pub use step::{StepMachine, StepTransitionRecord, WizardPhase, WizardStep};
pub use submission::{SubmissionController, SubmissionState, SubmissionTicket};
pub use validation::{validate_field, validate_step, FieldErrors};
pub use wizard::{NextOutcome, NextStep, SubmitOutcome, SubmitStep, Wizard};
