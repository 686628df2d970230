//! # Step State Machine
//!
//! Owns the active step, the set of touched fields, and the transition log.
//!
//! ## States
//!
//! ```text
//! IdentityDocument ──next──▶ MobileMoney ──next──▶ Selfie ──submit──▶ Result
//!        ▲                        │  ▲                 │
//!        └──────────back──────────┘  └──────back───────┘
//! ```
//!
//! `back` is unconditional. Forward moves are only made by the wizard after
//! the validation gate (and, out of `IdentityDocument`, the identity check)
//! has passed; this module records them and enforces their shape.
//!
//! ## Design Decision
//!
//! Three steps plus a terminal phase do not earn a typestate per step: the
//! session must hold "whichever step the user is on" in one field. An enum
//! with `Result`-returning transitions, as in the lifecycle machines, keeps
//! the invalid moves out while staying storable.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use kyc_core::FormField;
use serde::{Deserialize, Serialize};

use crate::error::WizardError;

// ─── Steps ───────────────────────────────────────────────────────────

/// The three input steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum WizardStep {
    /// Step 0: Ghana Card number plus front and back images.
    IdentityDocument = 0,
    /// Step 1: mobile money country code and number.
    MobileMoney = 1,
    /// Step 2: live selfie. Submits instead of advancing.
    Selfie = 2,
}

impl WizardStep {
    /// Number of steps.
    pub const COUNT: u8 = 3;

    /// Zero-based index.
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::IdentityDocument),
            1 => Some(Self::MobileMoney),
            2 => Some(Self::Selfie),
            _ => None,
        }
    }

    /// The following step, if any.
    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The preceding step, if any.
    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Whether this is the submitting step.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Selfie)
    }

    /// The inputs rendered on this step. Validation is scoped to exactly
    /// these fields.
    pub fn fields(&self) -> &'static [FormField] {
        match self {
            Self::IdentityDocument => &[
                FormField::IdentityNumber,
                FormField::IdentityFrontImage,
                FormField::IdentityBackImage,
            ],
            Self::MobileMoney => &[FormField::MomoCountryCode, FormField::MomoNumber],
            Self::Selfie => &[FormField::SelfieImage],
        }
    }

    /// The step a field is rendered on.
    pub fn of_field(field: FormField) -> Self {
        match field {
            FormField::IdentityNumber
            | FormField::IdentityFrontImage
            | FormField::IdentityBackImage => Self::IdentityDocument,
            FormField::MomoCountryCode | FormField::MomoNumber => Self::MobileMoney,
            FormField::SelfieImage => Self::Selfie,
        }
    }

    /// Heading shown above the step.
    pub fn title(&self) -> &'static str {
        match self {
            Self::IdentityDocument => "Ghana Card",
            Self::MobileMoney => "Mobile Money",
            Self::Selfie => "Selfie",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::IdentityDocument => "IDENTITY_DOCUMENT",
            Self::MobileMoney => "MOBILE_MONEY",
            Self::Selfie => "SELFIE",
        };
        f.write_str(s)
    }
}

// ─── Phase ───────────────────────────────────────────────────────────

/// Where the session is: on an input step, or showing the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardPhase {
    Collecting(WizardStep),
    /// Submission succeeded (terminal).
    Result,
}

impl WizardPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Result)
    }

    pub fn step(&self) -> Option<WizardStep> {
        match self {
            Self::Collecting(step) => Some(*step),
            Self::Result => None,
        }
    }
}

impl std::fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collecting(step) => write!(f, "STEP_{}_{step}", step.index()),
            Self::Result => f.write_str("RESULT"),
        }
    }
}

/// Record of a phase change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTransitionRecord {
    pub from: WizardPhase,
    pub to: WizardPhase,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

// ─── Machine ─────────────────────────────────────────────────────────

/// Active phase, touched fields, and transition history.
#[derive(Debug, Clone)]
pub struct StepMachine {
    phase: WizardPhase,
    touched: BTreeSet<FormField>,
    transitions: Vec<StepTransitionRecord>,
}

impl Default for StepMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StepMachine {
    /// Start on the identity document step.
    pub fn new() -> Self {
        Self {
            phase: WizardPhase::Collecting(WizardStep::IdentityDocument),
            touched: BTreeSet::new(),
            transitions: Vec::new(),
        }
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    /// The active step, or `None` once the result is shown.
    pub fn current_step(&self) -> Option<WizardStep> {
        self.phase.step()
    }

    /// Ordered log of all phase changes.
    pub fn transitions(&self) -> &[StepTransitionRecord] {
        &self.transitions
    }

    /// Step back one step. No-op on the first step and on the result.
    ///
    /// Returns whether the step changed. Field values and touched marks are
    /// left as they are.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.current_step().and_then(|s| s.previous()) else {
            return false;
        };
        self.do_transition(WizardPhase::Collecting(previous), "back");
        true
    }

    /// Move from the identity or mobile money step to the following step.
    ///
    /// The caller has already run the gates for the current step.
    pub fn advance(&mut self, reason: &str) -> Result<WizardStep, WizardError> {
        let next = match self.phase {
            WizardPhase::Collecting(step) if !step.is_final() => step.next(),
            _ => None,
        };
        let Some(next) = next else {
            return Err(WizardError::InvalidTransition {
                from: self.phase.to_string(),
                to: "next step".to_string(),
            });
        };
        self.do_transition(WizardPhase::Collecting(next), reason);
        Ok(next)
    }

    /// Jump to `step` from any collecting step, e.g. back to the selfie
    /// step when a submission fails after the user navigated away.
    pub fn return_to(&mut self, step: WizardStep, reason: &str) -> Result<bool, WizardError> {
        match self.phase {
            WizardPhase::Result => Err(WizardError::Completed),
            WizardPhase::Collecting(current) if current == step => Ok(false),
            WizardPhase::Collecting(_) => {
                self.do_transition(WizardPhase::Collecting(step), reason);
                Ok(true)
            }
        }
    }

    /// Enter the terminal result phase after a successful submission.
    pub fn complete(&mut self, reason: &str) -> Result<(), WizardError> {
        if self.phase.is_terminal() {
            return Err(WizardError::Completed);
        }
        self.do_transition(WizardPhase::Result, reason);
        Ok(())
    }

    /// Mark a field as touched so its error becomes visible.
    pub fn touch(&mut self, field: FormField) {
        self.touched.insert(field);
    }

    /// Mark every field of a step as touched.
    pub fn touch_step(&mut self, step: WizardStep) {
        self.touched.extend(step.fields().iter().copied());
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    fn do_transition(&mut self, to: WizardPhase, reason: &str) {
        tracing::info!(from = %self.phase, to = %to, reason, "wizard transition");
        self.transitions.push(StepTransitionRecord {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;
    }
}
