//! # Result Summary
//!
//! Pure projection of a successful submission into what the result screen
//! shows. Built only from the captured snapshot, never from the live form.

use kyc_core::{FormField, FormValues, GhanaCardNumber};
use serde::Serialize;

use crate::submission::SubmissionState;

/// Placeholder shown when the service did not resolve a name.
pub const NAME_PLACEHOLDER: &str = "—";

/// One uploaded document as listed on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLine {
    pub label: &'static str,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    /// The service's success message.
    pub message: String,
    pub full_name: Option<String>,
    /// Card number with the middle digits masked.
    pub identity_number: String,
    /// Country code and subscriber number, e.g. `+233 244000000`.
    pub momo: String,
    pub documents: Vec<DocumentLine>,
}

impl ResultSummary {
    /// The summary for a succeeded submission; `None` for any other state.
    pub fn from_state(state: &SubmissionState) -> Option<Self> {
        let SubmissionState::Succeeded { response, snapshot } = state else {
            return None;
        };
        Some(Self {
            message: response.message.clone(),
            full_name: response
                .full_name
                .clone()
                .filter(|n| !n.trim().is_empty()),
            identity_number: mask_number(&snapshot.identity_number),
            momo: format!("{} {}", snapshot.momo.country_code, snapshot.momo.number),
            documents: documents(snapshot),
        })
    }

    /// The resolved full name, or a placeholder.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(NAME_PLACEHOLDER)
    }
}

fn mask_number(raw: &str) -> String {
    GhanaCardNumber::new(raw)
        .map(|n| n.masked())
        .unwrap_or_else(|_| raw.to_string())
}

fn documents(snapshot: &FormValues) -> Vec<DocumentLine> {
    [
        FormField::IdentityFrontImage,
        FormField::IdentityBackImage,
        FormField::SelfieImage,
    ]
    .into_iter()
    .filter_map(|field| {
        snapshot.file(field).map(|file| DocumentLine {
            label: field.label(),
            file_name: file.name().to_string(),
        })
    })
    .collect()
}

impl std::fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.message)?;
        writeln!(f, "Name:         {}", self.display_name())?;
        writeln!(f, "Ghana Card:   {}", self.identity_number)?;
        write!(f, "Mobile money: {}", self.momo)?;
        for doc in &self.documents {
            write!(f, "\n{}: {}", doc.label, doc.file_name)?;
        }
        Ok(())
    }
}
