//! # Field Validation Engine
//!
//! Per-step schemas mapping each field of the step to a rule. Validating a
//! step runs exactly that step's rules and returns a field-to-message map.
//! Steps never validate each other's fields.
//!
//! Validation is synchronous and never touches the network; the identity
//! check behind step 0 is a separate gate.

use std::collections::BTreeMap;

use kyc_core::{FormField, FormValues, GhanaCardNumber, MomoNumber, GHANA_COUNTRY_CODE};

use crate::step::WizardStep;

/// A rule returns the error message for an invalid value.
type Rule = fn(&FormValues) -> Result<(), &'static str>;

/// One field of a step schema.
struct FieldRule {
    field: FormField,
    check: Rule,
}

const IDENTITY_DOCUMENT_SCHEMA: &[FieldRule] = &[
    FieldRule {
        field: FormField::IdentityNumber,
        check: check_identity_number,
    },
    FieldRule {
        field: FormField::IdentityFrontImage,
        check: check_front_image,
    },
    FieldRule {
        field: FormField::IdentityBackImage,
        check: check_back_image,
    },
];

const MOBILE_MONEY_SCHEMA: &[FieldRule] = &[
    FieldRule {
        field: FormField::MomoCountryCode,
        check: check_country_code,
    },
    FieldRule {
        field: FormField::MomoNumber,
        check: check_momo_number,
    },
];

const SELFIE_SCHEMA: &[FieldRule] = &[FieldRule {
    field: FormField::SelfieImage,
    check: check_selfie_image,
}];

fn schema(step: WizardStep) -> &'static [FieldRule] {
    match step {
        WizardStep::IdentityDocument => IDENTITY_DOCUMENT_SCHEMA,
        WizardStep::MobileMoney => MOBILE_MONEY_SCHEMA,
        WizardStep::Selfie => SELFIE_SCHEMA,
    }
}

fn check_identity_number(v: &FormValues) -> Result<(), &'static str> {
    if v.identity_number.is_empty() {
        return Err("Ghana Card number is required");
    }
    if !GhanaCardNumber::is_well_formed(&v.identity_number) {
        return Err("Enter a valid Ghana Card number (GHA-XXXXXXXXX-X)");
    }
    Ok(())
}

fn check_country_code(v: &FormValues) -> Result<(), &'static str> {
    if v.momo.country_code.is_empty() {
        return Err("Country code is required");
    }
    if v.momo.country_code != GHANA_COUNTRY_CODE {
        return Err("Only +233 is supported");
    }
    Ok(())
}

fn check_momo_number(v: &FormValues) -> Result<(), &'static str> {
    if v.momo.number.is_empty() {
        return Err("Mobile money number is required");
    }
    if !MomoNumber::is_well_formed(&v.momo.number) {
        return Err("Mobile money number must be 6 to 15 digits");
    }
    Ok(())
}

fn check_front_image(v: &FormValues) -> Result<(), &'static str> {
    require_file(v.identity_front_image.is_some(), "Front image of Ghana Card is required")
}

fn check_back_image(v: &FormValues) -> Result<(), &'static str> {
    require_file(v.identity_back_image.is_some(), "Back image of Ghana Card is required")
}

fn check_selfie_image(v: &FormValues) -> Result<(), &'static str> {
    require_file(v.selfie_image.is_some(), "Selfie is required")
}

fn require_file(present: bool, message: &'static str) -> Result<(), &'static str> {
    if present {
        Ok(())
    } else {
        Err(message)
    }
}

// ─── Results ─────────────────────────────────────────────────────────

/// Field-level validation errors, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<FormField, &'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message for one field.
    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.errors.contains_key(&field)
    }

    /// Fields with an error, in step order.
    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &'static str)> + '_ {
        self.errors.iter().map(|(f, m)| (*f, *m))
    }

    /// The errors keyed by dotted field path.
    pub fn by_path(&self) -> BTreeMap<&'static str, &'static str> {
        self.iter().map(|(f, m)| (f.path(), m)).collect()
    }

    /// Keep only the errors whose field satisfies `keep`.
    pub fn retain(mut self, mut keep: impl FnMut(FormField) -> bool) -> Self {
        self.errors.retain(|f, _| keep(*f));
        self
    }
}

// ─── Engine ──────────────────────────────────────────────────────────

/// Validate the fields of one step.
///
/// Returns an empty map when every field of `step` is valid. Keys are always
/// a subset of `step.fields()`.
pub fn validate_step(values: &FormValues, step: WizardStep) -> FieldErrors {
    let mut errors = BTreeMap::new();
    for rule in schema(step) {
        if let Err(message) = (rule.check)(values) {
            errors.insert(rule.field, message);
        }
    }
    FieldErrors { errors }
}

/// Validate a single field.
pub fn validate_field(values: &FormValues, field: FormField) -> Option<&'static str> {
    schema(WizardStep::of_field(field))
        .iter()
        .find(|rule| rule.field == field)
        .and_then(|rule| (rule.check)(values).err())
}
