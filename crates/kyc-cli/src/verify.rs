//! # Verify Subcommand
//!
//! Runs the identity gate alone for one Ghana Card number.

use std::io::Write;

use clap::Args;
use kyc_client::KycService;
use kyc_core::{FormField, FormValues, GhanaCardNumber};
use kyc_wizard::{validate_field, VerificationGate, VerificationState};

use crate::{EXIT_INVALID_INPUT, EXIT_REMOTE_FAILURE};

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Ghana Card number, e.g. GHA-123456789-1.
    #[arg(long)]
    pub number: String,
}

/// Check the number and report the outcome on `out`.
pub async fn run_verify<S: KycService>(
    args: &VerifyArgs,
    service: &S,
    out: &mut impl Write,
) -> anyhow::Result<u8> {
    let values = FormValues {
        identity_number: args.number.clone(),
        ..FormValues::new()
    };
    if let Some(message) = validate_field(&values, FormField::IdentityNumber) {
        writeln!(out, "invalid: {message}")?;
        return Ok(EXIT_INVALID_INPUT);
    }
    let number = GhanaCardNumber::new(args.number.as_str())?;
    let masked = number.masked();

    tracing::info!(service = service.service_name(), number = %masked, "running identity check");
    let mut gate = VerificationGate::new();
    match gate.verify_identity_number(service, number).await? {
        VerificationState::Verified => {
            writeln!(out, "verified: {masked}")?;
            Ok(0)
        }
        VerificationState::Failed(message) => {
            writeln!(out, "not verified: {message}")?;
            Ok(EXIT_REMOTE_FAILURE)
        }
        state => anyhow::bail!("identity check ended in unexpected state {state:?}"),
    }
}
