//! # Submit Subcommand
//!
//! Loads the three images from disk and walks a wizard session through
//! every step, exactly as an interactive host would: fill step, Continue,
//! fill step, Continue, fill step, Submit.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use kyc_client::KycService;
use kyc_core::{FileRef, GHANA_COUNTRY_CODE};
use kyc_wizard::{FieldErrors, NextOutcome, SubmitOutcome, Wizard};

use crate::{EXIT_INVALID_INPUT, EXIT_REMOTE_FAILURE};

/// Arguments for the submit subcommand.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Ghana Card number, e.g. GHA-123456789-1.
    #[arg(long)]
    pub number: String,

    /// Image of the front of the Ghana Card.
    #[arg(long)]
    pub front: PathBuf,

    /// Image of the back of the Ghana Card.
    #[arg(long)]
    pub back: PathBuf,

    /// Mobile money country code.
    #[arg(long, default_value = GHANA_COUNTRY_CODE)]
    pub country_code: String,

    /// Mobile money number without the country code.
    #[arg(long)]
    pub momo: String,

    /// Selfie image.
    #[arg(long)]
    pub selfie: PathBuf,
}

/// Read an image into a file reference named after the file.
pub async fn load_file(path: &Path) -> anyhow::Result<FileRef> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    tracing::debug!(file = %name, bytes = bytes.len(), "loaded image");
    Ok(FileRef::with_inferred_type(name, bytes))
}

/// Drive the wizard to a result and report it on `out`.
pub async fn run_submit<S: KycService>(
    args: &SubmitArgs,
    service: &S,
    out: &mut impl Write,
) -> anyhow::Result<u8> {
    let front = load_file(&args.front).await?;
    let back = load_file(&args.back).await?;
    let selfie = load_file(&args.selfie).await?;

    let mut wizard = Wizard::new();

    wizard.set_identity_number(args.number.as_str())?;
    wizard.set_identity_front_image(Some(front))?;
    wizard.set_identity_back_image(Some(back))?;
    if let Some(code) = report_next(wizard.next(service).await?, out)? {
        return Ok(code);
    }

    wizard.set_momo_country_code(args.country_code.as_str())?;
    wizard.set_momo_number(args.momo.as_str())?;
    if let Some(code) = report_next(wizard.next(service).await?, out)? {
        return Ok(code);
    }

    wizard.set_selfie_image(Some(selfie))?;
    let code = match wizard.submit(service).await? {
        SubmitOutcome::Succeeded(summary) => {
            writeln!(out, "{summary}")?;
            0
        }
        SubmitOutcome::Failed(message) => {
            writeln!(out, "submission failed: {message}")?;
            EXIT_REMOTE_FAILURE
        }
        SubmitOutcome::Invalid(errors) => {
            write_errors(&errors, out)?;
            EXIT_INVALID_INPUT
        }
        SubmitOutcome::Ignored => anyhow::bail!("submission already in flight"),
    };
    for note in wizard.drain_notifications() {
        tracing::info!(level = ?note.level, text = %note.message, "notification");
    }
    Ok(code)
}

/// `None` when the wizard advanced, otherwise the exit code to stop with.
fn report_next(outcome: NextOutcome, out: &mut impl Write) -> anyhow::Result<Option<u8>> {
    match outcome {
        NextOutcome::Advanced(step) => {
            tracing::info!(%step, "advanced");
            Ok(None)
        }
        NextOutcome::Invalid(errors) => {
            write_errors(&errors, out)?;
            Ok(Some(EXIT_INVALID_INPUT))
        }
        NextOutcome::VerificationFailed(message) => {
            writeln!(out, "not verified: {message}")?;
            Ok(Some(EXIT_REMOTE_FAILURE))
        }
        other => anyhow::bail!("unexpected wizard outcome {other:?}"),
    }
}

fn write_errors(errors: &FieldErrors, out: &mut impl Write) -> anyhow::Result<()> {
    for (field, message) in errors.iter() {
        writeln!(out, "invalid {}: {message}", field.path())?;
    }
    Ok(())
}
