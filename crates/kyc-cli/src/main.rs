//! # kyc CLI entry point
//!
//! Parses command-line arguments, initialises tracing, builds the KYC
//! client, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use kyc_cli::logging::{init_logging, LogFormat};
use kyc_cli::submit::{run_submit, SubmitArgs};
use kyc_cli::verify::{run_verify, VerifyArgs};
use kyc_cli::ServiceArgs;
use kyc_client::KycClient;

/// KYC wizard, headless.
///
/// Verifies Ghana Card numbers and submits KYC bundles (card images, mobile
/// money number, selfie) to the KYC service.
#[derive(Parser, Debug)]
#[command(name = "kyc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as newline-delimited JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a Ghana Card number against the identity registry.
    Verify(VerifyArgs),

    /// Run every wizard step and submit the KYC bundle.
    Submit(SubmitArgs),
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = cli.service.client_config()?;
    tracing::debug!(?config, "client configuration");
    let client = KycClient::new(config)?;

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Commands::Verify(args) => run_verify(args, &client, &mut stdout).await,
        Commands::Submit(args) => run_submit(args, &client, &mut stdout).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Human
    };
    init_logging(format, cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_verify() {
        let cli = Cli::try_parse_from(["kyc", "verify", "--number", "GHA-123456789-1"]).unwrap();
        match cli.command {
            Commands::Verify(args) => assert_eq!(args.number, "GHA-123456789-1"),
            other => panic!("expected Verify, got: {other:?}"),
        }
        assert_eq!(cli.verbose, 0);
        assert!(!cli.json);
    }

    #[test]
    fn cli_parse_submit_with_defaults() {
        let cli = Cli::try_parse_from([
            "kyc", "submit", "--number", "GHA-123456789-1", "--front", "f.jpg", "--back",
            "b.jpg", "--momo", "244000000", "--selfie", "s.png",
        ])
        .unwrap();
        match cli.command {
            Commands::Submit(args) => {
                assert_eq!(args.country_code, "+233");
                assert_eq!(args.front, PathBuf::from("f.jpg"));
                assert_eq!(args.selfie, PathBuf::from("s.png"));
            }
            other => panic!("expected Submit, got: {other:?}"),
        }
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "kyc",
            "-vv",
            "--json",
            "verify",
            "--number",
            "GHA-123456789-1",
            "--base-url",
            "https://kyc.example.com",
            "--timeout-secs",
            "10",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert_eq!(cli.service.base_url.as_deref(), Some("https://kyc.example.com"));
        assert_eq!(cli.service.timeout_secs, Some(10));
    }

    #[test]
    fn cli_parse_submit_requires_images() {
        let result = Cli::try_parse_from(["kyc", "submit", "--number", "GHA-123456789-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["kyc"]).is_err());
    }
}
