//! # kyc-cli -- Headless KYC Wizard Driver
//!
//! Runs the wizard without a UI: every subcommand feeds its arguments
//! through the same `Wizard` session a graphical host would use, so the
//! validation messages, identity gate, and submission outcome are
//! identical.
//!
//! ## Subcommands
//!
//! - `verify` -- Check a Ghana Card number against the service
//! - `submit` -- Walk all three steps and submit the KYC bundle
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Verified / submitted |
//! | 1 | The service declined or could not be reached |
//! | 2 | Input failed local validation |

pub mod logging;
pub mod submit;
pub mod verify;

use clap::Args;
use kyc_client::KycClientConfig;

/// Exit code for a declined or failed remote call.
pub const EXIT_REMOTE_FAILURE: u8 = 1;

/// Exit code for input rejected before any remote call.
pub const EXIT_INVALID_INPUT: u8 = 2;

/// Connection flags shared by every subcommand.
///
/// Unset flags fall back to `KYC_API_BASE_URL` and `KYC_TIMEOUT_SECS`. The
/// bearer token is only read from `KYC_API_TOKEN`.
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Base URL of the KYC service.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl ServiceArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn client_config(&self) -> anyhow::Result<KycClientConfig> {
        let mut config = KycClientConfig::from_env()?;
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        Ok(config)
    }
}
