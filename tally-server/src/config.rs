use std::env;
use std::path::PathBuf;

use tally_core::providers::DEFAULT_CINEMETA_URL;

/// Server configuration loaded from environment variables (a `.env` file is
/// honored) with sensible defaults. The common knobs can be overridden from
/// the command line in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    pub host: String,
    pub port: u16,

    /// Where the request ledger document lives.
    pub ledger_path: PathBuf,

    /// Base URL of the metadata service.
    pub cinemeta_url: String,

    /// Optional operator link surfaced in the placeholder stream entry.
    pub help_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self {
            host: env::var("TALLY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("TALLY_PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(7001),

            ledger_path: env::var("TALLY_LEDGER_PATH")
                .unwrap_or_else(|_| "./requests.json".to_string())
                .into(),

            cinemeta_url: env::var("CINEMETA_URL")
                .unwrap_or_else(|_| DEFAULT_CINEMETA_URL.to_string()),

            help_url: env::var("TALLY_HELP_URL").ok(),
        }
    }
}
