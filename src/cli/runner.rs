//! CLI command execution

use super::commands::{Cli, Commands};
use crate::auth::Authenticator;
use crate::claims;
use crate::config::ScanConfig;
use crate::error::{Result, ResultExt};
use crate::store::MemoryStore;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

/// Executes CLI commands
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for parsed arguments.
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command.
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Inspect { token } => self.inspect(token),
            Commands::Validate => self.validate(),
        }
    }

    fn load_config(&self) -> Result<ScanConfig> {
        match &self.cli.config {
            Some(path) => ScanConfig::from_yaml_file(path)
                .with_context(|| format!("loading guard config from {}", path.display())),
            None => Ok(ScanConfig::from_env()),
        }
    }

    /// Perform one login against the configured target and report the
    /// outcome, so authentication flakiness can be diagnosed before a
    /// long-running scan.
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;

        let store = Arc::new(MemoryStore::new());
        let authenticator = Authenticator::new(&config, store)?;

        println!("probing {}", authenticator.login_url());
        let credential = authenticator.login().await?;

        println!("login ok: token {}…", mask(&credential.token));
        match credential.expires_at {
            Some(at) => println!("expires at {at}"),
            None => println!("no readable expiry claim; relying on invalidation signals"),
        }
        Ok(())
    }

    fn inspect(&self, token: &str) -> Result<()> {
        let millis = claims::decode_expiry_millis(token);
        if millis == 0 {
            println!("no readable expiry claim");
            return Ok(());
        }

        match Utc.timestamp_millis_opt(millis).single() {
            Some(at) => println!("expires at {at} ({millis} ms since epoch)"),
            None => println!("expiry claim out of range: {millis} ms since epoch"),
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;
        println!(
            "configuration ok: target {} login {}",
            config.base_url, config.login_path
        );
        Ok(())
    }
}

/// First few characters of a token, for display without leaking it.
fn mask(token: &str) -> &str {
    match token.char_indices().nth(8) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
