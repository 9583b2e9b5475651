//! Validate the resolved request configuration

use crate::config::CliConfigLoader;
use anyhow::{Context, Result};
use maritaca_core::Options;
use tracing::{info, warn};

/// Printed when every local check passes
pub const VALID_MESSAGE: &str = "✅ Configuration is valid";

/// Build the configuration and run the local range checks
pub async fn check_command(config_loader: CliConfigLoader) -> Result<()> {
    let options = config_loader.load().await?;

    println!("{}", check_options(&options)?);
    Ok(())
}

/// Validate already built options, returning the message to print
pub fn check_options(options: &Options) -> Result<&'static str> {
    options
        .validate()
        .context("Configuration validation failed")?;

    if !options.params().has_token() {
        warn!("No access key configured; set MARITACA_API_KEY or pass --token");
    }

    info!("Configuration for '{}' at {} is valid", options.model(), options.server_url());
    Ok(VALID_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_configuration_message() {
        let options = Options::builder().with_token("k").build().unwrap();
        assert_eq!(check_options(&options).unwrap(), "✅ Configuration is valid");
    }

    #[test]
    fn test_out_of_range_configuration_fails() {
        let options = Options::builder().with_top_p(1.5).build().unwrap();
        let err = check_options(&options).unwrap_err();
        let rendered = format!("{:#}", err);
        assert!(rendered.contains("Configuration validation failed"));
        assert!(rendered.contains("top_p"));
    }
}
