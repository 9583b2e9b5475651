//! Show the resolved request configuration

use crate::config::CliConfigLoader;
use anyhow::Result;
use maritaca_core::Options;
use serde_json::{json, Value};
use tracing::info;

/// Print the configuration that would be handed to the transport
pub async fn show_command(config_loader: CliConfigLoader) -> Result<()> {
    let options = config_loader.load().await?;
    info!("Resolved request configuration for model '{}'", options.model());

    println!("{}", serde_json::to_string_pretty(&render_options(&options))?);
    Ok(())
}

/// JSON view of the options with the credential masked
pub fn render_options(options: &Options) -> Value {
    json!({
        "server_url": options.server_url().as_str(),
        "model": options.model(),
        "format": options.format(),
        "system": options.system_prompt(),
        "template": options.effective_template(),
        "params": options.params().redacted(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_masks_token_and_shows_template() {
        let options = Options::builder()
            .with_token("secret-key")
            .with_custom_template("{{.Prompt}}")
            .with_max_tokens(32)
            .build()
            .unwrap();

        let rendered = render_options(&options);
        assert_eq!(rendered["params"]["token"], "***");
        assert_eq!(rendered["params"]["max_tokens"], 32);
        assert_eq!(rendered["template"], "{{.Prompt}}");
        assert!(!rendered.to_string().contains("secret-key"));
    }

    #[test]
    fn test_render_defaults() {
        let rendered = render_options(&Options::default());
        assert_eq!(rendered["server_url"], "https://chat.maritaca.ai/api");
        assert_eq!(rendered["template"], Value::Null);
        assert_eq!(rendered["params"]["tokens_per_message"], 4);
        assert!(rendered["params"].get("max_tokens").is_none());
    }
}
