//! The finished request configuration handed to the transport layer
//!
//! An [`Options`] value is only populated through
//! [`RequestOption`](super::RequestOption)s; once built it is read-only.

use super::params::GenerationParams;
use crate::error::{ConfigError, Result};
use url::Url;

/// Default Maritaca API endpoint
pub const DEFAULT_SERVER_URL: &str = "https://chat.maritaca.ai/api";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "sabia-2-medium";

/// Connection and request settings for one generation call
#[derive(Debug, Clone)]
pub struct Options {
    pub(super) server_url: Url,
    pub(super) http_client: reqwest::Client,
    pub(super) model: String,
    pub(super) format: String,
    pub(super) system: String,
    pub(super) custom_template: String,
    pub(super) params: GenerationParams,
}

impl Options {
    /// Location of the service
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Shared HTTP client used by the transport
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Model selector, validated remotely
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Output format hint; empty means plain text
    pub fn format(&self) -> &str {
        &self.format
    }

    /// System prompt injected ahead of the conversation
    pub fn system_prompt(&self) -> &str {
        &self.system
    }

    /// Stored template override, possibly empty
    pub fn custom_template(&self) -> &str {
        &self.custom_template
    }

    /// Sampling and decoding parameters
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Access key for the service
    pub fn token(&self) -> &str {
        &self.params.token
    }

    /// Whether the custom template replaces service-side templating
    pub fn uses_custom_template(&self) -> bool {
        !self.custom_template.is_empty()
    }

    /// Template that applies at request time.
    ///
    /// `Some` carries the custom template, which replaces the service's
    /// templating entirely and must reference the system prompt itself.
    /// `None` means the model's own template is used.
    pub fn effective_template(&self) -> Option<&str> {
        if self.uses_custom_template() {
            Some(&self.custom_template)
        } else {
            None
        }
    }

    /// Check parameter ranges locally.
    ///
    /// Building never calls this; out-of-range values are otherwise
    /// forwarded to the service as-is.
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(ConfigError::MissingField {
                field: "model".to_string(),
            }
            .into());
        }

        let params = &self.params;

        if params.temperature.is_nan() || params.temperature < 0.0 {
            return Err(invalid("temperature", params.temperature));
        }

        if params.top_p.is_nan() || params.top_p <= 0.0 || params.top_p > 1.0 {
            return Err(invalid("top_p", params.top_p));
        }

        if params.repetition_penalty.is_nan() || params.repetition_penalty < 0.0 {
            return Err(invalid("repetition_penalty", params.repetition_penalty));
        }

        if let Some(max_tokens) = params.max_tokens {
            if max_tokens < 1 {
                return Err(invalid("max_tokens", max_tokens));
            }
        }

        if params.tokens_per_message < 1 {
            return Err(invalid("tokens_per_message", params.tokens_per_message));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> crate::error::Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl Default for Options {
    fn default() -> Self {
        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            http_client: reqwest::Client::new(),
            model: DEFAULT_MODEL.to_string(),
            format: String::new(),
            system: String::new(),
            custom_template: String::new(),
            params: GenerationParams::default(),
        }
    }
}
