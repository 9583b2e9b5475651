//! Request options and the builder that applies them
//!
//! Every [`RequestOption`] changes exactly one concern of an [`Options`]
//! value. Options are applied strictly in the order given, so when two of
//! them touch the same field the last one wins.

use super::types::Options;
use crate::error::{ConfigError, Result};
use std::fmt;
use url::Url;

/// A single named change to an [`Options`] value
#[derive(Clone)]
pub enum RequestOption {
    /// Service endpoint, parsed when applied
    ServerUrl(String),
    /// Replacement HTTP client
    HttpClient(reqwest::Client),
    /// Model selector
    Model(String),
    /// Output format hint, e.g. "json"
    Format(String),
    /// System prompt text
    SystemPrompt(String),
    /// Override of the service-side prompt template
    CustomTemplate(String),
    /// Chat mode (true) or raw prompt completion (false)
    ChatMode(bool),
    /// Upper bound on generated tokens
    MaxTokens(u32),
    /// Enable stochastic sampling
    DoSample(bool),
    /// Sampling temperature
    Temperature(f64),
    /// Nucleus sampling threshold
    TopP(f64),
    /// Repetition penalty
    RepetitionPenalty(f64),
    /// Stop tokens, replacing any previous list
    StoppingTokens(Vec<String>),
    /// Streaming delivery
    Stream(bool),
    /// Tokens per streamed message
    TokensPerMessage(u32),
    /// Access key
    Token(String),
}

impl RequestOption {
    /// Name of the concern this option sets
    pub fn name(&self) -> &'static str {
        match self {
            RequestOption::ServerUrl(_) => "server_url",
            RequestOption::HttpClient(_) => "http_client",
            RequestOption::Model(_) => "model",
            RequestOption::Format(_) => "format",
            RequestOption::SystemPrompt(_) => "system_prompt",
            RequestOption::CustomTemplate(_) => "custom_template",
            RequestOption::ChatMode(_) => "chat_mode",
            RequestOption::MaxTokens(_) => "max_tokens",
            RequestOption::DoSample(_) => "do_sample",
            RequestOption::Temperature(_) => "temperature",
            RequestOption::TopP(_) => "top_p",
            RequestOption::RepetitionPenalty(_) => "repetition_penalty",
            RequestOption::StoppingTokens(_) => "stopping_tokens",
            RequestOption::Stream(_) => "stream",
            RequestOption::TokensPerMessage(_) => "tokens_per_message",
            RequestOption::Token(_) => "token",
        }
    }

    /// Apply this option to `options` in place.
    ///
    /// Only [`RequestOption::ServerUrl`] can fail; on failure `options` is
    /// left untouched.
    pub fn apply(self, options: &mut Options) -> Result<()> {
        tracing::debug!("Applying request option: {}", self.name());

        let params = &mut options.params;
        match self {
            RequestOption::ServerUrl(raw) => options.server_url = parse_server_url(raw)?,
            RequestOption::HttpClient(client) => options.http_client = client,
            RequestOption::Model(model) => options.model = model,
            RequestOption::Format(format) => options.format = format,
            RequestOption::SystemPrompt(system) => options.system = system,
            RequestOption::CustomTemplate(template) => options.custom_template = template,
            RequestOption::ChatMode(chat_mode) => params.chat_mode = chat_mode,
            RequestOption::MaxTokens(max_tokens) => params.max_tokens = Some(max_tokens),
            RequestOption::DoSample(do_sample) => params.do_sample = do_sample,
            RequestOption::Temperature(temperature) => params.temperature = temperature,
            RequestOption::TopP(top_p) => params.top_p = top_p,
            RequestOption::RepetitionPenalty(penalty) => params.repetition_penalty = penalty,
            RequestOption::StoppingTokens(tokens) => params.stopping_tokens = tokens,
            RequestOption::Stream(stream) => params.stream = stream,
            RequestOption::TokensPerMessage(n) => params.tokens_per_message = n,
            RequestOption::Token(token) => params.token = token,
        }

        Ok(())
    }
}

/// Parse an endpoint, refusing control characters that the WHATWG parser
/// would otherwise strip silently
fn parse_server_url(raw: String) -> Result<Url> {
    if raw.chars().any(char::is_control) {
        tracing::error!("Invalid server URL {:?}: contains control characters", raw);
        return Err(ConfigError::ServerUrlControlCharacter { url: raw }.into());
    }

    Url::parse(&raw).map_err(|source| {
        tracing::error!("Invalid server URL {:?}: {}", raw, source);
        ConfigError::InvalidServerUrl { url: raw, source }.into()
    })
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple(self.name());
        match self {
            RequestOption::ServerUrl(v)
            | RequestOption::Model(v)
            | RequestOption::Format(v)
            | RequestOption::SystemPrompt(v)
            | RequestOption::CustomTemplate(v) => tuple.field(v),
            RequestOption::HttpClient(client) => tuple.field(client),
            RequestOption::ChatMode(v) | RequestOption::DoSample(v) | RequestOption::Stream(v) => {
                tuple.field(v)
            }
            RequestOption::MaxTokens(v) | RequestOption::TokensPerMessage(v) => tuple.field(v),
            RequestOption::Temperature(v)
            | RequestOption::TopP(v)
            | RequestOption::RepetitionPenalty(v) => tuple.field(v),
            RequestOption::StoppingTokens(tokens) => tuple.field(tokens),
            RequestOption::Token(_) => tuple.field(&"***"),
        };
        tuple.finish()
    }
}

/// Set the URL of the Maritaca instance to use.
///
/// The URL must be absolute. Empty or relative input is rejected, as is any
/// control character (tab, CR and LF included).
pub fn with_server_url(url: impl Into<String>) -> RequestOption {
    RequestOption::ServerUrl(url.into())
}

/// Set a custom HTTP client
pub fn with_http_client(client: reqwest::Client) -> RequestOption {
    RequestOption::HttpClient(client)
}

/// Set the model to use
pub fn with_model(model: impl Into<String>) -> RequestOption {
    RequestOption::Model(model.into())
}

/// Set the output format (the service currently understands "json")
pub fn with_format(format: impl Into<String>) -> RequestOption {
    RequestOption::Format(format.into())
}

/// Set the system prompt.
///
/// Only takes effect when the model template, or the custom template,
/// references the system prompt.
pub fn with_system_prompt(system: impl Into<String>) -> RequestOption {
    RequestOption::SystemPrompt(system.into())
}

/// Override the templating done on the model side
pub fn with_custom_template(template: impl Into<String>) -> RequestOption {
    RequestOption::CustomTemplate(template.into())
}

/// Run in chat mode (default) or plain prompt completion
pub fn with_chat_mode(chat_mode: bool) -> RequestOption {
    RequestOption::ChatMode(chat_mode)
}

/// Set the maximum number of generated tokens (minimum 1)
pub fn with_max_tokens(max_tokens: u32) -> RequestOption {
    RequestOption::MaxTokens(max_tokens)
}

/// Sample with top-k/nucleus filtering (default) or pick the most probable token
pub fn with_do_sample(do_sample: bool) -> RequestOption {
    RequestOption::DoSample(do_sample)
}

/// Set the sampling temperature (minimum 0, default 0.7)
pub fn with_temperature(temperature: f64) -> RequestOption {
    RequestOption::Temperature(temperature)
}

/// Set the nucleus filtering threshold in (0, 1], default 0.95
pub fn with_top_p(top_p: f64) -> RequestOption {
    RequestOption::TopP(top_p)
}

/// Set the repetition penalty (minimum 0, default 1)
pub fn with_repetition_penalty(penalty: f64) -> RequestOption {
    RequestOption::RepetitionPenalty(penalty)
}

/// Set the tokens that end generation
pub fn with_stopping_tokens<I, S>(tokens: I) -> RequestOption
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    RequestOption::StoppingTokens(tokens.into_iter().map(Into::into).collect())
}

/// Stream tokens as they are produced (default false)
pub fn with_stream(stream: bool) -> RequestOption {
    RequestOption::Stream(stream)
}

/// Set how many tokens each streamed message carries (minimum 1, default 4)
pub fn with_tokens_per_message(tokens_per_message: u32) -> RequestOption {
    RequestOption::TokensPerMessage(tokens_per_message)
}

/// Set the access key
pub fn with_token(token: impl Into<String>) -> RequestOption {
    RequestOption::Token(token.into())
}

impl Options {
    /// Apply `options` in order over the defaults.
    ///
    /// Returns the first error encountered; nothing is returned on failure.
    pub fn from_options<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = RequestOption>,
    {
        let mut resolved = Options::default();
        for option in options {
            option.apply(&mut resolved)?;
        }
        Ok(resolved)
    }

    /// Start a builder over the defaults
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}

/// Builder for creating [`Options`] through chained setters
#[derive(Debug, Default)]
pub struct OptionsBuilder {
    options: Options,
    error: Option<crate::error::Error>,
}

impl OptionsBuilder {
    /// Create a new builder over the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single option. The first failure is kept and reported by
    /// [`build`](Self::build).
    pub fn option(mut self, option: RequestOption) -> Self {
        if let Err(err) = option.apply(&mut self.options) {
            if self.error.is_none() {
                self.error = Some(err);
            }
        }
        self
    }

    /// Apply several options in order
    pub fn options<I>(self, options: I) -> Self
    where
        I: IntoIterator<Item = RequestOption>,
    {
        options.into_iter().fold(self, Self::option)
    }

    /// Set server URL
    pub fn with_server_url(self, url: impl Into<String>) -> Self {
        self.option(with_server_url(url))
    }

    /// Set HTTP client
    pub fn with_http_client(self, client: reqwest::Client) -> Self {
        self.option(with_http_client(client))
    }

    /// Set model
    pub fn with_model(self, model: impl Into<String>) -> Self {
        self.option(with_model(model))
    }

    /// Set output format
    pub fn with_format(self, format: impl Into<String>) -> Self {
        self.option(with_format(format))
    }

    /// Set system prompt
    pub fn with_system_prompt(self, system: impl Into<String>) -> Self {
        self.option(with_system_prompt(system))
    }

    /// Set custom template
    pub fn with_custom_template(self, template: impl Into<String>) -> Self {
        self.option(with_custom_template(template))
    }

    /// Set chat mode
    pub fn with_chat_mode(self, chat_mode: bool) -> Self {
        self.option(with_chat_mode(chat_mode))
    }

    /// Set maximum tokens
    pub fn with_max_tokens(self, max_tokens: u32) -> Self {
        self.option(with_max_tokens(max_tokens))
    }

    /// Set sampling
    pub fn with_do_sample(self, do_sample: bool) -> Self {
        self.option(with_do_sample(do_sample))
    }

    /// Set temperature
    pub fn with_temperature(self, temperature: f64) -> Self {
        self.option(with_temperature(temperature))
    }

    /// Set top-p
    pub fn with_top_p(self, top_p: f64) -> Self {
        self.option(with_top_p(top_p))
    }

    /// Set repetition penalty
    pub fn with_repetition_penalty(self, penalty: f64) -> Self {
        self.option(with_repetition_penalty(penalty))
    }

    /// Set stopping tokens
    pub fn with_stopping_tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.option(with_stopping_tokens(tokens))
    }

    /// Set streaming
    pub fn with_stream(self, stream: bool) -> Self {
        self.option(with_stream(stream))
    }

    /// Set tokens per streamed message
    pub fn with_tokens_per_message(self, tokens_per_message: u32) -> Self {
        self.option(with_tokens_per_message(tokens_per_message))
    }

    /// Set access key
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.option(with_token(token))
    }

    /// Finish building, reporting the first option that failed
    pub fn build(self) -> Result<Options> {
        if let Some(err) = self.error {
            return Err(err);
        }

        tracing::debug!(
            "Built request options for model '{}' at {} (stream: {})",
            self.options.model,
            self.options.server_url,
            self.options.params.stream
        );
        Ok(self.options)
    }
}
