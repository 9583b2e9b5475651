//! Sampling and decoding parameters for a single generation call

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default nucleus sampling threshold
pub const DEFAULT_TOP_P: f64 = 0.95;

/// Neutral repetition penalty
pub const DEFAULT_REPETITION_PENALTY: f64 = 1.0;

/// Default number of tokens batched into one streamed message
pub const DEFAULT_TOKENS_PER_MESSAGE: u32 = 4;

const REDACTED: &str = "***";

/// Every tunable knob of one generation request.
///
/// Values are stored as given. Range checks live in
/// [`Options::validate`](crate::config::Options::validate) and are opt-in;
/// the remote service is the enforcement point otherwise.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Structured conversation turns (true) or a single raw prompt (false)
    pub chat_mode: bool,

    /// Upper bound on generated tokens; `None` leaves it to the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Stochastic sampling (true) or always the most probable token (false)
    pub do_sample: bool,

    /// Sampling temperature, greater than or equal to zero
    pub temperature: f64,

    /// Nucleus filtering cutoff in (0, 1]
    pub top_p: f64,

    /// Penalty applied to already generated tokens; 1 is neutral
    pub repetition_penalty: f64,

    /// Generation stops as soon as any of these is produced
    pub stopping_tokens: Vec<String>,

    /// Deliver tokens incrementally instead of one complete response
    pub stream: bool,

    /// Tokens per streamed message, ignored unless `stream` is set
    pub tokens_per_message: u32,

    /// Access key for the service
    pub token: String,
}

impl GenerationParams {
    /// Copy of these parameters with the credential masked, safe to display
    pub fn redacted(&self) -> Self {
        let mut params = self.clone();
        if !params.token.is_empty() {
            params.token = REDACTED.to_string();
        }
        params
    }

    /// Whether a credential has been set
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            chat_mode: true,
            max_tokens: None,
            do_sample: true,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            repetition_penalty: DEFAULT_REPETITION_PENALTY,
            stopping_tokens: Vec::new(),
            stream: false,
            tokens_per_message: DEFAULT_TOKENS_PER_MESSAGE,
            token: String::new(),
        }
    }
}

impl fmt::Debug for GenerationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { REDACTED };
        f.debug_struct("GenerationParams")
            .field("chat_mode", &self.chat_mode)
            .field("max_tokens", &self.max_tokens)
            .field("do_sample", &self.do_sample)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("repetition_penalty", &self.repetition_penalty)
            .field("stopping_tokens", &self.stopping_tokens)
            .field("stream", &self.stream)
            .field("tokens_per_message", &self.tokens_per_message)
            .field("token", &token)
            .finish()
    }
}
