//! Request configuration for Maritaca generation calls
//!
//! [`Options`] is assembled from an ordered list of [`RequestOption`]s, or
//! through [`OptionsBuilder`], and then handed read-only to a transport.

pub mod options;
pub mod params;
pub mod types;

pub use options::{
    with_chat_mode, with_custom_template, with_do_sample, with_format, with_http_client,
    with_max_tokens, with_model, with_repetition_penalty, with_server_url, with_stopping_tokens,
    with_stream, with_system_prompt, with_temperature, with_token, with_tokens_per_message,
    with_top_p, OptionsBuilder, RequestOption,
};
pub use params::GenerationParams;
pub use types::{Options, DEFAULT_MODEL, DEFAULT_SERVER_URL};
