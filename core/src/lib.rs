//! # Maritaca Core
//!
//! Typed request configuration for the Maritaca text-generation service.
//!
//! A request is described by an [`Options`] value built from independent
//! [`RequestOption`]s applied over documented defaults:
//!
//! ```no_run
//! use maritaca_core::config::{with_max_tokens, with_model, with_stream};
//! use maritaca_core::Options;
//!
//! let options = Options::from_options([
//!     with_model("sabia-2-medium"),
//!     with_max_tokens(256),
//!     with_stream(true),
//! ])?;
//! assert!(options.params().stream);
//! # Ok::<(), maritaca_core::error::Error>(())
//! ```

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{GenerationParams, Options, OptionsBuilder, RequestOption};
pub use error::{ConfigError, Error, Result};

/// Log filter used by [`init_tracing_with_debug`]
fn tracing_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Initialize tracing with a specific debug mode.
///
/// Logs go to stderr so that stdout stays free for command output.
pub fn init_tracing_with_debug(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(tracing_filter(debug)))
        .with_writer(std::io::stderr)
        .init();
}
