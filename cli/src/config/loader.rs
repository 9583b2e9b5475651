//! CLI configuration loader for maritaca
//!
//! Settings are layered as an ordered list of request options, lowest
//! priority first:
//! 1. Environment variables (MARITACA_API_KEY, MARITACA_SERVER_URL, MARITACA_MODEL)
//! 2. A single config file, the first one found of:
//!    - --config file/dir
//!    - ./maritaca.json or ./.maritaca/config.json
//!    - $XDG_CONFIG_HOME/maritaca/config.json (or the platform config dir)
//! 3. Flag overrides

use anyhow::{anyhow, Context, Result};
use maritaca_core::config::{
    with_chat_mode, with_custom_template, with_do_sample, with_format, with_max_tokens,
    with_model, with_repetition_penalty, with_server_url, with_stopping_tokens, with_stream,
    with_system_prompt, with_temperature, with_token, with_tokens_per_message, with_top_p,
};
use maritaca_core::{Options, RequestOption};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const ENV_API_KEY: &str = "MARITACA_API_KEY";
pub const ENV_SERVER_URL: &str = "MARITACA_SERVER_URL";
pub const ENV_MODEL: &str = "MARITACA_MODEL";

/// Raw configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Service endpoint
    pub server_url: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Output format hint
    pub format: Option<String>,
    /// System prompt
    pub system: Option<String>,
    /// Custom prompt template
    pub template: Option<String>,
    /// Access key (can be "env:VAR_NAME" for environment variable)
    pub token: Option<String>,
    /// Generation parameters (optional)
    #[serde(default)]
    pub params: RawParams,
}

/// Generation parameters as written in a config file; unset fields keep
/// whatever earlier layers chose
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawParams {
    pub chat_mode: Option<bool>,
    pub max_tokens: Option<u32>,
    pub do_sample: Option<bool>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub repetition_penalty: Option<f64>,
    pub stopping_tokens: Option<Vec<String>>,
    pub stream: Option<bool>,
    pub tokens_per_message: Option<u32>,
}

impl RawConfig {
    /// Turn the file contents into request options, resolving `env:` tokens
    /// through `lookup`
    pub fn into_options<F>(self, lookup: F) -> Result<Vec<RequestOption>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Vec::new();

        if let Some(url) = self.server_url {
            options.push(with_server_url(url));
        }
        if let Some(model) = self.model {
            options.push(with_model(model));
        }
        if let Some(format) = self.format {
            options.push(with_format(format));
        }
        if let Some(system) = self.system {
            options.push(with_system_prompt(system));
        }
        if let Some(template) = self.template {
            options.push(with_custom_template(template));
        }
        if let Some(token) = self.token {
            options.push(with_token(resolve_token(&token, &lookup)?));
        }

        let params = self.params;
        options.extend(params.chat_mode.map(with_chat_mode));
        options.extend(params.max_tokens.map(with_max_tokens));
        options.extend(params.do_sample.map(with_do_sample));
        options.extend(params.temperature.map(with_temperature));
        options.extend(params.top_p.map(with_top_p));
        options.extend(params.repetition_penalty.map(with_repetition_penalty));
        options.extend(params.stopping_tokens.map(with_stopping_tokens));
        options.extend(params.stream.map(with_stream));
        options.extend(params.tokens_per_message.map(with_tokens_per_message));

        Ok(options)
    }
}

/// Resolve an `env:VAR_NAME` reference, or return the literal token
fn resolve_token<F>(token: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match token.strip_prefix("env:") {
        Some(var_name) => {
            lookup(var_name).ok_or_else(|| anyhow!("Environment variable not found: {}", var_name))
        }
        None => Ok(token.to_string()),
    }
}

/// Options taken from MARITACA_* environment variables
pub fn env_options<F>(lookup: F) -> Vec<RequestOption>
where
    F: Fn(&str) -> Option<String>,
{
    let mut options = Vec::new();

    if let Some(url) = lookup(ENV_SERVER_URL) {
        options.push(with_server_url(url));
    }
    if let Some(model) = lookup(ENV_MODEL) {
        options.push(with_model(model));
    }
    if let Some(token) = lookup(ENV_API_KEY) {
        options.push(with_token(token));
    }

    options
}

/// Keep only the last option for each concern.
///
/// Later layers override earlier ones, so a shadowed value (for example a
/// malformed URL in the environment replaced by a flag) is never applied.
pub fn last_per_concern(options: Vec<RequestOption>) -> Vec<RequestOption> {
    let mut seen = HashSet::new();
    let mut kept: Vec<_> = options
        .into_iter()
        .rev()
        .filter(|option| seen.insert(option.name()))
        .collect();
    kept.reverse();
    kept
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    server_url_override: Option<String>,
    model_override: Option<String>,
    token_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            server_url_override: None,
            model_override: None,
            token_override: None,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set server URL override
    pub fn with_server_url_override(mut self, server_url: String) -> Self {
        self.server_url_override = Some(server_url);
        self
    }

    /// Set model override
    pub fn with_model_override(mut self, model: String) -> Self {
        self.model_override = Some(model);
        self
    }

    /// Set token override
    pub fn with_token_override(mut self, token: String) -> Self {
        self.token_override = Some(token);
        self
    }

    /// Load and build the request options
    pub async fn load(&self) -> Result<Options> {
        let options = self.load_options(|name| std::env::var(name).ok()).await?;

        Options::from_options(options).context("Failed to build request configuration")
    }

    /// Collect request options from every layer, lowest priority first
    pub async fn load_options<F>(&self, lookup: F) -> Result<Vec<RequestOption>>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Step 1: Environment
        let mut options = env_options(&lookup);

        // Step 2: Config file
        let raw = if let Some(override_path) = &self.config_override {
            let raw = self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?;
            Some(raw)
        } else {
            self.search_and_load().await?
        };

        if let Some(mut raw) = raw {
            // A flag token replaces the file's, so its env: reference is never read
            if self.token_override.is_some() {
                raw.token = None;
            }
            options.extend(raw.into_options(&lookup)?);
        } else {
            tracing::debug!("No config file found, using environment and flags only");
        }

        // Step 3: Flag overrides
        if let Some(server_url) = &self.server_url_override {
            options.push(with_server_url(server_url.clone()));
        }
        if let Some(model) = &self.model_override {
            options.push(with_model(model.clone()));
        }
        if let Some(token) = &self.token_override {
            options.push(with_token(token.clone()));
        }

        let options = last_per_concern(options);
        tracing::debug!("Collected {} request options", options.len());
        Ok(options)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<Option<RawConfig>> {
        // 1. Current working directory
        if let Some(config) = self.try_load_cwd().await? {
            return Ok(Some(config));
        }

        // 2. User config directory
        self.try_load_user_config().await
    }

    /// Try loading from current working directory
    async fn try_load_cwd(&self) -> Result<Option<RawConfig>> {
        let cwd = std::env::current_dir()?;

        // Try ./maritaca.json first
        let maritaca_json = cwd.join("maritaca.json");
        if maritaca_json.exists() {
            return Ok(Some(self.load_file(&maritaca_json).await?));
        }

        // Try ./.maritaca/config.json
        let dir_config = cwd.join(".maritaca").join("config.json");
        if dir_config.exists() {
            return Ok(Some(self.load_file(&dir_config).await?));
        }

        Ok(None)
    }

    /// Try loading from the user config directory
    async fn try_load_user_config(&self) -> Result<Option<RawConfig>> {
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("maritaca").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            // Try config.json in the directory
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        tracing::debug!("Loading config file: {}", path.display());

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[tokio::test]
    async fn test_file_overrides_env_and_flags_override_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("maritaca.json");
        let content = r#"{
            "server_url": "http://localhost:8080",
            "model": "sabia-3",
            "token": "env:MY_KEY",
            "params": { "temperature": 0.2, "stream": true, "stopping_tokens": ["\n"] }
        }"#;
        tokio::fs::write(&config_path, content).await.unwrap();

        let loader = CliConfigLoader::new()
            .with_config_override(config_path)
            .with_model_override("sabia-2-small".to_string());

        let lookup = env(&[
            ("MY_KEY", "file-key"),
            (ENV_MODEL, "env-model"),
            (ENV_SERVER_URL, "https://env.example.com"),
        ]);
        let options = Options::from_options(loader.load_options(lookup).await.unwrap()).unwrap();

        assert_eq!(options.server_url().host_str(), Some("localhost"));
        assert_eq!(options.model(), "sabia-2-small");
        assert_eq!(options.token(), "file-key");
        assert_eq!(options.params().temperature, 0.2);
        assert!(options.params().stream);
        assert_eq!(options.params().stopping_tokens, vec!["\n".to_string()]);
        // Untouched by any layer
        assert_eq!(options.params().top_p, 0.95);
        assert_eq!(options.params().tokens_per_message, 4);
    }

    #[tokio::test]
    async fn test_env_fills_fields_missing_from_file() {
        let temp_dir = tempdir().unwrap();
        tokio::fs::write(temp_dir.path().join("config.json"), r#"{ "model": "sabia-3" }"#)
            .await
            .unwrap();

        let loader = CliConfigLoader::new().with_config_override(temp_dir.path().to_path_buf());
        let lookup = env(&[(ENV_API_KEY, "env-key"), (ENV_MODEL, "env-model")]);
        let options = Options::from_options(loader.load_options(lookup).await.unwrap()).unwrap();

        assert_eq!(options.model(), "sabia-3");
        assert_eq!(options.token(), "env-key");
    }

    #[tokio::test]
    async fn test_missing_env_token_reference_fails() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "token": "env:NOT_SET_ANYWHERE" }"#)
            .await
            .unwrap();

        let loader = CliConfigLoader::new().with_config_override(config_path);
        let err = loader.load_options(env(&[])).await.unwrap_err();
        assert!(err.to_string().contains("NOT_SET_ANYWHERE"));
    }

    #[tokio::test]
    async fn test_bad_override_paths() {
        let temp_dir = tempdir().unwrap();

        // Directory without config.json
        let loader = CliConfigLoader::new().with_config_override(temp_dir.path().to_path_buf());
        assert!(loader.load_options(env(&[])).await.is_err());

        // Nonexistent path
        let loader =
            CliConfigLoader::new().with_config_override(temp_dir.path().join("missing.json"));
        assert!(loader.load_options(env(&[])).await.is_err());

        // Unknown field
        let config_path = temp_dir.path().join("typo.json");
        tokio::fs::write(&config_path, r#"{ "modle": "sabia-3" }"#)
            .await
            .unwrap();
        let loader = CliConfigLoader::new().with_config_override(config_path);
        let err = loader.load_options(env(&[])).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[tokio::test]
    async fn test_invalid_server_url_surfaces_at_build() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "server_url": "not a url" }"#)
            .await
            .unwrap();

        let loader = CliConfigLoader::new().with_config_override(config_path);
        let options = loader.load_options(env(&[])).await.unwrap();
        assert!(Options::from_options(options).is_err());
    }

    #[tokio::test]
    async fn test_flags_shadow_bad_lower_layers() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, "{}").await.unwrap();

        // Bad env URL overridden by a flag
        let loader = CliConfigLoader::new()
            .with_config_override(config_path.clone())
            .with_server_url_override("http://localhost:8080".to_string());
        let lookup = env(&[(ENV_SERVER_URL, "bad url")]);
        let options = Options::from_options(loader.load_options(lookup).await.unwrap()).unwrap();
        assert_eq!(options.server_url().host_str(), Some("localhost"));

        // Bad file URL and unresolvable file token overridden by flags
        tokio::fs::write(
            &config_path,
            r#"{ "server_url": "http://bad\nhost", "token": "env:MISSING_KEY" }"#,
        )
        .await
        .unwrap();
        let loader = CliConfigLoader::new()
            .with_config_override(config_path)
            .with_server_url_override("https://chat.maritaca.ai/api".to_string())
            .with_token_override("flag-key".to_string());
        let options = Options::from_options(loader.load_options(env(&[])).await.unwrap()).unwrap();
        assert_eq!(options.server_url().as_str(), "https://chat.maritaca.ai/api");
        assert_eq!(options.token(), "flag-key");
    }

    #[tokio::test]
    async fn test_bad_file_url_shadows_good_env_url() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.json");
        tokio::fs::write(&config_path, r#"{ "server_url": "not a url" }"#)
            .await
            .unwrap();

        let loader = CliConfigLoader::new().with_config_override(config_path);
        let lookup = env(&[(ENV_SERVER_URL, "http://localhost:8080")]);
        let options = loader.load_options(lookup).await.unwrap();
        assert!(Options::from_options(options).is_err());
    }

    #[test]
    fn test_last_per_concern_keeps_latest_values() {
        let options = last_per_concern(vec![
            with_server_url("bad url"),
            with_model("env-model"),
            with_temperature(0.3),
            with_server_url("http://localhost:8080"),
            with_model("flag-model"),
        ]);

        let names: Vec<_> = options.iter().map(RequestOption::name).collect();
        assert_eq!(names, vec!["temperature", "server_url", "model"]);

        let built = Options::from_options(options).unwrap();
        assert_eq!(built.model(), "flag-model");
        assert_eq!(built.params().temperature, 0.3);
    }

    #[test]
    fn test_env_options_order_and_content() {
        let options = env_options(env(&[(ENV_MODEL, "sabia-3"), (ENV_API_KEY, "k")]));
        let names: Vec<_> = options.iter().map(RequestOption::name).collect();
        assert_eq!(names, vec!["model", "token"]);
    }

    #[test]
    fn test_literal_token_is_kept() {
        let raw = RawConfig {
            token: Some("literal-key".to_string()),
            ..Default::default()
        };
        let options = Options::from_options(raw.into_options(env(&[])).unwrap()).unwrap();
        assert_eq!(options.token(), "literal-key");
    }
}
