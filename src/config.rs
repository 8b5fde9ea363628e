use crate::defaults;
use crate::error::{Result, SalesqlError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
    /// Number of inference threads (None = auto-detect)
    pub threads: Option<usize>,
}

/// Completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// URL of the hosted text-generation endpoint
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

/// Chat surface configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key_env: defaults::DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SalesqlError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                SalesqlError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or return defaults if the file doesn't exist
    ///
    /// Only falls back to defaults when the file is missing.
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(SalesqlError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SALESQL_MODEL → stt.model
    /// - SALESQL_LANGUAGE → stt.language
    /// - SALESQL_ENDPOINT → llm.endpoint
    /// - SALESQL_PORT → server.port
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("SALESQL_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(language) = std::env::var("SALESQL_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(endpoint) = std::env::var("SALESQL_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.llm.endpoint = endpoint;
        }

        if let Ok(port) = std::env::var("SALESQL_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/salesql/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("salesql")
            .join("config.toml")
    }

    /// Render the effective configuration as TOML.
    pub fn to_display_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SalesqlError::Other(format!("Failed to render config: {e}")))
    }

    /// Look up a single value by dotted path, e.g. `stt.model`.
    pub fn get_value_by_path(&self, key: &str) -> Result<String> {
        let value =
            toml::Value::try_from(self).map_err(|e| SalesqlError::ConfigInvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let mut current = &value;
        for part in key.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| SalesqlError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "unknown key".to_string(),
                })?;
        }

        Ok(match current {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Set a single value by dotted path and persist the file.
    ///
    /// The value string is interpreted as bool, integer, or string, whichever
    /// parses first. Unknown keys are rejected by re-deserializing the result.
    pub fn set_value_by_path(path: &Path, key: &str, raw: &str) -> Result<()> {
        let mut root = match fs::read_to_string(path) {
            Ok(contents) => contents
                .parse::<toml::Table>()
                .map_err(SalesqlError::Config)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
            Err(e) => return Err(e.into()),
        };

        let value = if let Ok(b) = raw.parse::<bool>() {
            toml::Value::Boolean(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            toml::Value::Integer(i)
        } else {
            toml::Value::String(raw.to_string())
        };

        let parts: Vec<&str> = key.split('.').collect();
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| SalesqlError::ConfigInvalidValue {
                key: key.to_string(),
                message: "empty key".to_string(),
            })?;

        let mut table = &mut root;
        for part in parents {
            table = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()))
                .as_table_mut()
                .ok_or_else(|| SalesqlError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: format!("'{part}' is not a table"),
                })?;
        }
        table.insert((*last).to_string(), value);

        // Reject keys/values the config schema doesn't accept
        let rendered = toml::to_string_pretty(&root)
            .map_err(|e| SalesqlError::Other(format!("Failed to render config: {e}")))?;
        toml::from_str::<Config>(&rendered)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, rendered)?;
        Ok(())
    }

    /// Persist a new default model to the config file.
    pub fn update_model(path: &Path, model: &str) -> Result<()> {
        Self::set_value_by_path(path, "stt.model", model)
    }

    /// Annotated config template for `salesql config dump`.
    pub fn dump_template() -> String {
        format!(
            r#"# salesql configuration
# Location: ~/.config/salesql/config.toml

[stt]
# Whisper model: tiny, base, small, medium, large (append .en for English-only)
model = "{model}"
# Transcription language: "auto" to detect, or a code like "en"
language = "{language}"
# Inference threads (commented out = auto-detect)
# threads = 4

[llm]
# Hosted text-generation endpoint the assembled prompt is POSTed to
endpoint = ""
# Environment variable holding the endpoint API key
api_key_env = "{api_key_env}"

[server]
# Bind address for the chat page
host = "{host}"
port = {port}
"#,
            model = defaults::DEFAULT_MODEL,
            language = defaults::DEFAULT_LANGUAGE,
            api_key_env = defaults::DEFAULT_API_KEY_ENV,
            host = defaults::DEFAULT_HOST,
            port = defaults::DEFAULT_PORT,
        )
    }
}
