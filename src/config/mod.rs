//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `RAGCITE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{DEFAULT_TOP_K, DEFAULT_TOP_N};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RAGCITE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Root directory of the persisted vector store. Default: `./vectorstore`.
    pub vectorstore_path: PathBuf,

    /// Sentence-encoder model directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    /// Unset runs the encoder in stub mode.
    pub embedding_model_path: Option<PathBuf>,

    /// Cross-encoder model directory. Unset runs the reranker in stub mode.
    pub reranker_path: Option<PathBuf>,

    /// `tokenizer.json` (or its directory) used for chunk windowing. Unset uses the
    /// char-level stub tokenizer.
    pub tokenizer_path: Option<PathBuf>,

    /// Completion model name passed to the provider.
    pub llm_model: String,

    /// Sampling temperature for completions. Default: `0.2`.
    pub llm_temperature: f64,

    /// System message sent with every completion.
    pub system_prompt: String,

    /// Serve deterministic mock completions instead of calling a provider.
    pub mock_provider: bool,

    /// Candidates returned by vector search. Default: `5`.
    pub top_k: usize,

    /// Candidates kept after reranking. Default: `3`.
    pub top_n: usize,

    /// Max entries in the answer cache. `None` (the default) means unbounded.
    pub cache_capacity: Option<u64>,
}

/// Default completion model used when `RAGCITE_LLM_MODEL` is not set.
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Default system message used when `RAGCITE_SYSTEM_PROMPT` is not set.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AWS assistant";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            vectorstore_path: PathBuf::from("./vectorstore"),
            embedding_model_path: None,
            reranker_path: None,
            tokenizer_path: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_temperature: 0.2,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            mock_provider: false,
            top_k: DEFAULT_TOP_K,
            top_n: DEFAULT_TOP_N,
            cache_capacity: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RAGCITE_PORT";
    const ENV_BIND_ADDR: &'static str = "RAGCITE_BIND_ADDR";
    const ENV_VECTORSTORE_PATH: &'static str = "RAGCITE_VECTORSTORE_PATH";
    const ENV_EMBEDDING_MODEL_PATH: &'static str = "RAGCITE_EMBEDDING_MODEL_PATH";
    const ENV_RERANKER_PATH: &'static str = "RAGCITE_RERANKER_PATH";
    const ENV_TOKENIZER_PATH: &'static str = "RAGCITE_TOKENIZER_PATH";
    const ENV_LLM_MODEL: &'static str = "RAGCITE_LLM_MODEL";
    const ENV_LLM_TEMPERATURE: &'static str = "RAGCITE_LLM_TEMPERATURE";
    const ENV_SYSTEM_PROMPT: &'static str = "RAGCITE_SYSTEM_PROMPT";
    const ENV_MOCK_PROVIDER: &'static str = "RAGCITE_MOCK_PROVIDER";
    const ENV_TOP_K: &'static str = "RAGCITE_TOP_K";
    const ENV_TOP_N: &'static str = "RAGCITE_TOP_N";
    const ENV_CACHE_CAPACITY: &'static str = "RAGCITE_CACHE_CAPACITY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let vectorstore_path =
            Self::parse_path_from_env(Self::ENV_VECTORSTORE_PATH, defaults.vectorstore_path);
        let embedding_model_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDING_MODEL_PATH);
        let reranker_path = Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH);
        let tokenizer_path = Self::parse_optional_path_from_env(Self::ENV_TOKENIZER_PATH);
        let llm_model = Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model);
        let llm_temperature = Self::parse_temperature_from_env(defaults.llm_temperature)?;
        let system_prompt =
            Self::parse_string_from_env(Self::ENV_SYSTEM_PROMPT, defaults.system_prompt);
        let mock_provider = env::var_os(Self::ENV_MOCK_PROVIDER).is_some_and(|v| !v.is_empty());
        let top_k = Self::parse_count_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let top_n = Self::parse_count_from_env(Self::ENV_TOP_N, defaults.top_n)?;
        let cache_capacity = Self::parse_optional_count_from_env(Self::ENV_CACHE_CAPACITY)?
            .map(|n| n as u64);

        Ok(Self {
            port,
            bind_addr,
            vectorstore_path,
            embedding_model_path,
            reranker_path,
            tokenizer_path,
            llm_model,
            llm_temperature,
            system_prompt,
            mock_provider,
            top_k,
            top_n,
            cache_capacity,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vectorstore_path.exists() && !self.vectorstore_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.vectorstore_path.clone(),
            });
        }

        for path in [&self.embedding_model_path, &self.reranker_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.tokenizer_path
            && !path.exists()
        {
            return Err(ConfigError::PathNotFound { path: path.clone() });
        }

        if self.top_n > self.top_k {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOP_N,
                reason: format!("top_n ({}) exceeds top_k ({})", self.top_n, self.top_k),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_temperature_from_env(default: f64) -> Result<f64, ConfigError> {
        match env::var(Self::ENV_LLM_TEMPERATURE) {
            Ok(value) => {
                let temperature: f64 =
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue {
                            name: Self::ENV_LLM_TEMPERATURE,
                            reason: format!("'{}' is not a number", value),
                        })?;
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(ConfigError::InvalidValue {
                        name: Self::ENV_LLM_TEMPERATURE,
                        reason: format!("{} is outside 0.0..=2.0", temperature),
                    });
                }
                Ok(temperature)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_count_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        Ok(Self::parse_optional_count_from_env(var_name)?.unwrap_or(default))
    }

    /// `None` when unset; a set value must be a positive integer.
    fn parse_optional_count_from_env(var_name: &'static str) -> Result<Option<usize>, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(0) | Err(_) => Err(ConfigError::InvalidValue {
                    name: var_name,
                    reason: format!("'{}' is not a positive integer", value),
                }),
                Ok(n) => Ok(Some(n)),
            },
            Err(_) => Ok(None),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(default)
    }
}
