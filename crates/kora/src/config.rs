//! Application configuration
//!
//! Layers, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. `kora.toml` in the working directory, or the file given with `--config`,
//! 3. `KORA_*` environment variables, nested with `__`
//!    (`KORA_AGENT__RECALL_K=5`, `KORA_LLM__MODEL=...`),
//! 4. the service variables `GROQ_API_KEY`, `HF_TOKEN`, `GMAIL_CREDENTIALS`,
//!    `TAVILY_API_KEY`, `TRANSLATE_API_URL` and `TRANSLATE_API_KEY`,
//! 5. command line flags.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use kora_agent::AgentConfig;
use kora_llm::LlmConfig;
use kora_memory::MemoryConfig;
use kora_tools::ToolsConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "kora.toml";

/// Prefix of the layered environment overrides
pub const ENV_PREFIX: &str = "KORA";

/// Everything needed to assemble the assistant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Language model
    pub llm: LlmConfig,

    /// Exchange memory and embeddings
    pub memory: MemoryConfig,

    /// Orchestrator
    pub agent: AgentConfig,

    /// Tool agents
    pub tools: ToolsConfig,
}

impl AppConfig {
    /// Load from file and environment.
    ///
    /// An explicit `path` must exist; the default `kora.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let mut config: AppConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.apply_service_env(|key| std::env::var(key).ok());
        debug!(model = %config.llm.model, "Configuration loaded");
        Ok(config)
    }

    /// Fill credentials and endpoints from the well-known service variables.
    ///
    /// Credentials only fill gaps left by the config file; `TRANSLATE_API_URL`
    /// always wins over the default endpoint.
    pub fn apply_service_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.is_none() {
            self.llm.api_key = var("GROQ_API_KEY");
        }
        if self.memory.embedding.token.is_none() {
            self.memory.embedding.token = var("HF_TOKEN");
        }
        if self.tools.gmail.credentials.is_none() {
            self.tools.gmail.credentials = var("GMAIL_CREDENTIALS").map(PathBuf::from);
        }
        if self.tools.search.api_key.is_none() {
            self.tools.search.api_key = var("TAVILY_API_KEY");
        }
        if self.tools.translate.api_key.is_none() {
            self.tools.translate.api_key = var("TRANSLATE_API_KEY");
        }
        if let Some(url) = var("TRANSLATE_API_URL") {
            self.tools.translate.api_url = url;
        }
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, index_dir: Option<PathBuf>, model: Option<String>) -> Self {
        if let Some(dir) = index_dir {
            self.memory.index_dir = Some(dir);
        }
        if let Some(model) = model {
            self.llm.model = model;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.llm.model, "llama3-70b-8192");
        assert_eq!(config.agent.recall_k, 3);
        assert_eq!(config.memory.index_dir, Some(PathBuf::from("faiss_index")));
        assert!(config.tools.math);
    }

    #[test]
    fn service_variables_fill_missing_credentials() {
        let vars = env(&[
            ("GROQ_API_KEY", "gsk-env"),
            ("HF_TOKEN", "hf-env"),
            ("GMAIL_CREDENTIALS", "/secrets/token.json"),
            ("TAVILY_API_KEY", "tvly-env"),
            ("TRANSLATE_API_URL", "http://localhost:5000"),
        ]);
        let mut config = AppConfig::default();
        config.apply_service_env(|k| vars.get(k).cloned());

        assert_eq!(config.llm.api_key.as_deref(), Some("gsk-env"));
        assert_eq!(config.memory.embedding.token.as_deref(), Some("hf-env"));
        assert_eq!(
            config.tools.gmail.credentials,
            Some(PathBuf::from("/secrets/token.json"))
        );
        assert_eq!(config.tools.search.api_key.as_deref(), Some("tvly-env"));
        assert_eq!(config.tools.translate.api_url, "http://localhost:5000");
        assert_eq!(config.tools.translate.api_key, None);
    }

    #[test]
    fn file_credentials_take_precedence_and_blanks_are_ignored() {
        let vars = env(&[("GROQ_API_KEY", "gsk-env"), ("HF_TOKEN", "  ")]);
        let mut config = AppConfig::default();
        config.llm.api_key = Some("gsk-file".into());
        config.apply_service_env(|k| vars.get(k).cloned());

        assert_eq!(config.llm.api_key.as_deref(), Some("gsk-file"));
        assert_eq!(config.memory.embedding.token, None);
    }

    #[test]
    fn load_reads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[llm]
model = "llama-3.1-8b-instant"
temperature = 0.2

[agent]
recall_k = 5

[memory]
index_dir = "/tmp/kora-index"

[tools.search]
enabled = false
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.temperature, Some(0.2));
        assert_eq!(config.agent.recall_k, 5);
        assert_eq!(config.agent.max_iterations, 5);
        assert_eq!(config.memory.index_dir, Some(PathBuf::from("/tmp/kora-index")));
        assert!(!config.tools.search.enabled);
        assert!(config.tools.weather.enabled);
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn command_line_overrides() {
        let config = AppConfig::default()
            .with_overrides(Some(PathBuf::from("idx")), Some("mixtral-8x7b-32768".into()));
        assert_eq!(config.memory.index_dir, Some(PathBuf::from("idx")));
        assert_eq!(config.llm.model, "mixtral-8x7b-32768");

        let untouched = AppConfig::default().with_overrides(None, None);
        assert_eq!(untouched, AppConfig::default());
    }
}
