// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Ghostwriter Configuration Types
//
// Defines the configuration schema for a Ghostwriter host process:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Feedback and profile storage location
// - Embedding and generation provider selection
// - Retrieval limits and port call timeouts

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_VERSION: &str = "ghostwriter/v1";
pub const CONFIG_KIND: &str = "GhostwriterConfig";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostwriterConfigManifest {
    /// API version (must be "ghostwriter/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GhostwriterConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: GhostwriterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GhostwriterConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub embedding: EmbeddingProviderConfig,

    #[serde(default)]
    pub generation: GenerationProviderConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Profiles directory; feedback lives under `<root>/feedback`
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,

    /// Sample file backing the built-in "default" profile
    #[serde(default = "default_profile_file")]
    pub default_profile_file: PathBuf,
}

impl StorageConfig {
    pub fn feedback_dir(&self) -> PathBuf {
        self.root.join("feedback")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingProviderConfig {
    /// "ollama" or "hashing" (offline, deterministic)
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Vector dimension for the hashing embedder
    #[serde(default = "default_hashing_dimension")]
    pub dimension: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationProviderConfig {
    /// "ollama", "openai" or "openai-compatible"
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl GenerationProviderConfig {
    /// Resolve API key from config (supports "env:VAR_NAME" syntax)
    pub fn resolve_api_key(&self) -> anyhow::Result<String> {
        match &self.api_key {
            Some(k) => match k.strip_prefix("env:") {
                Some(var_name) => std::env::var(var_name).map_err(|_| {
                    anyhow::anyhow!("Environment variable not set: {}", var_name)
                }),
                None => Ok(k.clone()),
            },
            None => Ok(String::new()), // For local providers without auth
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Patterns kept per kind when composing a prompt
    #[serde(default = "default_pattern_cap")]
    pub pattern_cap: usize,

    /// Records returned by a relevant-feedback lookup
    #[serde(default = "default_relevant_limit")]
    pub relevant_limit: usize,

    /// Records listed in a profile summary
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Samples used as style examples
    #[serde(default = "default_max_style_examples")]
    pub max_style_examples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_embedding_timeout")]
    pub embedding_ms: u64,

    #[serde(default = "default_generation_timeout")]
    pub generation_ms: u64,
}

impl TimeoutConfig {
    pub fn embedding(&self) -> Duration {
        Duration::from_millis(self.embedding_ms)
    }

    pub fn generation(&self) -> Duration {
        Duration::from_millis(self.generation_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "compact" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_storage_root() -> PathBuf {
    PathBuf::from("profiles")
}

fn default_profile_file() -> PathBuf {
    PathBuf::from("storytelling.txt")
}

fn default_provider_type() -> String {
    "ollama".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3:8b".to_string()
}

fn default_hashing_dimension() -> usize {
    384
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_pattern_cap() -> usize {
    2
}

fn default_relevant_limit() -> usize {
    5
}

fn default_recent_limit() -> usize {
    5
}

fn default_max_style_examples() -> usize {
    3
}

fn default_embedding_timeout() -> u64 {
    30_000
}

fn default_generation_timeout() -> u64 {
    120_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            default_profile_file: default_profile_file(),
        }
    }
}

impl Default for EmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            endpoint: default_ollama_endpoint(),
            model: default_model(),
            dimension: default_hashing_dimension(),
        }
    }
}

impl Default for GenerationProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            endpoint: default_ollama_endpoint(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            pattern_cap: default_pattern_cap(),
            relevant_limit: default_relevant_limit(),
            recent_limit: default_recent_limit(),
            max_style_examples: default_max_style_examples(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            embedding_ms: default_embedding_timeout(),
            generation_ms: default_generation_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for GhostwriterConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: CONFIG_KIND.to_string(),
            metadata: ManifestMetadata {
                name: "ghostwriter".to_string(),
                labels: None,
            },
            spec: GhostwriterConfig::default(),
        }
    }
}

impl GhostwriterConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. GHOSTWRITER_CONFIG_PATH environment variable
    /// 2. ./ghostwriter-config.yaml (working directory)
    /// 3. ~/.ghostwriter/config.yaml (user home)
    /// 4. /etc/ghostwriter/config.yaml (Unix only)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GHOSTWRITER_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./ghostwriter-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".ghostwriter").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/ghostwriter/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing or invalid.
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("GHOSTWRITER_STORAGE_ROOT") {
            tracing::info!("Environment override: GHOSTWRITER_STORAGE_ROOT={}", root);
            self.spec.storage.root = PathBuf::from(root);
        }

        if let Ok(endpoint) = std::env::var("GHOSTWRITER_OLLAMA_ENDPOINT") {
            tracing::info!("Environment override: GHOSTWRITER_OLLAMA_ENDPOINT={}", endpoint);
            if self.spec.embedding.provider_type == "ollama" {
                self.spec.embedding.endpoint = endpoint.clone();
            }
            if self.spec.generation.provider_type == "ollama" {
                self.spec.generation.endpoint = endpoint;
            }
        }

        if let Ok(model) = std::env::var("GHOSTWRITER_MODEL") {
            tracing::info!("Environment override: GHOSTWRITER_MODEL={}", model);
            self.spec.generation.model = model;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != CONFIG_KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, CONFIG_KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let spec = &self.spec;

        match spec.embedding.provider_type.as_str() {
            "ollama" => {
                if spec.embedding.endpoint.is_empty() || spec.embedding.model.is_empty() {
                    anyhow::bail!("Ollama embedding provider needs an endpoint and a model");
                }
            }
            "hashing" => {
                if spec.embedding.dimension == 0 {
                    anyhow::bail!("Hashing embedding dimension must be greater than zero");
                }
            }
            other => anyhow::bail!("Unsupported embedding provider type: {}", other),
        }

        match spec.generation.provider_type.as_str() {
            "ollama" | "openai" | "openai-compatible" => {
                if spec.generation.endpoint.is_empty() {
                    anyhow::bail!("Generation provider endpoint cannot be empty");
                }
                if spec.generation.model.is_empty() {
                    anyhow::bail!("Generation model cannot be empty");
                }
            }
            other => anyhow::bail!("Unsupported generation provider type: {}", other),
        }

        if spec.retrieval.pattern_cap == 0 {
            anyhow::bail!("retrieval.pattern_cap must be greater than zero");
        }
        if spec.retrieval.relevant_limit == 0 {
            anyhow::bail!("retrieval.relevant_limit must be greater than zero");
        }
        if spec.retrieval.max_style_examples == 0 {
            anyhow::bail!("retrieval.max_style_examples must be greater than zero");
        }

        if spec.timeouts.embedding_ms == 0 || spec.timeouts.generation_ms == 0 {
            anyhow::bail!("Port call timeouts must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = GhostwriterConfigManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, CONFIG_KIND);
        assert_eq!(manifest.spec.retrieval.pattern_cap, 2);
        assert_eq!(manifest.spec.generation.model, "llama3:8b");
        assert_eq!(manifest.spec.storage.feedback_dir(), PathBuf::from("profiles/feedback"));
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
apiVersion: ghostwriter/v1
kind: GhostwriterConfig
metadata:
  name: laptop
spec:
  storage:
    root: /tmp/gw
  embedding:
    type: hashing
    dimension: 64
  timeouts:
    generation_ms: 5000
"#;
        let manifest = GhostwriterConfigManifest::from_yaml_str(yaml).unwrap();

        assert_eq!(manifest.metadata.name, "laptop");
        assert_eq!(manifest.spec.storage.root, PathBuf::from("/tmp/gw"));
        assert_eq!(manifest.spec.storage.default_profile_file, PathBuf::from("storytelling.txt"));
        assert_eq!(manifest.spec.embedding.provider_type, "hashing");
        assert_eq!(manifest.spec.embedding.dimension, 64);
        assert_eq!(manifest.spec.generation.provider_type, "ollama");
        assert_eq!(manifest.spec.timeouts.generation(), Duration::from_secs(5));
        assert_eq!(manifest.spec.timeouts.embedding_ms, 30_000);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut manifest = GhostwriterConfigManifest::default();
        manifest.spec.generation.provider_type = "openai".to_string();
        manifest.spec.generation.api_key = Some("env:OPENAI_API_KEY".to_string());

        let yaml = serde_yaml::to_string(&manifest).unwrap();
        let parsed = GhostwriterConfigManifest::from_yaml_str(&yaml).unwrap();

        assert_eq!(parsed.spec.generation.provider_type, "openai");
        assert_eq!(parsed.spec.generation.api_key.as_deref(), Some("env:OPENAI_API_KEY"));
    }

    #[test]
    fn test_validation() {
        let mut manifest = GhostwriterConfigManifest::default();

        manifest.api_version = "wrong/v1".to_string();
        assert!(manifest.validate().is_err());
        manifest.api_version = API_VERSION.to_string();

        manifest.kind = "NodeConfig".to_string();
        assert!(manifest.validate().is_err());
        manifest.kind = CONFIG_KIND.to_string();

        manifest.spec.embedding.provider_type = "faiss".to_string();
        assert!(manifest.validate().is_err());
        manifest.spec.embedding.provider_type = "ollama".to_string();

        manifest.spec.retrieval.pattern_cap = 0;
        assert!(manifest.validate().is_err());
        manifest.spec.retrieval.pattern_cap = 2;

        manifest.spec.timeouts.embedding_ms = 0;
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_resolve_api_key() {
        let mut generation = GenerationProviderConfig::default();
        assert_eq!(generation.resolve_api_key().unwrap(), "");

        generation.api_key = Some("sk-literal".to_string());
        assert_eq!(generation.resolve_api_key().unwrap(), "sk-literal");

        generation.api_key = Some("env:GHOSTWRITER_TEST_SURELY_UNSET_KEY".to_string());
        assert!(generation.resolve_api_key().is_err());
    }
}
