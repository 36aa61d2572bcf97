//! Layered configuration: defaults → optional `ucn.toml` → `UCN_`-prefixed
//! environment variables, assembled with `figment`.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{ConfigError, UcnError};

/// Parser scratch-buffer floor (§4.2), overridable by `UCN_BUFFER_SIZE`.
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024; // 1 MiB
pub const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024; // 64 MiB ceiling

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub languages: HashMap<String, LanguageConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default = "default_true")]
    pub follow_symlinks: bool,

    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub extra_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".ucn-cache")
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_true() -> bool {
    true
}
fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            indexing: IndexingConfig::default(),
            languages: default_languages(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            ignore_patterns: vec![
                "target/**".into(),
                "node_modules/**".into(),
                "dist/**".into(),
                "build/**".into(),
                ".git/**".into(),
                "vendor/**".into(),
                "__pycache__/**".into(),
            ],
            follow_symlinks: true,
            buffer_size: default_buffer_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    let mut map = HashMap::new();
    for lang in crate::types::Language::all() {
        map.insert(
            lang.name().to_string(),
            LanguageConfig {
                enabled: true,
                extra_extensions: Vec::new(),
            },
        );
    }
    map
}

impl Settings {
    /// Load defaults, then `ucn.toml` if present, then `UCN_`-prefixed env
    /// vars (e.g. `UCN_INDEXING__PARALLEL_THREADS=4`). `UCN_BUFFER_SIZE`
    /// is a documented shorthand for `indexing.buffer_size` (§6).
    pub fn load(project_root: &std::path::Path) -> std::result::Result<Self, UcnError> {
        let toml_path = project_root.join("ucn.toml");
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if toml_path.exists() {
            figment = figment.merge(Toml::file(&toml_path));
        }
        figment = figment.merge(Env::prefixed("UCN_").split("__"));

        let mut settings: Settings = figment
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if let Ok(raw) = std::env::var("UCN_BUFFER_SIZE") {
            if let Ok(size) = raw.parse::<usize>() {
                settings.indexing.buffer_size = size;
            }
        }

        Ok(settings)
    }

    pub fn language_enabled(&self, language: crate::types::Language) -> bool {
        self.languages
            .get(language.name())
            .map(|c| c.enabled)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_language() {
        let settings = Settings::default();
        for lang in crate::types::Language::all() {
            assert!(settings.language_enabled(*lang));
        }
    }

    #[test]
    fn buffer_size_defaults_to_one_mebibyte() {
        assert_eq!(IndexingConfig::default().buffer_size, DEFAULT_BUFFER_SIZE);
    }
}
