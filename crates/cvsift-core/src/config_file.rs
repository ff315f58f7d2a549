use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Bucket;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub nlp: Option<NlpConfig>,
    pub output: Option<OutputConfig>,
    pub extraction: Option<ExtractionFileConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NlpConfig {
    /// Python interpreter that has spaCy installed.
    pub python: Option<String>,
    /// spaCy model package name, e.g. `en_core_web_sm`.
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub csv_path: Option<String>,
    pub sentinel: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionFileConfig {
    pub person_label: Option<String>,
    pub skill_pos: Option<Vec<String>>,
    pub email_pattern: Option<String>,
    pub phone_pattern: Option<String>,
    /// How `rules` combine with the built-in rules. Defaults to `replace`.
    pub rules_mode: Option<RulesMode>,
    pub rules: Option<Vec<RuleConfig>>,
}

/// One `(labels → bucket)` routing rule as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub labels: Vec<String>,
    pub bucket: Bucket,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesMode {
    #[default]
    Replace,
    Extend,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Platform config directory path: `<config_dir>/cvsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cvsift").join("config.toml"))
}

/// Load config by cascading CWD `.cvsift.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".cvsift.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match load_strict(path) {
        Ok(config) => Some(config),
        Err(ConfigError::Read { .. }) => None,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Load a config the user asked for explicitly; missing or invalid files are errors.
pub fn load_strict(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        nlp: Some(NlpConfig {
            python: overlay
                .nlp
                .as_ref()
                .and_then(|n| n.python.clone())
                .or_else(|| base.nlp.as_ref().and_then(|n| n.python.clone())),
            model: overlay
                .nlp
                .as_ref()
                .and_then(|n| n.model.clone())
                .or_else(|| base.nlp.as_ref().and_then(|n| n.model.clone())),
        }),
        output: Some(OutputConfig {
            csv_path: overlay
                .output
                .as_ref()
                .and_then(|o| o.csv_path.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.csv_path.clone())),
            sentinel: overlay
                .output
                .as_ref()
                .and_then(|o| o.sentinel.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.sentinel.clone())),
        }),
        extraction: Some(ExtractionFileConfig {
            person_label: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.person_label.clone())
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.person_label.clone())
                }),
            skill_pos: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.skill_pos.clone())
                .or_else(|| base.extraction.as_ref().and_then(|e| e.skill_pos.clone())),
            email_pattern: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.email_pattern.clone())
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.email_pattern.clone())
                }),
            phone_pattern: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.phone_pattern.clone())
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.phone_pattern.clone())
                }),
            // Rules and their mode travel together so an overlay never pairs
            // its mode with the base's rule list.
            rules_mode: match overlay.extraction.as_ref().and_then(|e| e.rules.as_ref()) {
                Some(_) => overlay.extraction.as_ref().and_then(|e| e.rules_mode),
                None => base.extraction.as_ref().and_then(|e| e.rules_mode),
            },
            rules: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.rules.clone())
                .or_else(|| base.extraction.as_ref().and_then(|e| e.rules.clone())),
        }),
    }
}
