//! `~/.unipro/config.toml`: which backend CLI to run and where the theme and log live.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::agent::{BackendConfig, BackendKind, OutputMode};
use crate::artifact_io;
use crate::logging::LogLevelArg;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub backend: BackendSection,
    pub ui: UiSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendSection {
    pub kind: Option<BackendKind>,
    pub program: Option<String>,
    pub model: Option<String>,
    pub reasoning_effort: Option<String>,
    pub json_output: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiSection {
    pub theme: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<LogLevelArg>,
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `explicit`, or the default config file when none is given. Only the default file
    /// may be missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match artifact_io::default_config_file_path() {
                Ok(path) => (path, false),
                Err(_) => return Ok(Self::default()),
            },
        };
        let text = match artifact_io::read_text_file(&path) {
            Ok(text) => text,
            Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Backend command for this run; CLI flags win over the file.
    pub fn backend_config(
        &self,
        kind_override: Option<BackendKind>,
        model_override: Option<&str>,
    ) -> BackendConfig {
        let section = &self.backend;
        let kind = kind_override
            .or(section.kind)
            .or_else(|| {
                section
                    .program
                    .as_deref()
                    .map(BackendKind::from_program)
            })
            .unwrap_or(BackendKind::Codex);
        let mut config = BackendConfig::default_for_backend(kind);
        if let Some(program) = section.program.as_deref().filter(|p| !p.trim().is_empty())
            && (kind_override.is_none() || BackendKind::from_program(program) == kind)
        {
            config.program = program.to_string();
        }
        config.model = model_override
            .map(ToString::to_string)
            .or_else(|| section.model.clone());
        config.model_reasoning_effort = section.reasoning_effort.clone();
        match (section.json_output, kind) {
            (Some(false), _) => {
                config.output_mode = OutputMode::PlainText;
                config.args_prefix.retain(|arg| arg != "--json");
            }
            (Some(true), BackendKind::Gemini) => {
                log::warn!("json_output is not supported for gemini; using plain text");
            }
            _ => {}
        }
        config
    }

    pub fn theme_path(&self) -> Option<PathBuf> {
        self.ui
            .theme
            .clone()
            .or_else(|| artifact_io::default_theme_file_path().ok())
    }

    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(artifact_io::default_log_file_path)
    }
}
