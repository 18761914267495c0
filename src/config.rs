use crate::error::{Error, Result};
use crate::output::{Formatters, SinkConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gm-codegen.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub format: FormatConfig,
}

/// Template and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Glob patterns over artifact paths that are not written
    pub exclude: Vec<String>,
}

/// Post-write formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub enabled: bool,
    pub clang_format: String,
    pub black: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("generated"),
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        let formatters = Formatters::default();
        Self {
            enabled: false,
            clang_format: formatters.clang_format,
            black: formatters.black,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults when the file does not exist.
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        templates: Option<PathBuf>,
        output: Option<PathBuf>,
        exclude: Vec<String>,
        format: bool,
    ) {
        if let Some(dir) = templates {
            self.paths.template_dir = dir;
        }

        if let Some(out) = output {
            self.paths.output_dir = out;
        }

        if !exclude.is_empty() {
            self.output.exclude.extend(exclude);
        }

        if format {
            self.format.enabled = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.paths.template_dir.as_os_str().is_empty() {
            return Err(Error::config_validation("template_dir must not be empty"));
        }

        if self.paths.output_dir.as_os_str().is_empty() {
            return Err(Error::config_validation("output_dir must not be empty"));
        }

        if self.format.enabled {
            if self.format.clang_format.trim().is_empty() {
                return Err(Error::config_validation(
                    "clang_format command must not be empty when formatting is enabled",
                ));
            }
            if self.format.black.trim().is_empty() {
                return Err(Error::config_validation(
                    "black command must not be empty when formatting is enabled",
                ));
            }
        }

        for pattern in &self.output.exclude {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }

    /// Sink settings derived from this config
    pub fn sink_config(&self, dry_run: bool, progress: bool) -> SinkConfig {
        SinkConfig {
            output_dir: self.paths.output_dir.clone(),
            exclude: self.output.exclude.clone(),
            formatters: self.format.enabled.then(|| Formatters {
                clang_format: self.format.clang_format.clone(),
                black: self.format.black.clone(),
            }),
            dry_run,
            progress,
        }
    }
}
