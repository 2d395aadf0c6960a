//! Configuration module for Cloudwire
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/cloudwire/cloudwire.toml)
//! - User configuration (~/.cloudwire.toml)
//! - Project configuration (./cloudwire.toml)
//! - Environment variables
//! - Command-line arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::app::TemplateFormat;
use crate::stacks::{StackSettings, DEFAULT_ROUTER_AMI, DEFAULT_ROUTER_REGION, DEFAULT_ROUTER_USER_DATA};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template synthesis settings
    pub synth: SynthConfig,

    /// Route server settings
    pub router: RouterConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Colors and output settings
    pub colors: ColorsConfig,
}

/// Template synthesis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Directory the cloud assembly is written to
    pub output_dir: PathBuf,

    /// Template serialization format
    pub format: TemplateFormat,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("cloudwire.out"),
            format: TemplateFormat::Json,
        }
    }
}

/// Route server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Region -> AMI id of the route server image
    pub images: BTreeMap<String, String>,

    /// Startup script replacing the embedded one
    pub user_data_path: Option<PathBuf>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            images: BTreeMap::from([(
                DEFAULT_ROUTER_REGION.to_string(),
                DEFAULT_ROUTER_AMI.to_string(),
            )]),
            user_data_path: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no `-v` flag is given
    pub level: String,

    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "text".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Colors configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colors
    pub enabled: bool,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// One configuration file as written: only the keys it sets are `Some`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    synth: SynthFile,
    router: RouterFile,
    logging: LoggingFile,
    colors: ColorsFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SynthFile {
    output_dir: Option<PathBuf>,
    format: Option<TemplateFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RouterFile {
    images: BTreeMap<String, String>,
    user_data_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingFile {
    level: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ColorsFile {
    enabled: Option<bool>,
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check, lowest precedence first
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        // Explicit path takes priority
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }
        if let Ok(env_config) = std::env::var("CLOUDWIRE_CONFIG") {
            return vec![PathBuf::from(env_config)];
        }

        let mut paths = vec![PathBuf::from("/etc/cloudwire/cloudwire.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".cloudwire.toml"));
        }
        paths.push(PathBuf::from("cloudwire.toml"));
        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: ConfigFile = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => toml::from_str(&content)
                .or_else(|_| serde_yaml::from_str(&content))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        Ok(self.merge(file_config))
    }

    /// Layer the keys a file sets over this config
    fn merge(&self, other: ConfigFile) -> Config {
        let mut images = self.router.images.clone();
        images.extend(other.router.images);

        Config {
            synth: SynthConfig {
                output_dir: other
                    .synth
                    .output_dir
                    .unwrap_or_else(|| self.synth.output_dir.clone()),
                format: other.synth.format.unwrap_or(self.synth.format),
            },
            router: RouterConfig {
                images,
                user_data_path: other
                    .router
                    .user_data_path
                    .or_else(|| self.router.user_data_path.clone()),
            },
            logging: LoggingConfig {
                level: other
                    .logging
                    .level
                    .unwrap_or_else(|| self.logging.level.clone()),
                format: other
                    .logging
                    .format
                    .unwrap_or_else(|| self.logging.format.clone()),
            },
            colors: ColorsConfig {
                enabled: other.colors.enabled.unwrap_or(self.colors.enabled),
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // CLOUDWIRE_OUTPUT_DIR
        if let Ok(dir) = std::env::var("CLOUDWIRE_OUTPUT_DIR") {
            self.synth.output_dir = PathBuf::from(dir);
        }

        // CLOUDWIRE_FORMAT
        if let Ok(format) = std::env::var("CLOUDWIRE_FORMAT") {
            if let Ok(format) = format.parse() {
                self.synth.format = format;
            }
        }

        // CLOUDWIRE_LOG_LEVEL
        if let Ok(level) = std::env::var("CLOUDWIRE_LOG_LEVEL") {
            self.logging.level = level;
        }

        // CLOUDWIRE_ROUTER_USER_DATA
        if let Ok(path) = std::env::var("CLOUDWIRE_ROUTER_USER_DATA") {
            self.router.user_data_path = Some(PathBuf::from(path));
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() {
            self.colors.enabled = false;
        }
    }

    /// Turn configuration into the inputs of the stack builders.
    pub fn stack_settings(&self) -> Result<StackSettings> {
        let router_user_data = match &self.router.user_data_path {
            Some(path) => std::fs::read_to_string(path).with_context(|| {
                format!("Failed to read router user data: {}", path.display())
            })?,
            None => DEFAULT_ROUTER_USER_DATA.to_string(),
        };

        Ok(StackSettings {
            router_images: self.router.images.clone(),
            router_user_data,
        })
    }

    /// Load from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Config::default().merge_from_file(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.synth.output_dir, PathBuf::from("cloudwire.out"));
        assert_eq!(config.synth.format, TemplateFormat::Json);
        assert_eq!(config.router.images[DEFAULT_ROUTER_REGION], DEFAULT_ROUTER_AMI);
        assert_eq!(config.logging.level, "warn");
        assert!(config.colors.enabled);
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_config_merge() {
        let base = Config::default();
        let other = ConfigFile {
            synth: SynthFile {
                format: Some(TemplateFormat::Yaml),
                ..SynthFile::default()
            },
            router: RouterFile {
                images: BTreeMap::from([("eu-west-1".to_string(), "ami-123".to_string())]),
                user_data_path: None,
            },
            ..ConfigFile::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.synth.format, TemplateFormat::Yaml);
        assert_eq!(merged.router.images.len(), 2);
        assert_eq!(merged.synth.output_dir, PathBuf::from("cloudwire.out"));
    }

    #[test]
    fn test_later_file_wins_even_with_default_values() {
        let dir = tempfile::tempdir().unwrap();
        let system = write(
            dir.path(),
            "system.toml",
            "[synth]\nformat = \"yaml\"\n\n[router.images]\n\"us-east-1\" = \"ami-custom\"\n",
        );
        let user = write(dir.path(), "user.toml", "[synth]\nformat = \"json\"\n");

        let config = Config::default()
            .merge_from_file(&system)
            .unwrap()
            .merge_from_file(&user)
            .unwrap();

        assert_eq!(config.router.images["us-east-1"], "ami-custom");
        assert_eq!(config.synth.format, TemplateFormat::Json);
    }

    #[test]
    fn test_unset_keys_keep_earlier_values() {
        let dir = tempfile::tempdir().unwrap();
        let first = write(
            dir.path(),
            "first.yml",
            "logging:\n  level: debug\ncolors:\n  enabled: false\n",
        );
        let second = write(dir.path(), "second.toml", "[synth]\noutput_dir = \"out\"\n");

        let config = Config::default()
            .merge_from_file(&first)
            .unwrap()
            .merge_from_file(&second)
            .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(!config.colors.enabled);
        assert_eq!(config.synth.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_default_stack_settings() {
        let settings = Config::default().stack_settings().unwrap();
        assert_eq!(settings, StackSettings::default());
    }
}
