//! Configuration System
//!
//! Layered configuration for the SDF driver: built-in defaults, the user's global
//! config file, the project's `.sdfkit.toml`, then `SDFKIT__*` environment overrides.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::project_file::PROJECT_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SdfConfig {
    /// External tool settings
    #[serde(default)]
    pub cli: CliConfig,

    /// Deployment and manifest behaviour
    #[serde(default)]
    pub deploy: DeployConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// External tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Executable name or path of the SDF CLI
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Echo raw tool output to the host while a command runs
    #[serde(default = "default_true")]
    pub show_output: bool,
}

fn default_executable() -> String {
    "sdfcli".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            show_output: true,
        }
    }
}

/// Deployment and manifest behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Deploy from a staged copy holding only the files named in deploy.xml
    #[serde(default)]
    pub use_quick_deploy: bool,

    /// Reset deploy.xml after a successful backup
    #[serde(default)]
    pub auto_reset_after_backup: bool,

    /// When a TypeScript source is added to deploy.xml, add its compiled .js too
    #[serde(default)]
    pub add_matching_javascript: bool,

    /// Backup folder for deploy.xml, relative to the project root
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("deploy-backups")
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            use_quick_deploy: false,
            auto_reset_after_backup: false,
            add_matching_javascript: false,
            backup_dir: default_backup_dir(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Cli(String),
    Deploy(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Cli(msg) => write!(f, "cli: {}", msg),
            ValidationError::Deploy(msg) => write!(f, "deploy: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SdfConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.cli.executable.trim().is_empty() {
            errors.push(ValidationError::Cli(
                "executable cannot be empty".to_string(),
            ));
        }
        if self.deploy.backup_dir.as_os_str().is_empty() {
            errors.push(ValidationError::Deploy(
                "backup_dir cannot be empty".to_string(),
            ));
        }
        if self.deploy.backup_dir.is_absolute() {
            errors.push(ValidationError::Deploy(
                "backup_dir must be relative to the project root".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
