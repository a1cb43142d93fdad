//! Config loader: applies merge defaults and sources in precedence order.

use super::merge::merge_policy;
use super::sources::{global_file, project_file};
use super::SdfConfig;
use crate::error::SdfError;
use config::{Environment, File};
use std::path::Path;

/// Loads `SdfConfig` from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a project.
    /// Precedence (low to high): defaults, global file, project file, environment.
    pub fn load(project_root: &Path) -> Result<SdfConfig, SdfError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = project_file::add_to_builder(builder, project_root)?;
        let config = builder
            .add_source(environment_source())
            .build()?
            .try_deserialize::<SdfConfig>()?;
        Ok(config)
    }

    /// Load configuration from one explicit file layered over the defaults.
    pub fn load_from_file(path: &Path) -> Result<SdfConfig, SdfError> {
        if !path.is_file() {
            return Err(SdfError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(environment_source())
            .build()?
            .try_deserialize::<SdfConfig>()?;
        Ok(config)
    }
}

/// `SDFKIT__DEPLOY__USE_QUICK_DEPLOY=true` style overrides.
fn environment_source() -> Environment {
    Environment::with_prefix("SDFKIT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
