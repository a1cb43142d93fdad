//! Merge rules: defaults applied before any file or environment source.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("cli.executable", "sdfcli")?
        .set_default("cli.show_output", true)?
        .set_default("deploy.use_quick_deploy", false)?
        .set_default("deploy.auto_reset_after_backup", false)?
        .set_default("deploy.add_matching_javascript", false)?
        .set_default("deploy.backup_dir", "deploy-backups")
}
