//! CLI route: single route table and run context. Dispatches to the orchestrator and presentation.

use crate::cli::help::{command_name, direct_kind, is_listing};
use crate::cli::parse::{BackupChoice, Cli, Commands, OutputFormat};
use crate::cli::presentation::{
    format_environments_json, format_environments_text, format_lines_json, format_lines_text,
    EnvironmentRow,
};
use crate::config::{ConfigLoader, SdfConfig};
use crate::error::SdfError;
use crate::orchestrator::{BackupAction, CommandFlags, Orchestrator};
use crate::ui::Ui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runtime context for CLI execution: project root, loaded config and the orchestrator.
/// Built from the project path and optional config path using ConfigLoader only.
pub struct RunContext {
    orchestrator: Orchestrator,
}

impl RunContext {
    /// Create run context from project root and optional config path.
    pub fn new(
        project_root: PathBuf,
        config_path: Option<PathBuf>,
        ui: Arc<dyn Ui>,
    ) -> Result<Self, SdfError> {
        let project_root = dunce::canonicalize(&project_root).map_err(|e| {
            SdfError::Config(format!(
                "Project directory {} is not accessible: {}",
                project_root.display(),
                e
            ))
        })?;
        let config = load_config(&project_root, config_path.as_deref())?;
        Ok(Self {
            orchestrator: Orchestrator::new(project_root, config, ui),
        })
    }

    pub fn from_parts(project_root: PathBuf, config: SdfConfig, ui: Arc<dyn Ui>) -> Self {
        Self {
            orchestrator: Orchestrator::new(project_root, config, ui),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Run the parsed command and render its output.
    pub async fn execute(&self, cli: &Cli) -> Result<String, SdfError> {
        if let Some(authid) = &cli.authid {
            self.orchestrator.preselect(authid);
        }
        let name = command_name(&cli.command);
        let started = Instant::now();
        info!(command = name, "Running command");

        let result = self.dispatch(&cli.command, cli.format).await;

        debug!(
            command = name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    async fn dispatch(&self, command: &Commands, format: OutputFormat) -> Result<String, SdfError> {
        let orchestrator = &self.orchestrator;
        let flags = result_flags(command, format);

        if let Some(kind) = direct_kind(command) {
            let lines = orchestrator.run_simple(kind, flags).await?;
            return Ok(render_lines(&lines, format));
        }

        let lines = match command {
            Commands::Authenticate => {
                orchestrator.authenticate().await?;
                Vec::new()
            }
            Commands::CreateProject => orchestrator.create_project().await?,
            Commands::Deploy => orchestrator.deploy(flags).await?,
            Commands::ImportBundle => orchestrator.import_bundle().await?,
            Commands::ImportFiles => orchestrator.import_files().await?,
            Commands::ImportObjects { object_type } => {
                orchestrator.import_objects(object_type.as_deref()).await?
            }
            Commands::ListObjects { object_type } => {
                orchestrator
                    .list_objects(object_type.as_deref(), flags)
                    .await?
            }
            Commands::Update => orchestrator.update().await?,
            Commands::UpdateCustomRecordWithInstances => orchestrator.update_custom_record().await?,
            Commands::RefreshConfig => {
                orchestrator.refresh_config().await?;
                Vec::new()
            }
            Commands::SelectEnvironment => {
                let env = orchestrator.select_environment().await?;
                return Ok(match format {
                    OutputFormat::Text => format!("Active environment: {}", env.authid),
                    OutputFormat::Json => serde_json::json!({ "active": env.authid }).to_string(),
                });
            }
            Commands::Sync => {
                orchestrator.sync().await?;
                Vec::new()
            }
            Commands::RemoveFolders => {
                orchestrator.remove_folders().await?;
                Vec::new()
            }
            Commands::CreateResetDeploy => {
                orchestrator.create_reset_deploy()?;
                Vec::new()
            }
            Commands::BackupRestoreDeploy { action } => {
                let action = action.map(|choice| match choice {
                    BackupChoice::Backup => BackupAction::Backup,
                    BackupChoice::Restore => BackupAction::Restore,
                });
                orchestrator.backup_restore_deploy(action).await?;
                Vec::new()
            }
            Commands::AddFileToDeploy { path } => {
                let target = cli_target(path, orchestrator.project_root());
                orchestrator.add_file_to_deploy(&target)?;
                Vec::new()
            }
            Commands::Status => {
                let rows: Vec<EnvironmentRow> = orchestrator
                    .environments()
                    .await?
                    .into_iter()
                    .map(|(authid, active)| EnvironmentRow { authid, active })
                    .collect();
                return Ok(match format {
                    OutputFormat::Text => format_environments_text(&rows),
                    OutputFormat::Json => format_environments_json(&rows),
                });
            }
            Commands::AddDependencies
            | Commands::ListBundles
            | Commands::ListConfiguration
            | Commands::ListFiles
            | Commands::ListMissingDependencies
            | Commands::Preview
            | Commands::Validate => Vec::new(),
        };
        Ok(render_lines(&lines, format))
    }
}

fn load_config(project_root: &Path, config_path: Option<&Path>) -> Result<SdfConfig, SdfError> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load(project_root)?,
    };
    config.validate().map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        SdfError::Config(messages.join("; "))
    })?;
    Ok(config)
}

/// Listing commands and JSON output return results instead of streaming raw output.
fn result_flags(command: &Commands, format: OutputFormat) -> CommandFlags {
    if format == OutputFormat::Json || is_listing(command) {
        CommandFlags {
            show_output: false,
            collect_data: true,
            ..CommandFlags::default()
        }
    } else {
        CommandFlags::default()
    }
}

fn render_lines(lines: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_lines_text(lines),
        OutputFormat::Json => format_lines_json(lines),
    }
}

/// Paths typed on the command line are relative to the current directory;
/// `~/` notation and absolute paths pass through.
fn cli_target(path: &str, project_root: &Path) -> String {
    if path.starts_with("~/") || Path::new(path).is_absolute() {
        return path.to_string();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path).display().to_string(),
        Err(_) => project_root.join(path).display().to_string(),
    }
}
