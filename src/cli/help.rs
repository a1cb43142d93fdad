//! CLI command-name contract for logging and routing.

use crate::cli::parse::Commands;
use crate::command::CommandKind;

/// Command name string used in log records (e.g. "deploy", "add-file-to-deploy").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::AddDependencies => "add-dependencies",
        Commands::Authenticate => "authenticate",
        Commands::CreateProject => "create-project",
        Commands::Deploy => "deploy",
        Commands::ImportBundle => "import-bundle",
        Commands::ImportFiles => "import-files",
        Commands::ImportObjects { .. } => "import-objects",
        Commands::ListBundles => "list-bundles",
        Commands::ListConfiguration => "list-configuration",
        Commands::ListFiles => "list-files",
        Commands::ListMissingDependencies => "list-missing-dependencies",
        Commands::ListObjects { .. } => "list-objects",
        Commands::Preview => "preview",
        Commands::Update => "update",
        Commands::UpdateCustomRecordWithInstances => "update-custom-record-with-instances",
        Commands::Validate => "validate",
        Commands::RefreshConfig => "refresh-config",
        Commands::SelectEnvironment => "select-environment",
        Commands::Sync => "sync",
        Commands::RemoveFolders => "remove-folders",
        Commands::CreateResetDeploy => "create-reset-deploy",
        Commands::BackupRestoreDeploy { .. } => "backup-restore-deploy",
        Commands::AddFileToDeploy { .. } => "add-file-to-deploy",
        Commands::Status => "status",
    }
}

/// The CLI kind a command runs directly, when it maps onto exactly one.
pub fn direct_kind(command: &Commands) -> Option<CommandKind> {
    match command {
        Commands::AddDependencies => Some(CommandKind::AddDependencies),
        Commands::ListBundles => Some(CommandKind::ListBundles),
        Commands::ListConfiguration => Some(CommandKind::ListConfiguration),
        Commands::ListFiles => Some(CommandKind::ListFiles),
        Commands::ListMissingDependencies => Some(CommandKind::ListMissingDependencies),
        Commands::Preview => Some(CommandKind::Preview),
        Commands::Validate => Some(CommandKind::Validate),
        _ => None,
    }
}

/// Listing commands print their results rather than streaming raw output.
pub fn is_listing(command: &Commands) -> bool {
    matches!(
        command,
        Commands::ListBundles
            | Commands::ListConfiguration
            | Commands::ListFiles
            | Commands::ListMissingDependencies
            | Commands::ListObjects { .. }
    )
}
