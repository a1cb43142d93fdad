//! CLI parse: clap types for sdfkit. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sdfkit CLI - drive the SuiteCloud Development Framework CLI
#[derive(Parser)]
#[command(name = "sdfkit")]
#[command(about = "Environment selection, prompt handling and deploy.xml management for sdfcli")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root directory
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use this authid instead of selecting one
    #[arg(long, global = true)]
    pub authid: Option<String>,

    /// Output format for command results
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackupChoice {
    Backup,
    Restore,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add missing dependency references to the manifest
    AddDependencies,
    /// Authenticate a new environment in an interactive terminal
    Authenticate,
    /// Create an account customization project next to this one
    CreateProject,
    /// Deploy the project (from a staged copy when quick deploy is on)
    Deploy,
    /// Import a bundle by id
    ImportBundle,
    /// Pick files under /SuiteScripts and import them
    ImportFiles,
    /// Pick objects of one type and import them
    ImportObjects {
        /// Object type id (e.g. customrecordtype); prompts when omitted
        #[arg(long = "type")]
        object_type: Option<String>,
    },
    /// List bundles in the account
    ListBundles,
    /// List account configuration
    ListConfiguration,
    /// List files under /SuiteScripts
    ListFiles,
    /// List dependencies missing from the manifest
    ListMissingDependencies,
    /// List objects in the account
    ListObjects {
        /// Only list this object type
        #[arg(long = "type")]
        object_type: Option<String>,
    },
    /// Preview the deployment
    Preview,
    /// Update objects from local definitions
    Update,
    /// Update a custom record together with its instances
    UpdateCustomRecordWithInstances,
    /// Validate the project against the account
    Validate,
    /// Reload the environment list from sdfcli
    RefreshConfig,
    /// Choose the active environment
    SelectEnvironment,
    /// Replace local files and objects with the account's copies
    Sync,
    /// Delete and recreate Objects and FileCabinet/SuiteScripts
    RemoveFolders,
    /// Reset deploy.xml to an empty manifest
    CreateResetDeploy,
    /// Back up or restore deploy.xml
    BackupRestoreDeploy {
        /// Skip the backup/restore prompt
        #[arg(value_enum)]
        action: Option<BackupChoice>,
    },
    /// Add a project file to deploy.xml
    AddFileToDeploy {
        /// File path, relative to the current directory, or `~/` notation
        path: String,
    },
    /// Show known environments and the active one
    Status,
}
