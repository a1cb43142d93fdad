//! SDF CLI command kinds and their argument contracts.

use std::fmt;

pub mod catalog;

pub use catalog::{ObjectType, OBJECT_TYPES, UNSUPPORTED_OBJECT_TYPES};

/// Closed set of CLI subcommands the driver issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddDependencies,
    Authenticate,
    CreateProject,
    Deploy,
    ImportBundle,
    ImportFiles,
    ImportObjects,
    ListBundles,
    ListConfiguration,
    ListFiles,
    ListMissingDependencies,
    ListObjects,
    Preview,
    Update,
    UpdateCustomRecordWithInstances,
    Validate,
}

impl CommandKind {
    pub const ALL: &'static [CommandKind] = &[
        CommandKind::AddDependencies,
        CommandKind::Authenticate,
        CommandKind::CreateProject,
        CommandKind::Deploy,
        CommandKind::ImportBundle,
        CommandKind::ImportFiles,
        CommandKind::ImportObjects,
        CommandKind::ListBundles,
        CommandKind::ListConfiguration,
        CommandKind::ListFiles,
        CommandKind::ListMissingDependencies,
        CommandKind::ListObjects,
        CommandKind::Preview,
        CommandKind::Update,
        CommandKind::UpdateCustomRecordWithInstances,
        CommandKind::Validate,
    ];

    /// Subcommand token passed as the first argument.
    pub fn token(self) -> &'static str {
        match self {
            CommandKind::AddDependencies => "adddependencies",
            CommandKind::Authenticate => "authenticate",
            CommandKind::CreateProject => "createproject",
            CommandKind::Deploy => "deploy",
            CommandKind::ImportBundle => "importbundle",
            CommandKind::ImportFiles => "importfiles",
            CommandKind::ImportObjects => "importobjects",
            CommandKind::ListBundles => "listbundles",
            CommandKind::ListConfiguration => "listconfiguration",
            CommandKind::ListFiles => "listfiles",
            CommandKind::ListMissingDependencies => "listmissingdependencies",
            CommandKind::ListObjects => "listobjects",
            CommandKind::Preview => "preview",
            CommandKind::Update => "update",
            CommandKind::UpdateCustomRecordWithInstances => "updatecustomrecordwithinstances",
            CommandKind::Validate => "validate",
        }
    }

    /// Whether `-authid <active>` applies.
    pub fn takes_authid(self) -> bool {
        !matches!(
            self,
            CommandKind::AddDependencies
                | CommandKind::Authenticate
                | CommandKind::CreateProject
                | CommandKind::ListMissingDependencies
        )
    }

    /// Whether `-p <working directory>` applies.
    pub fn takes_project(self) -> bool {
        !matches!(
            self,
            CommandKind::Authenticate
                | CommandKind::CreateProject
                | CommandKind::ListBundles
                | CommandKind::ListConfiguration
                | CommandKind::ListFiles
        )
    }

    /// Arguments always appended for this kind.
    pub fn fixed_args(self) -> &'static [&'static str] {
        match self {
            CommandKind::AddDependencies => &["-all"],
            CommandKind::ListFiles => &["-folder", "/SuiteScripts"],
            CommandKind::Validate => &["-server"],
            _ => &[],
        }
    }

    /// Keep only the text after the first colon (list-objects prints `type:scriptid`).
    pub fn transform_line(self, line: &str) -> String {
        match self {
            CommandKind::ListObjects => match line.split_once(':') {
                Some((_, rest)) => rest.to_string(),
                None => line.to_string(),
            },
            _ => line.to_string(),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Build the argument vector: token, default parameters, then command arguments.
pub fn build_args(
    kind: CommandKind,
    authid: Option<&str>,
    project_dir: Option<&str>,
    extra: &[String],
) -> Vec<String> {
    let mut args = vec![kind.token().to_string()];
    if let Some(authid) = authid {
        args.push("-authid".to_string());
        args.push(authid.to_string());
    }
    if let Some(dir) = project_dir {
        args.push("-p".to_string());
        args.push(dir.to_string());
    }
    args.extend(kind.fixed_args().iter().map(|a| a.to_string()));
    args.extend(extra.iter().cloned());
    args
}
