//! Environment registry: authenticated identities reported by the SDF CLI.
//!
//! The registry is built from the account-listing output (`manageauth -list`):
//! a header line followed by pipe-delimited rows whose first field is the authid.

use crate::error::{SdfError, SessionError};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Subcommand and flag that print the account listing.
pub const LIST_AUTH_ARGS: &[&str] = &["manageauth", "-list"];

/// A named authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Environment {
    pub authid: String,
}

impl Environment {
    pub fn new(authid: impl Into<String>) -> Self {
        Self {
            authid: authid.into(),
        }
    }
}

/// Result of parsing the account listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedListing {
    Environments(Registry),
    /// Header only: nothing is authenticated yet.
    NoAuthIds,
}

/// Set of environments keyed by authid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    environments: BTreeSet<Environment>,
}

impl Registry {
    pub fn from_authids<I, S>(authids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            environments: authids.into_iter().map(Environment::new).collect(),
        }
    }

    /// Parse the account listing. The first line is a header and is discarded;
    /// rows with an empty first field are not data rows.
    pub fn parse(output: &str) -> ParsedListing {
        let environments: BTreeSet<Environment> = output
            .lines()
            .skip(1)
            .map(|line| line.split('|').next().unwrap_or("").trim())
            .filter(|authid| !authid.is_empty())
            .map(Environment::new)
            .collect();
        if environments.is_empty() {
            return ParsedListing::NoAuthIds;
        }
        ParsedListing::Environments(Registry { environments })
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    pub fn contains(&self, authid: &str) -> bool {
        self.environments.iter().any(|e| e.authid == authid)
    }

    pub fn get(&self, authid: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.authid == authid)
    }

    pub fn authids(&self) -> Vec<String> {
        self.environments.iter().map(|e| e.authid.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        self.environments.iter()
    }

    /// The only environment, when exactly one is listed.
    pub fn single(&self) -> Option<&Environment> {
        if self.environments.len() == 1 {
            self.environments.iter().next()
        } else {
            None
        }
    }
}

/// Run the account listing synchronously and parse it.
///
/// Stdout and stderr are combined. A missing executable maps to `ToolUnavailable`;
/// an empty listing maps to `NoEnvironments`.
pub async fn fetch_registry(program: &str, cwd: &Path) -> Result<Registry, SdfError> {
    debug!(program, cwd = %cwd.display(), "Listing authids");
    let output = Command::new(program)
        .args(LIST_AUTH_ARGS)
        .current_dir(cwd)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map_err(|e| match SessionError::from_spawn(program, e) {
            SessionError::ExecutableNotFound { .. } => SdfError::ToolUnavailable,
            other => SdfError::Session(other),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        debug!(output = %combined, "Account listing failed");
        return Err(SdfError::Session(SessionError::ExitStatus {
            code: output.status.code(),
        }));
    }

    match Registry::parse(&combined) {
        ParsedListing::Environments(registry) => {
            info!(count = registry.len(), "Loaded authids");
            Ok(registry)
        }
        ParsedListing::NoAuthIds => Err(SdfError::NoEnvironments),
    }
}
