//! Staging for quick deploys.
//!
//! Resolves manifest patterns against the project tree and copies the matching
//! files into a transient directory, so the CLI only uploads what deploy.xml names.
//! In manifest notation a single `*` path component matches at any depth.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::SdfError;

/// Directories never searched for deployable files.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules"];

/// Turn a manifest pattern into a root-relative glob.
///
/// `~/FileCabinet/SuiteScripts/*` becomes `/FileCabinet/SuiteScripts/**`.
pub fn to_glob_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim();
    let without_root = trimmed.strip_prefix('~').unwrap_or(trimmed);
    let normalized = without_root.replace('\\', "/");
    let rewritten: Vec<&str> = normalized
        .split('/')
        .map(|component| if component == "*" { "**" } else { component })
        .collect();
    let joined = rewritten.join("/");
    if joined.starts_with('/') {
        joined
    } else {
        format!("/{}", joined)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, SdfError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob_pattern = to_glob_pattern(pattern);
        let glob = Glob::new(&glob_pattern).map_err(|e| {
            SdfError::Staging(format!("Invalid manifest pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| SdfError::Staging(format!("Failed to compile manifest patterns: {}", e)))
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Root-relative path with forward slashes and a leading `/`.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(format!("/{}", parts.join("/")))
}

/// Resolve patterns to the set of matching regular files under `project_root`.
pub fn resolve_patterns(
    patterns: &[String],
    project_root: &Path,
) -> Result<BTreeSet<String>, SdfError> {
    let set = build_glob_set(patterns)?;
    let mut matches = BTreeSet::new();

    let walker = WalkDir::new(project_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path while resolving manifest: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(key) = relative_key(project_root, entry.path()) else {
            continue;
        };
        if set.is_match(&key) {
            matches.insert(key);
        }
    }

    debug!(count = matches.len(), "Resolved manifest patterns");
    Ok(matches)
}

/// A transient copy of the manifest-selected project subset.
///
/// Dropping the handle removes the directory; `dispose` does so explicitly and
/// reports failures.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
    files: Vec<String>,
}

impl StagingDir {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root-relative keys of the files that were copied.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn dispose(self) -> std::io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "Removed staging directory");
        Ok(())
    }
}

/// Copy every resolved file into a fresh transient directory.
///
/// Copy failures are logged and skipped.
pub fn stage(patterns: &[String], project_root: &Path) -> Result<StagingDir, SdfError> {
    let resolved = resolve_patterns(patterns, project_root)?;
    let dir = tempfile::Builder::new()
        .prefix("sdfkit-deploy-")
        .tempdir()
        .map_err(|e| SdfError::Staging(format!("Failed to create staging directory: {}", e)))?;

    let mut files = Vec::with_capacity(resolved.len());
    for key in resolved {
        let relative = PathBuf::from(key.trim_start_matches('/'));
        let source = project_root.join(&relative);
        let target = dir.path().join(&relative);
        match copy_file(&source, &target) {
            Ok(()) => files.push(key),
            Err(e) => warn!(file = %key, "Failed to stage file: {}", e),
        }
    }

    debug!(
        path = %dir.path().display(),
        count = files.len(),
        "Staged files for deploy"
    );
    Ok(StagingDir { dir, files })
}

fn copy_file(source: &Path, target: &Path) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    Ok(())
}
