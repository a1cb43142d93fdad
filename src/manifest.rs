//! Deployment manifest store (`deploy.xml`).
//!
//! The manifest lists file and object path patterns in `~/`-rooted notation:
//!
//! ```xml
//! <deploy>
//!     <files>
//!         <path>~/FileCabinet/SuiteScripts/*</path>
//!     </files>
//!     <objects>
//!         <path>~/Objects/*</path>
//!     </objects>
//! </deploy>
//! ```
//!
//! Reads are best-effort read-modify-write; the file is not locked.

use crate::error::ManifestError;
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manifest file name at the project root.
pub const MANIFEST_FILE: &str = "deploy.xml";

/// Minimal empty manifest document.
pub const EMPTY_MANIFEST: &str = "<deploy></deploy>";

/// Files every staged deploy needs besides the manifest patterns: the manifest
/// itself, the project metadata file and the hidden CLI marker.
pub const BOOTSTRAP_PATTERNS: &[&str] = &["~/deploy.xml", "~/manifest.xml", "~/.sdf"];

/// Which manifest list a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Object,
}

impl PathKind {
    pub fn label(self) -> &'static str {
        match self {
            PathKind::File => "file",
            PathKind::Object => "object",
        }
    }
}

/// Outcome of an idempotent insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// In-memory manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployManifest {
    pub files: Vec<String>,
    pub objects: Vec<String>,
    configuration: Option<Vec<String>>,
    translation_imports: Option<Vec<String>>,
}

impl DeployManifest {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.objects.is_empty()
            && self.configuration.is_none()
            && self.translation_imports.is_none()
    }

    pub fn list(&self, kind: PathKind) -> &[String] {
        match kind {
            PathKind::File => &self.files,
            PathKind::Object => &self.objects,
        }
    }

    pub fn contains(&self, kind: PathKind, path: &str) -> bool {
        self.list(kind).iter().any(|p| p == path)
    }

    /// Append a path unless it is already listed. Plain string equality.
    pub fn insert(&mut self, kind: PathKind, path: &str) -> AddOutcome {
        if self.contains(kind, path) {
            return AddOutcome::AlreadyPresent;
        }
        match kind {
            PathKind::File => self.files.push(path.to_string()),
            PathKind::Object => self.objects.push(path.to_string()),
        }
        AddOutcome::Added
    }

    /// Files, then objects, then the bootstrap inclusions. Duplicates are kept.
    pub fn resolved_patterns(&self) -> Vec<String> {
        self.files
            .iter()
            .chain(self.objects.iter())
            .cloned()
            .chain(BOOTSTRAP_PATTERNS.iter().map(|p| p.to_string()))
            .collect()
    }

    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let doc: DeployDocument =
            quick_xml::de::from_str(text).map_err(|e| ManifestError::Parse(e.to_string()))?;
        Ok(doc.into())
    }

    pub fn to_xml(&self) -> Result<String, ManifestError> {
        if self.is_empty() {
            return Ok(EMPTY_MANIFEST.to_string());
        }
        let doc = DeployDocument::from(self);
        let mut buffer = String::new();
        let mut ser = Serializer::with_root(&mut buffer, Some("deploy"))
            .map_err(|e| ManifestError::Serialize(e.to_string()))?;
        ser.indent(' ', 4);
        doc.serialize(ser)
            .map_err(|e| ManifestError::Serialize(e.to_string()))?;
        buffer.push('\n');
        Ok(buffer)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DeployDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    configuration: Option<PathList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    files: Option<PathList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objects: Option<PathList>,
    #[serde(
        rename = "translationimports",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    translation_imports: Option<PathList>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PathList {
    #[serde(rename = "path", default)]
    paths: Vec<String>,
}

impl From<DeployDocument> for DeployManifest {
    fn from(doc: DeployDocument) -> Self {
        Self {
            files: doc.files.map(|l| l.paths).unwrap_or_default(),
            objects: doc.objects.map(|l| l.paths).unwrap_or_default(),
            configuration: doc.configuration.map(|l| l.paths),
            translation_imports: doc.translation_imports.map(|l| l.paths),
        }
    }
}

impl From<&DeployManifest> for DeployDocument {
    fn from(manifest: &DeployManifest) -> Self {
        let list = |paths: &Vec<String>| {
            (!paths.is_empty()).then(|| PathList {
                paths: paths.clone(),
            })
        };
        Self {
            configuration: manifest.configuration.as_ref().map(|p| PathList {
                paths: p.clone(),
            }),
            files: list(&manifest.files),
            objects: list(&manifest.objects),
            translation_imports: manifest.translation_imports.as_ref().map(|p| PathList {
                paths: p.clone(),
            }),
        }
    }
}

/// File-backed manifest operations.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store for `deploy.xml` under a project root.
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(MANIFEST_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the manifest, writing an empty document first when it is missing.
    pub fn read_or_default(&self) -> Result<DeployManifest, ManifestError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Creating empty manifest");
            self.reset()?;
        }
        let text = fs::read_to_string(&self.path)?;
        DeployManifest::parse(&text)
    }

    pub fn write(&self, manifest: &DeployManifest) -> Result<(), ManifestError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, manifest.to_xml()?)?;
        Ok(())
    }

    /// Overwrite with the minimal empty document.
    pub fn reset(&self) -> Result<(), ManifestError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, EMPTY_MANIFEST)?;
        Ok(())
    }

    /// Append `path` to the `kind` list and persist, unless already listed.
    pub fn add_path(&self, kind: PathKind, path: &str) -> Result<AddOutcome, ManifestError> {
        let mut manifest = self.read_or_default()?;
        let outcome = manifest.insert(kind, path);
        if outcome == AddOutcome::Added {
            self.write(&manifest)?;
        }
        Ok(outcome)
    }
}
