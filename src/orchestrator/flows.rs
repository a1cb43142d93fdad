//! User-facing flows built on `Orchestrator::execute`.

use super::{CommandFlags, CommandRequest, Orchestrator, DEPLOY_SCRATCH_DIR};
use crate::command::catalog::{self, ObjectType};
use crate::command::CommandKind;
use crate::error::SdfError;
use crate::manifest::{AddOutcome, ManifestStore, PathKind, MANIFEST_FILE};
use crate::staging::{self, relative_key};
use crate::ui::Notice;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Sync sub-flows in flight at once.
pub const SYNC_CONCURRENCY: usize = 5;

/// Remote file listings are narrowed to entries containing this segment.
pub const FILES_FILTER: &str = "SuiteScripts";

/// Remote object listings are narrowed to script ids containing this.
pub const OBJECTS_FILTER: &str = "cust";

const FILE_CABINET_DIR: &str = "FileCabinet";
const SUITESCRIPTS_DIR: &str = "FileCabinet/SuiteScripts";
const OBJECTS_DIR: &str = "Objects";
const RECORDS_DIR: &str = "Objects/Records";
const CONFIRM_WORD: &str = "OK";

/// What `backup_restore_deploy` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupAction {
    Backup,
    Restore,
}

impl BackupAction {
    pub fn label(self) -> &'static str {
        match self {
            BackupAction::Backup => "Backup",
            BackupAction::Restore => "Restore",
        }
    }
}

impl Orchestrator {
    fn manifest(&self) -> ManifestStore {
        ManifestStore::for_project(&self.project_root)
    }

    fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.join(relative.trim_start_matches('/'))
    }

    /// Run a command that needs no preparation.
    pub async fn run_simple(
        &self,
        kind: CommandKind,
        flags: CommandFlags,
    ) -> Result<Vec<String>, SdfError> {
        self.execute(CommandRequest::new(kind).with_flags(flags))
            .await
    }

    /// List objects, optionally of one type.
    pub async fn list_objects(
        &self,
        type_id: Option<&str>,
        flags: CommandFlags,
    ) -> Result<Vec<String>, SdfError> {
        let mut request = CommandRequest::new(CommandKind::ListObjects).with_flags(flags);
        if let Some(type_id) = type_id {
            request = request.with_args(["-type", type_id]);
        }
        self.execute(request).await
    }

    /// Deploy the project, from a staged copy when quick deploy is enabled.
    pub async fn deploy(&self, flags: CommandFlags) -> Result<Vec<String>, SdfError> {
        let request = CommandRequest::new(CommandKind::Deploy).with_flags(flags);
        if !self.config.deploy.use_quick_deploy {
            return self.execute(request).await;
        }

        let patterns = self.manifest().read_or_default()?.resolved_patterns();
        let root = self.project_root.clone();
        let staged = tokio::task::spawn_blocking(move || staging::stage(&patterns, &root))
            .await
            .map_err(|e| SdfError::Staging(format!("Staging task failed: {}", e)))??;
        info!(
            path = %staged.path().display(),
            files = staged.files().len(),
            "Deploying from staging directory"
        );

        let result = self
            .execute(request.in_dir(staged.path().to_path_buf()))
            .await;

        let scratch = self.project_root.join(DEPLOY_SCRATCH_DIR);
        if scratch.is_dir() {
            if let Err(e) = fs::remove_dir_all(&scratch) {
                warn!(path = %scratch.display(), "Failed to remove deploy scratch directory: {}", e);
            }
        }
        if let Err(e) = staged.dispose() {
            warn!("Failed to remove staging directory: {}", e);
        }
        result
    }

    /// Ask for a bundle id and import it.
    pub async fn import_bundle(&self) -> Result<Vec<String>, SdfError> {
        let bundle_id = self
            .ui
            .input("Bundle ID", None)
            .await
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(SdfError::Cancelled)?;
        if !bundle_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(SdfError::Validation(format!(
                "Bundle ID must be numeric: {}",
                bundle_id
            )));
        }
        self.execute(
            CommandRequest::new(CommandKind::ImportBundle).with_args(["-bundleid", &bundle_id]),
        )
        .await
    }

    /// Ask for a name and create an account customization project next to this one.
    pub async fn create_project(&self) -> Result<Vec<String>, SdfError> {
        let name = self
            .ui
            .input("Project name", None)
            .await
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(SdfError::Cancelled)?;
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(SdfError::Validation(format!("Invalid project name: {}", name)));
        }
        let parent = self
            .project_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.project_root.clone());
        let parent_arg = parent.display().to_string();
        let flags = CommandFlags {
            add_default_parameters: false,
            add_project_parameter: false,
            ..CommandFlags::default()
        };
        self.execute(
            CommandRequest::new(CommandKind::CreateProject)
                .with_flags(flags)
                .in_dir(parent)
                .with_args([
                    "-type",
                    "ACCOUNTCUSTOMIZATION",
                    "-parentdirectory",
                    &parent_arg,
                    "-projectname",
                    &name,
                ]),
        )
        .await
    }

    /// Remote script files under `/SuiteScripts`.
    async fn list_remote_files(&self) -> Result<Vec<String>, SdfError> {
        let lines = self
            .execute(CommandRequest::new(CommandKind::ListFiles).with_flags(CommandFlags::collecting()))
            .await?;
        Ok(lines
            .into_iter()
            .filter(|line| line.contains(FILES_FILTER))
            .collect())
    }

    async fn import_file_paths(&self, paths: &[String]) -> Result<Vec<String>, SdfError> {
        self.execute(
            CommandRequest::new(CommandKind::ImportFiles).with_args(["-paths", &paths.join(" ")]),
        )
        .await
    }

    /// List remote files, let the user pick, import the picks.
    pub async fn import_files(&self) -> Result<Vec<String>, SdfError> {
        let paths = self.list_remote_files().await?;
        if paths.is_empty() {
            return Err(SdfError::Validation(
                "No files found under /SuiteScripts".to_string(),
            ));
        }
        let picked = self
            .ui
            .choose_many("Select files to import", &paths)
            .await
            .filter(|p| !p.is_empty())
            .ok_or(SdfError::Cancelled)?;
        self.import_file_paths(&picked).await
    }

    async fn pick_object_type(&self, type_id: Option<&str>) -> Result<&'static ObjectType, SdfError> {
        let object_type = match type_id {
            Some(type_id) => catalog::find_by_type_id(type_id)
                .ok_or_else(|| SdfError::Validation(format!("Unknown object type: {}", type_id)))?,
            None => {
                let labels: Vec<String> = catalog::supported_object_types()
                    .map(|t| t.label.to_string())
                    .collect();
                let label = self
                    .ui
                    .choose("Select an object type", &labels)
                    .await
                    .ok_or(SdfError::Cancelled)?;
                catalog::find_by_label(&label).ok_or(SdfError::Cancelled)?
            }
        };
        if !object_type.is_supported() {
            return Err(SdfError::Validation(format!(
                "{} cannot be imported",
                object_type.label
            )));
        }
        Ok(object_type)
    }

    async fn list_remote_objects(&self, object_type: &ObjectType) -> Result<Vec<String>, SdfError> {
        let lines = self
            .execute(
                CommandRequest::new(CommandKind::ListObjects)
                    .with_flags(CommandFlags::collecting())
                    .with_args(["-type", object_type.type_id]),
            )
            .await?;
        Ok(lines
            .into_iter()
            .filter(|line| line.contains(OBJECTS_FILTER))
            .collect())
    }

    async fn import_object_ids(
        &self,
        object_type: &ObjectType,
        script_ids: &[String],
    ) -> Result<Vec<String>, SdfError> {
        fs::create_dir_all(self.project_path(object_type.destination))?;
        self.execute(CommandRequest::new(CommandKind::ImportObjects).with_args([
            "-scriptid",
            &script_ids.join(" "),
            "-type",
            object_type.type_id,
            "-destinationfolder",
            object_type.destination,
        ]))
        .await
    }

    /// Pick an object type (unless given), list its objects, import the picks.
    pub async fn import_objects(&self, type_id: Option<&str>) -> Result<Vec<String>, SdfError> {
        let object_type = self.pick_object_type(type_id).await?;
        let ids = self.list_remote_objects(object_type).await?;
        if ids.is_empty() {
            return Err(SdfError::Validation(format!(
                "No {} found in the account",
                object_type.label
            )));
        }
        let picked = self
            .ui
            .choose_many("Select objects to import", &ids)
            .await
            .filter(|p| !p.is_empty())
            .ok_or(SdfError::Cancelled)?;
        self.import_object_ids(object_type, &picked).await
    }

    /// Update objects from their local definitions under `Objects`.
    pub async fn update(&self) -> Result<Vec<String>, SdfError> {
        let objects = self.project_path(OBJECTS_DIR);
        if !objects.is_dir() {
            return Err(SdfError::Validation(
                "No Objects folder found in the project".to_string(),
            ));
        }
        let names = xml_file_names(&objects, |_| true);
        if names.is_empty() {
            return Err(SdfError::Validation(
                "No object definitions found under Objects".to_string(),
            ));
        }
        let picked = self
            .ui
            .choose_many("Select objects to update", &names)
            .await
            .filter(|p| !p.is_empty())
            .ok_or(SdfError::Cancelled)?;
        let ids: Vec<&str> = picked.iter().map(|name| script_id(name)).collect();
        self.execute(CommandRequest::new(CommandKind::Update).with_args(["-scriptid", &ids.join(" ")]))
            .await
    }

    /// Update one custom record definition together with its instances.
    pub async fn update_custom_record(&self) -> Result<Vec<String>, SdfError> {
        let records = self.project_path(RECORDS_DIR);
        if !records.is_dir() {
            return Err(SdfError::Validation(
                "No Objects/Records folder found. Import the custom record first.".to_string(),
            ));
        }
        let names = xml_file_names(&records, |name| name.starts_with("customrecord"));
        if names.is_empty() {
            return Err(SdfError::Validation(
                "No custom record definitions found under Objects/Records".to_string(),
            ));
        }
        let picked = self
            .ui
            .choose("Select a custom record", &names)
            .await
            .ok_or(SdfError::Cancelled)?;
        self.execute(
            CommandRequest::new(CommandKind::UpdateCustomRecordWithInstances)
                .with_args(["-scriptid", script_id(&picked)]),
        )
        .await
    }

    async fn confirm_ok(&self, prompt: &str) -> Result<(), SdfError> {
        match self.ui.input(prompt, None).await {
            Some(answer) if answer == CONFIRM_WORD => Ok(()),
            _ => Err(SdfError::Cancelled),
        }
    }

    fn clear_project_folders(&self) -> Result<(), SdfError> {
        for relative in [OBJECTS_DIR, SUITESCRIPTS_DIR] {
            let dir = self.project_path(relative);
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
            fs::create_dir_all(&dir)?;
            debug!(path = %dir.display(), "Cleared project folder");
        }
        Ok(())
    }

    /// Delete and recreate `Objects` and `FileCabinet/SuiteScripts` after confirmation.
    pub async fn remove_folders(&self) -> Result<(), SdfError> {
        self.confirm_ok("This deletes Objects and FileCabinet/SuiteScripts. Type OK to continue")
            .await?;
        self.clear_project_folders()?;
        self.ui.notify(Notice::info("Project folders removed"));
        Ok(())
    }

    async fn sync_files(&self) -> Result<(), SdfError> {
        let paths = self.list_remote_files().await?;
        if !paths.is_empty() {
            self.import_file_paths(&paths).await?;
        }
        Ok(())
    }

    async fn sync_objects(&self, object_type: &'static ObjectType) -> Result<(), SdfError> {
        let ids = self.list_remote_objects(object_type).await?;
        if !ids.is_empty() {
            self.import_object_ids(object_type, &ids).await?;
        }
        Ok(())
    }

    /// Replace local files and objects with the account's copies.
    ///
    /// Sub-flow failures are logged and otherwise ignored.
    pub async fn sync(&self) -> Result<(), SdfError> {
        self.confirm_ok(
            "Sync replaces Objects and FileCabinet/SuiteScripts with the account's copies. Type OK to continue",
        )
        .await?;
        // Select before dispatch so concurrent flows never prompt.
        self.ensure_environment().await?;
        self.clear_project_folders()?;

        let mut flows: Vec<BoxFuture<'_, Result<(), SdfError>>> = Vec::new();
        flows.push(Box::pin(self.sync_files()));
        for object_type in catalog::supported_object_types() {
            flows.push(Box::pin(self.sync_objects(object_type)));
        }
        let total = flows.len();
        let results: Vec<Result<(), SdfError>> = stream::iter(flows)
            .buffer_unordered(SYNC_CONCURRENCY)
            .collect()
            .await;

        let failures: Vec<&SdfError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        if failures.is_empty() {
            info!(flows = total, "Sync completed");
            self.ui.notify(Notice::info("Sync completed"));
        } else {
            for e in &failures {
                debug!("Ignoring failed sync flow: {}", e);
            }
            info!(flows = total, failed = failures.len(), "Sync finished with failures");
        }
        self.refresh_status();
        Ok(())
    }

    /// Overwrite deploy.xml with an empty manifest.
    pub fn create_reset_deploy(&self) -> Result<(), SdfError> {
        self.manifest().reset()?;
        self.ui.notify(Notice::info("deploy.xml has been reset"));
        Ok(())
    }

    fn backup_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.deploy.backup_dir)
    }

    /// Back deploy.xml up under a name, or restore a previous backup.
    pub async fn backup_restore_deploy(&self, action: Option<BackupAction>) -> Result<(), SdfError> {
        let action = match action {
            Some(action) => action,
            None => {
                let items = vec![
                    BackupAction::Backup.label().to_string(),
                    BackupAction::Restore.label().to_string(),
                ];
                match self.ui.choose("Backup or restore deploy.xml", &items).await {
                    Some(choice) if choice == BackupAction::Backup.label() => BackupAction::Backup,
                    Some(_) => BackupAction::Restore,
                    None => return Err(SdfError::Cancelled),
                }
            }
        };
        match action {
            BackupAction::Backup => self.backup_deploy().await,
            BackupAction::Restore => self.restore_deploy().await,
        }
    }

    async fn backup_deploy(&self) -> Result<(), SdfError> {
        let default_name = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let name = self
            .ui
            .input("Backup name", Some(&default_name))
            .await
            .ok_or(SdfError::Cancelled)?;
        let name = match name.trim() {
            "" => default_name,
            trimmed => trimmed.trim_end_matches(".xml").to_string(),
        };
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(SdfError::Validation(format!("Invalid backup name: {}", name)));
        }

        let store = self.manifest();
        store.read_or_default()?;
        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir)?;
        let target = backup_dir.join(format!("{}.xml", name));
        fs::copy(store.path(), &target)?;
        info!(path = %target.display(), "Backed up deploy.xml");

        if self.config.deploy.auto_reset_after_backup {
            store.reset()?;
        }
        self.ui
            .notify(Notice::info(format!("deploy.xml backed up as {}.xml", name)));
        Ok(())
    }

    async fn restore_deploy(&self) -> Result<(), SdfError> {
        let backup_dir = self.backup_dir();
        let backups = if backup_dir.is_dir() {
            xml_file_names(&backup_dir, |_| true)
        } else {
            Vec::new()
        };
        if backups.is_empty() {
            return Err(SdfError::Validation("No deploy.xml backups found".to_string()));
        }
        let picked = self
            .ui
            .choose("Select a backup to restore", &backups)
            .await
            .ok_or(SdfError::Cancelled)?;
        fs::copy(backup_dir.join(&picked), self.project_root.join(MANIFEST_FILE))?;
        info!(backup = %picked, "Restored deploy.xml");
        self.ui
            .notify(Notice::info(format!("deploy.xml restored from {}", picked)));
        Ok(())
    }

    /// Resolve a user-supplied target to a project-relative file path.
    ///
    /// Accepts `~/`-rooted manifest notation, paths relative to the project root,
    /// and absolute paths inside it.
    fn resolve_target(&self, target: &str) -> Result<PathBuf, SdfError> {
        let trimmed = target.trim();
        let candidate = match trimmed.strip_prefix("~/") {
            Some(rest) => self.project_root.join(rest),
            None => {
                let path = PathBuf::from(trimmed);
                if path.is_absolute() {
                    path
                } else {
                    self.project_root.join(path)
                }
            }
        };
        if Path::new(trimmed)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(SdfError::Validation(format!(
                "Path must not leave the project: {}",
                target
            )));
        }
        if !candidate.is_file() {
            return Err(SdfError::Validation(format!("Not a file: {}", target)));
        }
        let root = dunce::canonicalize(&self.project_root)?;
        let file = dunce::canonicalize(&candidate)?;
        if !file.starts_with(&root) {
            return Err(SdfError::Validation(format!(
                "File is outside the project: {}",
                target
            )));
        }
        Ok(file)
    }

    fn add_to_manifest(&self, kind: PathKind, entry: &str) -> Result<AddOutcome, SdfError> {
        let outcome = self.manifest().add_path(kind, entry)?;
        match outcome {
            AddOutcome::Added => {
                info!(kind = kind.label(), path = %entry, "Added to deploy.xml");
                self.ui
                    .notify(Notice::info(format!("File added to deploy.xml: {}", entry)));
            }
            AddOutcome::AlreadyPresent => {
                self.ui.notify(Notice::warning(format!(
                    "File already exists in deploy.xml: {}",
                    entry
                )));
            }
        }
        Ok(outcome)
    }

    /// First compiled `.js` under `FileCabinet/SuiteScripts` sharing the stem of `source`.
    fn matching_javascript(&self, source: &Path) -> Option<PathBuf> {
        let stem = source.file_stem()?.to_owned();
        WalkDir::new(self.project_path(SUITESCRIPTS_DIR))
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .find(|e| {
                e.file_type().is_file()
                    && e.path().extension().is_some_and(|ext| ext == "js")
                    && e.path().file_stem() == Some(stem.as_os_str())
            })
            .map(|e| e.into_path())
    }

    /// Add one project file to deploy.xml.
    ///
    /// Files under `FileCabinet` go to `files`, files under `Objects` to
    /// `objects`. A TypeScript source may instead contribute its compiled script.
    pub fn add_file_to_deploy(&self, target: &str) -> Result<Vec<AddOutcome>, SdfError> {
        let file = self.resolve_target(target)?;
        let root = dunce::canonicalize(&self.project_root)?;
        let key = relative_key(&root, &file)
            .ok_or_else(|| SdfError::Validation(format!("File is outside the project: {}", target)))?;
        let kind = path_kind(&key);
        let is_typescript = file.extension().is_some_and(|ext| ext == "ts");
        let add_javascript = self.config.deploy.add_matching_javascript && is_typescript;

        if kind.is_none() && !add_javascript {
            return Err(SdfError::Validation(format!(
                "Only files under FileCabinet or Objects can be added to deploy.xml: {}",
                target
            )));
        }

        // Every entry is resolved before deploy.xml is touched.
        let mut entries = Vec::new();
        if let Some(kind) = kind {
            entries.push((kind, format!("~{}", key)));
        }
        if add_javascript && kind != Some(PathKind::File) {
            let compiled = self
                .matching_javascript(&file)
                .and_then(|js| relative_key(&self.project_root, &js))
                .ok_or_else(|| {
                    SdfError::Validation(format!("No compiled script found for {}", target))
                })?;
            entries.push((PathKind::File, format!("~{}", compiled)));
        }

        entries
            .iter()
            .map(|(kind, entry)| self.add_to_manifest(*kind, entry))
            .collect()
    }

    /// Reload the registry from the CLI and revalidate the active environment.
    pub async fn refresh_config(&self) -> Result<usize, SdfError> {
        let registry = self.load_registry(true).await?;
        self.revalidate_selection(&registry);
        self.refresh_status();
        self.ui.notify(Notice::info(format!(
            "Loaded {} environment{}",
            registry.len(),
            if registry.len() == 1 { "" } else { "s" }
        )));
        Ok(registry.len())
    }

    /// Every known environment with a marker for the active one.
    pub async fn environments(&self) -> Result<Vec<(String, bool)>, SdfError> {
        let registry = self.load_registry(false).await?;
        self.revalidate_selection(&registry);
        let active = self.active_environment();
        Ok(registry
            .iter()
            .map(|env| {
                let is_active = active.as_ref().is_some_and(|a| a.authid == env.authid);
                (env.authid.clone(), is_active)
            })
            .collect())
    }
}

fn path_kind(key: &str) -> Option<PathKind> {
    let first = key.trim_start_matches('/').split('/').next()?;
    match first {
        FILE_CABINET_DIR => Some(PathKind::File),
        OBJECTS_DIR => Some(PathKind::Object),
        _ => None,
    }
}

/// File names of `.xml` files below `dir`, sorted and deduplicated.
fn xml_file_names(dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".xml") && keep(name))
        .collect();
    names.sort();
    names.dedup();
    names
}

fn script_id(file_name: &str) -> &str {
    file_name.strip_suffix(".xml").unwrap_or(file_name)
}
