//! Command orchestrator
//!
//! Owns the session state (registry cache, active environment, per-command flags,
//! status text) and runs every command through the same lifecycle:
//! configuring, environment selection, execution and cleanup. Cleanup runs on
//! every exit path. Requests are serialized through a single gate, so
//! concurrent flows only overlap in the bookkeeping around `execute`.

mod flows;
mod state;

pub use flows::{BackupAction, FILES_FILTER, OBJECTS_FILTER, SYNC_CONCURRENCY};
pub use state::{CommandFlags, Phase, SessionState};

use crate::command::{build_args, CommandKind};
use crate::config::SdfConfig;
use crate::environment::{fetch_registry, Environment, Registry};
use crate::error::{SdfError, SessionError};
use crate::interaction::drive;
use crate::session::ProcessSession;
use crate::ui::{Notice, Ui};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Scratch directory the CLI leaves in the project root after a deploy.
pub const DEPLOY_SCRATCH_DIR: &str = "var";

/// Status shown once the CLI executable is known to be missing.
pub const TOOL_UNAVAILABLE_STATUS: &str = "SDF: CLI not found";

/// One command invocation: kind, command-specific arguments and flags.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub kind: CommandKind,
    pub args: Vec<String>,
    pub flags: CommandFlags,
    /// Working directory; the project root when unset.
    pub cwd: Option<PathBuf>,
}

impl CommandRequest {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            args: Vec::new(),
            flags: CommandFlags::default(),
            cwd: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_flags(mut self, flags: CommandFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn in_dir(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }
}

/// Drives the SDF CLI for one project.
pub struct Orchestrator {
    project_root: PathBuf,
    config: SdfConfig,
    ui: Arc<dyn Ui>,
    state: Mutex<SessionState>,
    session_gate: tokio::sync::Mutex<()>,
}

impl Orchestrator {
    pub fn new(project_root: PathBuf, config: SdfConfig, ui: Arc<dyn Ui>) -> Self {
        let mut state = SessionState::default();
        state.status = state.idle_label();
        Self {
            project_root,
            config,
            ui,
            state: Mutex::new(state),
            session_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &SdfConfig {
        &self.config
    }

    /// Snapshot of the session state.
    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn active_environment(&self) -> Option<Environment> {
        self.state.lock().active.clone()
    }

    /// Select `authid` without consulting the registry. It is checked on the next load.
    pub fn preselect(&self, authid: &str) {
        self.set_active(Environment::new(authid));
    }

    fn program(&self) -> &str {
        &self.config.cli.executable
    }

    fn ensure_tool(&self) -> Result<(), SdfError> {
        if self.state.lock().tool_unavailable {
            return Err(SdfError::ToolUnavailable);
        }
        Ok(())
    }

    fn mark_tool_unavailable(&self) {
        let first = {
            let mut state = self.state.lock();
            let first = !state.tool_unavailable;
            state.tool_unavailable = true;
            state.status = TOOL_UNAVAILABLE_STATUS.to_string();
            first
        };
        if first {
            warn!(program = %self.program(), "SDF CLI executable not found");
            self.ui.notify(Notice::error(SdfError::ToolUnavailable.to_string()));
        }
        self.ui.set_status(TOOL_UNAVAILABLE_STATUS);
    }

    fn set_active(&self, env: Environment) {
        let status = {
            let mut state = self.state.lock();
            state.active = Some(env);
            state.status = state.idle_label();
            state.status.clone()
        };
        self.ui.set_status(&status);
    }

    fn refresh_status(&self) {
        let status = {
            let mut state = self.state.lock();
            if state.tool_unavailable {
                return;
            }
            state.status = state.idle_label();
            state.status.clone()
        };
        self.ui.set_status(&status);
    }

    /// Return the cached registry, or load it from the CLI when missing or `force`d.
    pub async fn load_registry(&self, force: bool) -> Result<Registry, SdfError> {
        self.ensure_tool()?;
        if !force {
            let cached = self.state.lock().registry.clone();
            if let Some(registry) = cached {
                return Ok(registry);
            }
        }

        match fetch_registry(self.program(), &self.project_root).await {
            Ok(registry) => {
                self.state.lock().registry = Some(registry.clone());
                Ok(registry)
            }
            Err(e) => {
                self.state.lock().invalidate_registry();
                if e.is_tool_unavailable() {
                    self.mark_tool_unavailable();
                }
                Err(e)
            }
        }
    }

    /// Clear the active environment if `registry` no longer lists it.
    fn revalidate_selection(&self, registry: &Registry) {
        let stale = self.state.lock().revalidate(registry);
        if let Some(authid) = stale {
            info!(authid = %authid, "Active environment is no longer available");
            self.ui
                .notify(Notice::warning(SdfError::StaleSelection(authid).to_string()));
            self.refresh_status();
        }
    }

    /// Pick the active environment: automatic for a single candidate, else ask.
    async fn choose_environment(&self, registry: &Registry) -> Result<Environment, SdfError> {
        let env = match registry.single() {
            Some(env) => {
                info!(authid = %env.authid, "Selected the only environment");
                env.clone()
            }
            None => {
                let previous =
                    std::mem::replace(&mut self.state.lock().phase, Phase::EnvironmentRequired);
                let picked = self
                    .ui
                    .choose("Select an environment", &registry.authids())
                    .await;
                self.state.lock().phase = previous;
                let picked = picked.ok_or(SdfError::Cancelled)?;
                registry
                    .get(&picked)
                    .cloned()
                    .ok_or(SdfError::NoEnvironmentSelected)?
            }
        };
        self.set_active(env.clone());
        Ok(env)
    }

    /// Interactive selection, prompting even when an environment is already active.
    pub async fn select_environment(&self) -> Result<Environment, SdfError> {
        let registry = self.load_registry(false).await?;
        self.revalidate_selection(&registry);
        self.choose_environment(&registry).await
    }

    /// The active environment, selecting one first when needed.
    pub async fn ensure_environment(&self) -> Result<Environment, SdfError> {
        let registry = self.load_registry(false).await?;
        self.revalidate_selection(&registry);
        let active = self.state.lock().active.clone();
        match active {
            Some(env) => Ok(env),
            None => self.choose_environment(&registry).await,
        }
    }

    /// Open an interactive terminal for the CLI's authenticate flow, then drop
    /// the cached registry since the account list will change.
    pub async fn authenticate(&self) -> Result<(), SdfError> {
        self.ensure_tool()?;
        let args = vec![CommandKind::Authenticate.token().to_string()];
        let result = self.ui.open_terminal(self.program(), &args).await;
        self.state.lock().invalidate_registry();
        if let Err(e) = &result {
            if e.is_tool_unavailable() {
                self.mark_tool_unavailable();
            }
        }
        result
    }

    /// Run one command to completion and return its accumulated result.
    ///
    /// The result is empty unless `collect_data` is set. Session state is
    /// restored whatever the outcome. Requests hold the session gate from
    /// configuring through cleanup, so the phase always belongs to one request.
    pub async fn execute(&self, request: CommandRequest) -> Result<Vec<String>, SdfError> {
        self.ensure_tool()?;
        let _gate = self.session_gate.lock().await;
        self.state.lock().phase = Phase::Configuring;

        let outcome = self.run_request(&request).await;

        let status = self.state.lock().finish(request.flags);
        match &outcome {
            Err(e) if e.is_tool_unavailable() => self.mark_tool_unavailable(),
            _ => self.ui.set_status(&status),
        }
        debug!(command = %request.kind, ok = outcome.is_ok(), "Command finished");

        if request.flags.collect_data {
            outcome
        } else {
            outcome.map(|_| Vec::new())
        }
    }

    async fn run_request(&self, request: &CommandRequest) -> Result<Vec<String>, SdfError> {
        let flags = request.flags;
        let authid = if flags.add_default_parameters && request.kind.takes_authid() {
            Some(self.ensure_environment().await?.authid)
        } else {
            None
        };
        let cwd = request
            .cwd
            .clone()
            .unwrap_or_else(|| self.project_root.clone());
        let project = (flags.add_project_parameter && request.kind.takes_project())
            .then(|| cwd.display().to_string());
        let args = build_args(request.kind, authid.as_deref(), project.as_deref(), &request.args);

        let running = self
            .state
            .lock()
            .begin(flags, format!("SDF: running {}", request.kind));
        self.ui.set_status(&running);

        let show_output = flags.show_output && self.config.cli.show_output;
        self.run_session(request.kind, &args, &cwd, show_output)
            .await
            .map_err(|e| match e {
                SessionError::ExecutableNotFound { .. } => SdfError::ToolUnavailable,
                other => SdfError::Session(other),
            })
    }

    async fn run_session(
        &self,
        kind: CommandKind,
        args: &[String],
        cwd: &Path,
        show_output: bool,
    ) -> Result<Vec<String>, SessionError> {
        info!(
            program = %self.program(),
            args = ?args,
            cwd = %cwd.display(),
            "Starting SDF CLI"
        );
        let mut session = ProcessSession::start(self.program(), args, cwd)?;
        let driven = drive(&mut session, kind, show_output, self.ui.as_ref()).await;
        let exited = session.wait().await;
        let lines = driven?;
        exited?;
        Ok(lines)
    }
}
