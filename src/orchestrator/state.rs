//! Session state owned by the orchestrator.

use crate::environment::{Environment, Registry};

/// Where the orchestrator is in a command's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Configuring,
    EnvironmentRequired,
    Executing,
    CleaningUp,
}

/// Per-command switches. Restored to defaults after every command unless
/// `retain_data` asks to keep them with the collected result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFlags {
    pub add_project_parameter: bool,
    pub add_default_parameters: bool,
    pub show_output: bool,
    pub collect_data: bool,
    pub retain_data: bool,
}

impl Default for CommandFlags {
    fn default() -> Self {
        Self {
            add_project_parameter: true,
            add_default_parameters: true,
            show_output: true,
            collect_data: false,
            retain_data: false,
        }
    }
}

impl CommandFlags {
    /// Quiet run whose result feeds a follow-up command.
    pub fn collecting() -> Self {
        Self {
            show_output: false,
            collect_data: true,
            retain_data: true,
            ..Self::default()
        }
    }
}

/// Mutable session state: registry cache, selection, status and in-flight flags.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub registry: Option<Registry>,
    pub active: Option<Environment>,
    pub phase: Phase,
    pub flags: CommandFlags,
    pub status: String,
    pub saved_status: Option<String>,
    pub tool_unavailable: bool,
}

impl SessionState {
    /// Status label when nothing is running.
    pub fn idle_label(&self) -> String {
        match &self.active {
            Some(env) => format!("SDF: {}", env.authid),
            None => "SDF: no environment".to_string(),
        }
    }

    /// Drop the cached registry; the next command reloads it.
    pub fn invalidate_registry(&mut self) {
        self.registry = None;
    }

    /// Clear the selection if it is not listed in `registry`. Returns the stale authid.
    pub fn revalidate(&mut self, registry: &Registry) -> Option<String> {
        match &self.active {
            Some(env) if !registry.contains(&env.authid) => {
                let stale = env.authid.clone();
                self.active = None;
                Some(stale)
            }
            _ => None,
        }
    }

    /// Enter execution for a command: capture the status to restore afterwards.
    pub fn begin(&mut self, flags: CommandFlags, running_label: String) -> String {
        self.phase = Phase::Executing;
        self.flags = flags;
        self.saved_status = Some(std::mem::replace(&mut self.status, running_label.clone()));
        running_label
    }

    /// Return to idle after a command, whatever its outcome. Returns the status to show.
    pub fn finish(&mut self, flags: CommandFlags) -> String {
        self.phase = Phase::CleaningUp;
        self.flags = if flags.retain_data {
            flags
        } else {
            CommandFlags::default()
        };
        self.status = self
            .saved_status
            .take()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.idle_label());
        self.phase = Phase::Idle;
        self.status.clone()
    }
}
