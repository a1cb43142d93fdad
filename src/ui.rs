//! Host interface: choice lists, text entry, notifications and the status line.
//!
//! The driver only ever asks the host to "present N choices and return a selection
//! or cancellation". `TerminalUi` implements that with dialoguer prompts.

use crate::error::{SdfError, SessionError};
use async_trait::async_trait;
use dialoguer::{Input, MultiSelect, Select};
use owo_colors::OwoColorize;
use std::process::Stdio;
use tracing::debug;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Capabilities the driver needs from its host. `None` means the user cancelled.
#[async_trait]
pub trait Ui: Send + Sync {
    async fn choose(&self, title: &str, items: &[String]) -> Option<String>;

    async fn choose_many(&self, title: &str, items: &[String]) -> Option<Vec<String>>;

    async fn input(&self, prompt: &str, placeholder: Option<&str>) -> Option<String>;

    fn notify(&self, notice: Notice);

    fn set_status(&self, text: &str);

    /// Raw tool output, shown while a command runs.
    fn output_line(&self, line: &str);

    /// Run an interactive command where the user can see and answer it directly.
    async fn open_terminal(&self, program: &str, args: &[String]) -> Result<(), SdfError>;
}

/// Terminal host backed by dialoguer.
#[derive(Debug, Default, Clone)]
pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Ui for TerminalUi {
    async fn choose(&self, title: &str, items: &[String]) -> Option<String> {
        if items.is_empty() {
            return None;
        }
        let title = title.to_string();
        let items = items.to_vec();
        tokio::task::spawn_blocking(move || {
            let index = Select::new()
                .with_prompt(title)
                .items(&items)
                .default(0)
                .interact_opt()
                .ok()
                .flatten()?;
            items.get(index).cloned()
        })
        .await
        .ok()
        .flatten()
    }

    async fn choose_many(&self, title: &str, items: &[String]) -> Option<Vec<String>> {
        if items.is_empty() {
            return None;
        }
        let title = title.to_string();
        let items = items.to_vec();
        tokio::task::spawn_blocking(move || {
            let picked = MultiSelect::new()
                .with_prompt(title)
                .items(&items)
                .interact_opt()
                .ok()
                .flatten()?;
            Some(
                picked
                    .into_iter()
                    .filter_map(|i| items.get(i).cloned())
                    .collect(),
            )
        })
        .await
        .ok()
        .flatten()
    }

    async fn input(&self, prompt: &str, placeholder: Option<&str>) -> Option<String> {
        let prompt = prompt.to_string();
        let placeholder = placeholder.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
            if let Some(initial) = placeholder {
                input = input.with_initial_text(initial);
            }
            input.interact_text().ok()
        })
        .await
        .ok()
        .flatten()
    }

    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message.green()),
            NoticeLevel::Warning => eprintln!("{}", notice.message.yellow()),
            NoticeLevel::Error => eprintln!("{}", notice.message.red().bold()),
        }
    }

    fn set_status(&self, text: &str) {
        debug!(status = text, "Status changed");
    }

    fn output_line(&self, line: &str) {
        eprintln!("{}", line.dimmed());
    }

    async fn open_terminal(&self, program: &str, args: &[String]) -> Result<(), SdfError> {
        let status = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| match SessionError::from_spawn(program, e) {
                SessionError::ExecutableNotFound { .. } => SdfError::ToolUnavailable,
                other => SdfError::Session(other),
            })?;
        if !status.success() {
            return Err(SdfError::Session(SessionError::ExitStatus {
                code: status.code(),
            }));
        }
        Ok(())
    }
}
