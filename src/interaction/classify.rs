//! Pure per-line classification.

use super::prompts::{match_prompt, PromptRule};
use crate::command::CommandKind;
use crate::ui::Notice;

/// Boilerplate line prefixes dropped from results.
pub const NOISE_PREFIXES: &[&str] = &[
    "[INFO]",
    "SuiteCloud Development Framework CLI",
    "Done.",
    "Using ",
];

/// Everything the driver needs to know about one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClass {
    pub prompt: Option<&'static PromptRule>,
    pub notice: Option<Notice>,
    /// Transformed text to accumulate, `None` when filtered out.
    pub keep: Option<String>,
}

pub fn is_noise(line: &str) -> bool {
    line.is_empty() || NOISE_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Notifications raised by recognized output. Observational only.
pub fn notice_for(kind: CommandKind, line: &str) -> Option<Notice> {
    if kind == CommandKind::UpdateCustomRecordWithInstances && line.contains("does not exist") {
        return Some(Notice::error(
            "Custom record does not exist for updating. Please Import Object first.",
        ));
    }
    if line.contains("Installation COMPLETE") {
        return Some(Notice::info("Installation of deployment was completed."));
    }
    None
}

pub fn classify_line(kind: CommandKind, line: &str) -> LineClass {
    LineClass {
        prompt: match_prompt(line),
        notice: notice_for(kind, line),
        keep: (!is_noise(line)).then(|| kind.transform_line(line)),
    }
}
