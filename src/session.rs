//! Process session: the SDF CLI as a duplex line stream.
//!
//! Output (stdout and stderr merged) is produced as whole UTF-8 lines; input is
//! injected one line at a time. Only one session runs per driver at a time; the
//! orchestrator enforces that.

use crate::error::SessionError;
use async_trait::async_trait;

mod lines;
mod process;

pub use lines::LineBuffer;
pub use process::ProcessSession;

/// A live line-oriented conversation with a subprocess.
#[async_trait]
pub trait LineChannel: Send {
    /// Next complete output line, or `None` once output is exhausted.
    async fn next_line(&mut self) -> Option<String>;

    /// Write `line` followed by a newline to the process input.
    async fn send_line(&mut self, line: &str) -> Result<(), SessionError>;
}
