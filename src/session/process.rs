//! Subprocess-backed line channel.

use super::{LineBuffer, LineChannel};
use crate::error::SessionError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const READ_CHUNK: usize = 4096;

/// One running SDF CLI process.
pub struct ProcessSession {
    program: String,
    child: Child,
    stdin: Option<ChildStdin>,
    lines: mpsc::UnboundedReceiver<String>,
    readers: Vec<JoinHandle<()>>,
}

impl ProcessSession {
    /// Spawn `program args...` in `cwd` with piped stdio.
    pub fn start(program: &str, args: &[String], cwd: &Path) -> Result<Self, SessionError> {
        debug!(program, ?args, cwd = %cwd.display(), "Spawning process");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SessionError::from_spawn(program, e))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump(stderr, tx)));
        }

        Ok(Self {
            program: program.to_string(),
            stdin: child.stdin.take(),
            child,
            lines: rx,
            readers,
        })
    }

    /// Wait for exit. A non-zero status is an error.
    pub async fn wait(mut self) -> Result<(), SessionError> {
        drop(self.stdin.take());
        let status = self.child.wait().await?;
        for reader in self.readers.drain(..) {
            if let Err(e) = reader.await {
                warn!("Output reader task failed: {}", e);
            }
        }
        debug!(program = %self.program, ?status, "Process exited");
        if status.success() {
            Ok(())
        } else {
            Err(SessionError::ExitStatus {
                code: status.code(),
            })
        }
    }
}

#[async_trait]
impl LineChannel for ProcessSession {
    async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    async fn send_line(&mut self, line: &str) -> Result<(), SessionError> {
        let stdin = self.stdin.as_mut().ok_or(SessionError::StdinClosed)?;
        let mut payload = String::with_capacity(line.len() + 1);
        payload.push_str(line);
        payload.push('\n');
        stdin.write_all(payload.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }
}

/// Forward complete lines from one output stream into the shared channel.
async fn pump<R>(mut reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut buffer = LineBuffer::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                for line in buffer.push(&chunk[..n]) {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("Failed to read process output: {}", e);
                break;
            }
        }
    }
    if let Some(rest) = buffer.finish() {
        let _ = tx.send(rest);
    }
}
