//! Shared test utilities for integration tests
//!
//! Provides a fake `sdfcli` shell script and a scripted host so orchestrator
//! flows run against real subprocesses without a real account.

use async_trait::async_trait;
use sdfkit::config::SdfConfig;
use sdfkit::error::SdfError;
use sdfkit::orchestrator::Orchestrator;
use sdfkit::ui::{Notice, NoticeLevel, Ui};
use std::collections::VecDeque;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;

/// Global mutex to serialize tests that write and execute fake CLI scripts.
/// Executing a script while another thread still holds it open for writing
/// fails with ETXTBSY.
static FAKE_CLI_MUTEX: Mutex<()> = Mutex::new(());

pub fn fake_cli_lock() -> MutexGuard<'static, ()> {
    FAKE_CLI_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// A shell script standing in for `sdfcli`.
///
/// Every invocation appends its arguments to `calls.log`. `manageauth -list`
/// prints a listing with the given authids; `body` handles everything else and
/// can append to the log through `$LOG`.
pub struct FakeCli {
    dir: TempDir,
    path: PathBuf,
}

impl FakeCli {
    pub fn new(authids: &[&str], body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sdfcli");
        let log = dir.path().join("calls.log");

        let mut listing = String::from("AuthID | Account | Role");
        for authid in authids {
            listing.push_str(&format!("\n{} | 1234567 | Administrator", authid));
        }
        let script = format!(
            "#!/bin/sh\nLOG=\"{log}\"\necho \"$*\" >> \"$LOG\"\ncase \"$1\" in\nmanageauth)\ncat <<'LISTING'\n{listing}\nLISTING\nexit 0\n;;\nesac\n{body}\nexit 0\n",
            log = log.display(),
            listing = listing,
            body = body,
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, path }
    }

    pub fn program(&self) -> String {
        self.path.display().to_string()
    }

    /// Lines appended to the call log, in order.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Logged invocations whose first argument is `token`.
    pub fn calls_for(&self, token: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|line| line.split_whitespace().next() == Some(token))
            .collect()
    }
}

/// Scripted host: answers come from queues, everything shown is recorded.
/// An empty queue answers with a cancellation.
#[derive(Default)]
pub struct RecordingUi {
    pub choices: Mutex<VecDeque<Option<String>>>,
    pub multi_choices: Mutex<VecDeque<Option<Vec<String>>>>,
    pub inputs: Mutex<VecDeque<Option<String>>>,
    pub choose_calls: Mutex<Vec<(String, Vec<String>)>>,
    pub notices: Mutex<Vec<Notice>>,
    pub statuses: Mutex<Vec<String>>,
    pub output: Mutex<Vec<String>>,
    pub terminals: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer_choice(&self, answer: &str) {
        self.choices.lock().unwrap().push_back(Some(answer.to_string()));
    }

    pub fn answer_many(&self, answers: &[&str]) {
        self.multi_choices
            .lock()
            .unwrap()
            .push_back(Some(answers.iter().map(|a| a.to_string()).collect()));
    }

    pub fn answer_input(&self, answer: &str) {
        self.inputs.lock().unwrap().push_back(Some(answer.to_string()));
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn notices_at(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn choose_count(&self) -> usize {
        self.choose_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Ui for RecordingUi {
    async fn choose(&self, title: &str, items: &[String]) -> Option<String> {
        self.choose_calls
            .lock()
            .unwrap()
            .push((title.to_string(), items.to_vec()));
        self.choices.lock().unwrap().pop_front().flatten()
    }

    async fn choose_many(&self, title: &str, items: &[String]) -> Option<Vec<String>> {
        self.choose_calls
            .lock()
            .unwrap()
            .push((title.to_string(), items.to_vec()));
        self.multi_choices.lock().unwrap().pop_front().flatten()
    }

    async fn input(&self, _prompt: &str, _placeholder: Option<&str>) -> Option<String> {
        self.inputs.lock().unwrap().pop_front().flatten()
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn set_status(&self, text: &str) {
        self.statuses.lock().unwrap().push(text.to_string());
    }

    fn output_line(&self, line: &str) {
        self.output.lock().unwrap().push(line.to_string());
    }

    async fn open_terminal(&self, program: &str, args: &[String]) -> Result<(), SdfError> {
        self.terminals
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        Ok(())
    }
}

/// Fresh project directory with the conventional folders.
pub fn project_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("FileCabinet/SuiteScripts")).unwrap();
    fs::create_dir_all(dir.path().join("Objects")).unwrap();
    dir
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Orchestrator for `project` driving `cli`, with config tweaks applied.
pub fn orchestrator(
    project: &Path,
    program: &str,
    ui: Arc<RecordingUi>,
    configure: impl FnOnce(&mut SdfConfig),
) -> Orchestrator {
    let mut config = SdfConfig::default();
    config.cli.executable = program.to_string();
    configure(&mut config);
    Orchestrator::new(project.to_path_buf(), config, ui)
}
