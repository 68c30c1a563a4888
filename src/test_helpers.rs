//! Test doubles for the installer's collaborators

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;

use crate::deps::Dependencies;
use crate::error::InstallError;
use crate::installer::AccessSummary;
use crate::tools::PlatformKind;
use crate::ui::prompt::PromptSpec;
use crate::ui::{Prompter, StepProgress, UserInterface};
use crate::utils::command::CommandResult;
use crate::utils::{CommandSpec, Shell};

mock! {
    pub PrompterMock {}

    impl Prompter for PrompterMock {
        fn ask(&self, spec: &PromptSpec) -> Result<usize, InstallError>;
    }
}

struct Response {
    prefix: String,
    results: VecDeque<CommandResult>,
}

/// Shell answering by command-line prefix and recording every invocation
///
/// Unmatched commands succeed with empty output. A scripted sequence is
/// consumed in order and its last entry repeats.
#[derive(Default)]
pub struct ScriptedShell {
    responses: Mutex<Vec<Response>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, prefix: &str, result: CommandResult) {
        self.respond_sequence(prefix, vec![result]);
    }

    pub fn respond_sequence(&self, prefix: &str, results: Vec<CommandResult>) {
        self.responses.lock().unwrap().push(Response {
            prefix: prefix.to_string(),
            results: results.into(),
        });
    }

    /// Command lines run so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Shell for ScriptedShell {
    async fn run(&self, spec: &CommandSpec) -> CommandResult {
        let line = spec.command_line();
        self.calls.lock().unwrap().push(line.clone());

        let mut responses = self.responses.lock().unwrap();
        match responses.iter_mut().find(|r| line.starts_with(&r.prefix)) {
            Some(response) if response.results.len() > 1 => {
                response.results.pop_front().unwrap_or_default()
            }
            Some(response) => response.results.front().cloned().unwrap_or_default(),
            None => CommandResult::ok(Vec::<String>::new()),
        }
    }
}

/// UI capturing plain-text lines
#[derive(Default)]
pub struct RecordingUi {
    lines: Arc<Mutex<Vec<String>>>,
    warnings: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl UserInterface for RecordingUi {
    fn start_step(&self, label: &str) -> Box<dyn StepProgress> {
        Box::new(RecordingStep {
            label: label.to_string(),
            lines: self.lines.clone(),
        })
    }

    fn print_output(&self, stdout: &[String], stderr: &[String]) {
        let mut lines = self.lines.lock().unwrap();
        lines.extend(stdout.iter().map(|l| format!("    {}", l)));
        lines.extend(stderr.iter().map(|l| format!("    ! {}", l)));
    }

    fn print_failure(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }

    fn print_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn print_banner(&self) {
        self.lines.lock().unwrap().push("P 4 E C T L".to_string());
    }

    fn print_summary(&self, summary: &AccessSummary) {
        let mut lines = self.lines.lock().unwrap();
        lines.push("Done!".to_string());
        for (name, value) in summary.entries() {
            lines.push(format!("{}: {}", name, value));
        }
    }
}

struct RecordingStep {
    label: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl StepProgress for RecordingStep {
    fn finish_success(self: Box<Self>, success_label: &str) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{} ...{}", self.label, success_label));
    }

    fn finish_failure(self: Box<Self>) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{} ...failed", self.label));
    }
}

/// Scripted collaborators on a fixed Linux host
pub struct TestEnv {
    pub shell: Arc<ScriptedShell>,
    pub ui: Arc<RecordingUi>,
    pub prompter: Arc<MockPrompterMock>,
    pub platform: PlatformKind,
}

impl TestEnv {
    /// Environment whose prompter fails the test if asked anything
    pub fn new() -> Self {
        Self::with_prompter(MockPrompterMock::new())
    }

    pub fn with_prompter(prompter: MockPrompterMock) -> Self {
        Self {
            shell: Arc::new(ScriptedShell::new()),
            ui: Arc::new(RecordingUi::new()),
            prompter: Arc::new(prompter),
            platform: PlatformKind::Linux,
        }
    }

    pub fn deps(&self) -> Dependencies {
        Dependencies {
            shell: self.shell.clone(),
            prompter: self.prompter.clone(),
            ui: self.ui.clone(),
            platform: self.platform.clone(),
        }
    }
}
