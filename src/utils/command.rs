/// External command execution with progress reporting and captured output
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::ui::UserInterface;

/// One external command together with how its progress is labelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub label: String,
    pub success_label: String,
    pub program: String,
    pub args: Vec<String>,
    pub show_output: bool,
}

impl CommandSpec {
    /// Create a spec for `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            label: format!("Running {}", program),
            success_label: "done".to_string(),
            program,
            args: Vec::new(),
            show_output: false,
        }
    }

    /// Add a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the label shown next to the spinner
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the word shown after the label on success
    pub fn success(mut self, success_label: impl Into<String>) -> Self {
        self.success_label = success_label.into();
        self
    }

    /// Echo captured output once the command finishes
    pub fn show_output(mut self, show: bool) -> Self {
        self.show_output = show;
        self
    }

    /// Program and arguments as a single line
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result from command execution with captured output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandResult {
    /// Successful result with the given stdout lines
    #[cfg(test)]
    pub fn ok<I, S>(stdout: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            success: true,
            stdout: stdout.into_iter().map(Into::into).collect(),
            stderr: Vec::new(),
        }
    }

    /// Failed result carrying a single stderr line
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: Vec::new(),
            stderr: vec![stderr.into()],
        }
    }

    /// Stdout lines joined by a single space
    pub fn joined_output(&self) -> String {
        self.stdout.join(" ")
    }
}

/// Runs command specs for the installer
#[async_trait]
pub trait Shell: Send + Sync {
    /// Execute the command once and report its outcome
    async fn run(&self, spec: &CommandSpec) -> CommandResult;
}

/// Spawn `program`, drain both output streams and wait for it to exit
pub async fn run_captured(program: &str, args: &[String]) -> CommandResult {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!("Failed to spawn {}: {}", program, e);
            return CommandResult::failed(format!("failed to spawn {}: {}", program, e));
        }
    };

    let stdout = child.stdout.take().map(drain_lines);
    let stderr = child.stderr.take().map(drain_lines);

    let status = child.wait().await;

    let stdout = join_lines(stdout).await;
    let stderr = join_lines(stderr).await;

    let success = match status {
        Ok(status) => {
            debug!("{} exited with {}", program, status);
            status.success()
        }
        Err(e) => {
            warn!("Failed to wait for {}: {}", program, e);
            false
        }
    };

    CommandResult {
        success,
        stdout,
        stderr,
    }
}

fn drain_lines<R>(stream: R) -> JoinHandle<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        let mut collected = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            collected.push(line);
        }
        collected
    })
}

async fn join_lines(handle: Option<JoinHandle<Vec<String>>>) -> Vec<String> {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    }
}

/// Shell that shows a spinner per command and echoes output on request
pub struct ShellExecutor {
    ui: Arc<dyn UserInterface>,
}

impl ShellExecutor {
    pub fn new(ui: Arc<dyn UserInterface>) -> Self {
        Self { ui }
    }
}

#[async_trait]
impl Shell for ShellExecutor {
    async fn run(&self, spec: &CommandSpec) -> CommandResult {
        debug!("Running: {}", spec.command_line());

        let progress = self.ui.start_step(&spec.label);
        let result = run_captured(&spec.program, &spec.args).await;

        if result.success {
            progress.finish_success(&spec.success_label);
        } else {
            progress.finish_failure();
        }

        if spec.show_output {
            self.ui.print_output(&result.stdout, &result.stderr);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingUi;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_run_captured_collects_stdout_in_order() {
        let result = run_captured("sh", &sh("echo first; echo second; echo third")).await;

        assert!(result.success);
        assert_eq!(result.stdout, vec!["first", "second", "third"]);
        assert_eq!(result.joined_output(), "first second third");
    }

    #[tokio::test]
    async fn test_run_captured_separates_stderr() {
        let result = run_captured("sh", &sh("echo out; echo err >&2")).await;

        assert!(result.success);
        assert_eq!(result.stdout, vec!["out"]);
        assert_eq!(result.stderr, vec!["err"]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure_regardless_of_code() {
        for code in [1, 2, 127] {
            let result = run_captured("sh", &sh(&format!("exit {}", code))).await;
            assert!(!result.success, "exit code {}", code);
        }
    }

    #[tokio::test]
    async fn test_spawn_error_is_failure() {
        let result = run_captured("p4ectl-definitely-not-a-command", &[]).await;

        assert!(!result.success);
        assert!(result.stdout.is_empty());
        assert!(result.stderr[0].contains("failed to spawn"));
    }

    #[tokio::test]
    async fn test_executor_reports_success_label() {
        let ui = Arc::new(RecordingUi::new());
        let shell = ShellExecutor::new(ui.clone());

        let spec = CommandSpec::new("echo")
            .arg("hello")
            .label("Saying hello")
            .success("said");
        let result = shell.run(&spec).await;

        assert!(result.success);
        assert_eq!(ui.lines(), vec!["Saying hello ...said"]);
    }

    #[tokio::test]
    async fn test_executor_reports_failure_and_echoes_output() {
        let ui = Arc::new(RecordingUi::new());
        let shell = ShellExecutor::new(ui.clone());

        let spec = CommandSpec::new("sh")
            .args(sh("echo partial; echo broken >&2; exit 3"))
            .label("Breaking")
            .show_output(true);
        let result = shell.run(&spec).await;

        assert!(!result.success);
        assert_eq!(
            ui.lines(),
            vec!["Breaking ...failed", "    partial", "    ! broken"]
        );
    }

    #[tokio::test]
    async fn test_executor_hides_output_by_default() {
        let ui = Arc::new(RecordingUi::new());
        let shell = ShellExecutor::new(ui.clone());

        shell.run(&CommandSpec::new("echo").arg("quiet")).await;

        assert_eq!(ui.lines(), vec!["Running echo ...done"]);
    }

    #[test]
    fn test_command_line() {
        let spec = CommandSpec::new("helm").args(["list", "-q", "-l", "name=voe"]);
        assert_eq!(spec.command_line(), "helm list -q -l name=voe");
    }
}
