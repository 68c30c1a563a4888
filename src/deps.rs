//! Collaborators shared by every installer step
//!
//! The shell, prompter and UI sit behind traits so the orchestration can be
//! exercised without touching a real cluster.

use std::sync::Arc;

use console::Term;

use crate::error::InstallError;
use crate::tools::PlatformKind;
use crate::ui::{LinePrompter, Prompter, TermPrompter, TerminalUi, UserInterface};
use crate::utils::{Shell, ShellExecutor};

/// External collaborators of the installer
#[derive(Clone)]
pub struct Dependencies {
    pub shell: Arc<dyn Shell>,
    pub prompter: Arc<dyn Prompter>,
    pub ui: Arc<dyn UserInterface>,
    pub platform: PlatformKind,
}

impl Dependencies {
    /// Real processes, stdin prompts and terminal output on the host platform
    pub fn production() -> Self {
        let ui: Arc<dyn UserInterface> = Arc::new(TerminalUi::new());
        let prompter: Arc<dyn Prompter> = if TermPrompter::is_available() {
            Arc::new(TermPrompter::new(Term::stderr()))
        } else {
            Arc::new(LinePrompter::stdio())
        };

        Self {
            shell: Arc::new(ShellExecutor::new(ui.clone())),
            prompter,
            ui,
            platform: PlatformKind::detect(),
        }
    }

    /// Ask a yes/no question on the blocking pool
    pub async fn confirm(&self, message: String) -> Result<bool, InstallError> {
        let prompter = self.prompter.clone();
        join_prompt(tokio::task::spawn_blocking(move || prompter.confirm(&message))).await
    }

    /// Ask for one of `choices` on the blocking pool
    pub async fn choose(&self, message: &str, choices: &[&str]) -> Result<usize, InstallError> {
        let prompter = self.prompter.clone();
        let message = message.to_string();
        let choices: Vec<String> = choices.iter().map(|c| c.to_string()).collect();

        join_prompt(tokio::task::spawn_blocking(move || {
            let choices: Vec<&str> = choices.iter().map(String::as_str).collect();
            prompter.choose(&message, &choices)
        }))
        .await
    }
}

async fn join_prompt<T>(
    handle: tokio::task::JoinHandle<Result<T, InstallError>>,
) -> Result<T, InstallError> {
    match handle.await {
        Ok(answer) => answer,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(_) => Err(InstallError::PromptClosed),
    }
}
