/// Terminal output: step spinners, echoed command output and banners
pub mod prompt;

use std::io::IsTerminal;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::installer::AccessSummary;

pub use prompt::{LinePrompter, Prompter, TermPrompter};

/// Spinner rotation, followed by the blank frame shown once finished
pub const SPINNER_GLYPHS: [&str; 9] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷", ""];

/// Redraw interval of the spinner
pub const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Output surface used by the shell executor and the commands
pub trait UserInterface: Send + Sync {
    /// Start the status line for a running step
    fn start_step(&self, label: &str) -> Box<dyn StepProgress>;

    /// Echo captured command output, stderr after stdout
    fn print_output(&self, stdout: &[String], stderr: &[String]);

    /// Print a one-line failure message
    fn print_failure(&self, message: &str);

    /// Print a one-line warning
    fn print_warning(&self, message: &str);

    /// Print the program banner
    fn print_banner(&self);

    /// Print the final access summary
    fn print_summary(&self, summary: &AccessSummary);
}

/// Status line of one running step
pub trait StepProgress: Send {
    /// Replace the spinner with `label ...<success_label>`
    fn finish_success(self: Box<Self>, success_label: &str);

    /// Replace the spinner with `label ...failed`
    fn finish_failure(self: Box<Self>);
}

/// Production UI writing to stdout
pub struct TerminalUi {
    animate: bool,
}

impl TerminalUi {
    /// Create a terminal UI, animating only when stdout is a terminal
    pub fn new() -> Self {
        Self {
            animate: std::io::stdout().is_terminal(),
        }
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInterface for TerminalUi {
    fn start_step(&self, label: &str) -> Box<dyn StepProgress> {
        let spinner = self.animate.then(|| {
            let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
            pb.set_style(
                ProgressStyle::with_template("  {msg} {spinner:.yellow}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&SPINNER_GLYPHS),
            );
            pb.set_message(label.to_string());
            pb.enable_steady_tick(SPINNER_INTERVAL);
            pb
        });

        Box::new(TerminalStep {
            label: label.to_string(),
            spinner,
        })
    }

    fn print_output(&self, stdout: &[String], stderr: &[String]) {
        for line in stdout {
            println!("    {}", line);
        }
        for line in stderr {
            println!("    {}", style(line).red());
        }
    }

    fn print_failure(&self, message: &str) {
        println!("\n  {}\n", style(message).red());
    }

    fn print_warning(&self, message: &str) {
        println!("\n  {}\n", style(message).yellow());
    }

    fn print_banner(&self) {
        println!("\n\tP 4 E C T L\n");
    }

    fn print_summary(&self, summary: &AccessSummary) {
        println!("\n  {}\n", style("Done!").cyan());
        for (name, value) in summary.entries() {
            println!(
                "  {} {}",
                style(format!("{}:", name)).green(),
                style(value).white()
            );
        }
        println!();
    }
}

struct TerminalStep {
    label: String,
    spinner: Option<ProgressBar>,
}

impl TerminalStep {
    fn finish(self, status: String) {
        // Stops the ticker before the final line is written
        if let Some(pb) = self.spinner {
            pb.finish_and_clear();
        }
        println!("  {} {}", self.label, status);
    }
}

impl StepProgress for TerminalStep {
    fn finish_success(self: Box<Self>, success_label: &str) {
        let status = style(format!("...{}", success_label)).green().to_string();
        self.finish(status);
    }

    fn finish_failure(self: Box<Self>) {
        let status = style("...failed").yellow().to_string();
        self.finish(status);
    }
}
