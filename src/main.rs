/// p4ectl - Percept for OSS installer
///
/// Bootstraps the P4E stack onto a Kubernetes cluster: checks or installs
/// kubectl and kind, checks helm, then installs the P4E charts.
mod config;
mod deps;
mod error;
mod helm;
mod installer;
mod k8s;
#[cfg(test)]
mod test_helpers;
mod tools;
mod ui;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{InstallerConfig, Overrides};
use crate::deps::Dependencies;
use crate::error::InstallError;
use crate::installer::Installer;
use crate::ui::{TerminalUi, UserInterface};

#[derive(Parser)]
#[command(name = "p4ectl")]
#[command(about = "Install P4E on a Kubernetes cluster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install P4E on a Kubernetes cluster
    Up {
        /// P4E portal version
        #[arg(short = 'p', long)]
        portal_version: Option<String>,

        /// Symphony API version
        #[arg(short = 's', long)]
        symphony_version: Option<String>,

        /// Detailed outputs
        #[arg(long)]
        verbose: bool,
    },

    /// Remove the P4E portal and API releases
    Remove {
        /// Detailed outputs
        #[arg(long)]
        verbose: bool,
    },

    /// Generate example configuration file
    Init,
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Up { verbose, .. } | Commands::Remove { verbose } => *verbose,
            Commands::Init => false,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.command.as_ref().is_some_and(Commands::verbose) {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("p4ectl={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(code);
}

/// Dispatch the command; configuration errors surface as `Err`
async fn run(cli: Cli) -> Result<i32> {
    let Some(command) = cli.command else {
        TerminalUi::new().print_banner();
        return Ok(0);
    };

    match command {
        Commands::Init => {
            let path = cli.config.unwrap_or_else(|| PathBuf::from("p4ectl.yaml"));
            init_config(&path).await?;
            Ok(0)
        }
        Commands::Up {
            portal_version,
            symphony_version,
            verbose,
        } => {
            let config = load_config(
                cli.config.as_deref(),
                Overrides {
                    portal_version,
                    symphony_version,
                    verbose,
                },
            )?;
            Ok(up(Dependencies::production(), config).await)
        }
        Commands::Remove { verbose } => {
            let config = load_config(
                cli.config.as_deref(),
                Overrides {
                    verbose,
                    ..Overrides::default()
                },
            )?;
            Ok(remove(Dependencies::production(), config).await)
        }
    }
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<InstallerConfig> {
    InstallerConfig::load(path)
        .and_then(|config| config.with_overrides(overrides))
        .context("Failed to load configuration")
}

/// Install the stack and print the access summary; returns the exit code
async fn up(deps: Dependencies, config: InstallerConfig) -> i32 {
    debug!(
        "Installing API {} and portal {}",
        config.api.version, config.portal.version
    );

    let ui = deps.ui.clone();
    match Installer::new(deps, config).up().await {
        Ok(summary) => {
            ui.print_summary(&summary);
            0
        }
        Err(e) => report(ui.as_ref(), e),
    }
}

/// Remove the P4E releases; returns the exit code
async fn remove(deps: Dependencies, config: InstallerConfig) -> i32 {
    let ui = deps.ui.clone();
    match Installer::new(deps, config).remove().await {
        Ok(removed) => {
            info!("Removed {} release(s)", removed);
            0
        }
        Err(e) => report(ui.as_ref(), e),
    }
}

fn report(ui: &dyn UserInterface, error: InstallError) -> i32 {
    ui.print_failure(&error.to_string());
    error.exit_code()
}

/// Initialize example configuration file
async fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Configuration file already exists: {}", path.display());
    }

    let yaml = serde_yaml::to_string(&InstallerConfig::example())?;

    tokio::fs::write(path, yaml)
        .await
        .context("Failed to write configuration file")?;

    println!("Example configuration created: {}", path.display());
    println!("Run `p4ectl up --config {}` to use it.", path.display());

    Ok(())
}
