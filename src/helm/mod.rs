/// Helm release installation and removal
use tracing::{debug, info};

use crate::config::ChartConfig;
use crate::deps::Dependencies;
use crate::error::InstallError;
use crate::utils::CommandSpec;

/// A chart installed as one named component
#[derive(Debug, Clone, Copy)]
pub struct ChartRelease<'a> {
    /// Human readable component name used in status lines
    pub display: &'a str,
    pub chart: &'a ChartConfig,
}

/// What `ensure_release` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Installed,
    AlreadyPresent,
}

/// Helm release manager
pub struct HelmManager<'a> {
    deps: &'a Dependencies,
    verbose: bool,
}

impl<'a> HelmManager<'a> {
    pub fn new(deps: &'a Dependencies, verbose: bool) -> Self {
        Self { deps, verbose }
    }

    /// Check whether a release labelled with the release name exists
    ///
    /// A failing `helm list` counts as "not installed".
    pub async fn is_installed(&self, release: &ChartRelease<'_>) -> bool {
        let name = &release.chart.release;
        let spec = CommandSpec::new("helm")
            .args(["list", "-q", "-l"])
            .arg(format!("name={}", name))
            .label(format!("Checking {}", release.display))
            .show_output(self.verbose);

        let result = self.deps.shell.run(&spec).await;
        let installed = result.joined_output() == *name;
        debug!("helm release {} installed: {}", name, installed);
        installed
    }

    /// Install the chart unless a release already exists
    pub async fn ensure_release(
        &self,
        release: &ChartRelease<'_>,
    ) -> Result<ReleaseOutcome, InstallError> {
        if self.is_installed(release).await {
            if self.verbose {
                self.deps.ui.print_warning(&format!(
                    "WARNING: existing {} deployment is found. To install new version, use p4ectl remove to remove it first.",
                    release.display
                ));
            }
            return Ok(ReleaseOutcome::AlreadyPresent);
        }

        self.install(release).await?;
        Ok(ReleaseOutcome::Installed)
    }

    /// Run `helm install` for the chart
    pub async fn install(&self, release: &ChartRelease<'_>) -> Result<(), InstallError> {
        let chart = release.chart;
        info!(
            "Installing {} from {} version {}",
            chart.release, chart.chart, chart.version
        );

        let label = format!("Deploying {}", release.display);
        let mut spec = CommandSpec::new("helm")
            .args([
                "install",
                chart.release.as_str(),
                chart.chart.as_str(),
                "--version",
                chart.version.as_str(),
            ])
            .label(label.clone())
            .show_output(self.verbose);
        for value in &chart.set_values {
            spec = spec.args(["--set", value.as_str()]);
        }

        if self.deps.shell.run(&spec).await.success {
            Ok(())
        } else {
            Err(InstallError::command_failed(label))
        }
    }

    /// Uninstall the release if it exists; returns whether anything was removed
    pub async fn remove_release(&self, release: &ChartRelease<'_>) -> Result<bool, InstallError> {
        if !self.is_installed(release).await {
            info!("{} is not installed, skipping", release.chart.release);
            return Ok(false);
        }

        let label = format!("Removing {}", release.display);
        let spec = CommandSpec::new("helm")
            .args(["uninstall", release.chart.release.as_str()])
            .label(label.clone())
            .show_output(self.verbose);

        if self.deps.shell.run(&spec).await.success {
            Ok(true)
        } else {
            Err(InstallError::command_failed(label))
        }
    }
}
