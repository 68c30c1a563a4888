//! Top-level install sequence
//!
//! Steps run strictly in order and the first failure aborts the run. Nothing
//! applied by earlier steps is rolled back.

use std::fmt;

use tracing::{debug, info_span, Instrument};

use crate::config::InstallerConfig;
use crate::deps::Dependencies;
use crate::error::InstallError;
use crate::helm::{ChartRelease, HelmManager};
use crate::k8s::{ClusterManager, ResourceManager};
use crate::tools::ToolResolver;
use crate::utils::CommandSpec;

const API_DISPLAY: &str = "P4E API (Symphony)";
const PORTAL_DISPLAY: &str = "P4E portal";

/// Checklist of the `up` sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    KubectlPresent,
    ClusterReachable,
    CertManagerInstalled,
    HelmPresent,
    ApiInstalled,
    PortalInstalled,
    SampleDeployed,
    AddressResolved,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::KubectlPresent,
        Step::ClusterReachable,
        Step::CertManagerInstalled,
        Step::HelmPresent,
        Step::ApiInstalled,
        Step::PortalInstalled,
        Step::SampleDeployed,
        Step::AddressResolved,
    ];
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::KubectlPresent => "kubectl-present",
            Step::ClusterReachable => "cluster-reachable",
            Step::CertManagerInstalled => "cert-manager-installed",
            Step::HelmPresent => "helm-present",
            Step::ApiInstalled => "api-component-installed",
            Step::PortalInstalled => "portal-component-installed",
            Step::SampleDeployed => "sample-deployed",
            Step::AddressResolved => "address-resolved",
        };
        f.write_str(name)
    }
}

/// Addresses printed once the stack is up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessSummary {
    pub portal: Option<String>,
    pub api: String,
    pub sample_app: Option<String>,
}

impl AccessSummary {
    /// Summary for the API reachable on `address`
    pub fn for_api_address(address: &str) -> Self {
        Self {
            portal: None,
            api: format!("http://{}:8080/v1alpha2/greetings", address),
            sample_app: None,
        }
    }

    /// Labelled rows of the banner; unknown addresses read `UNKNOWN`
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let or_unknown = |value: &Option<String>| {
            value.clone().unwrap_or_else(|| "UNKNOWN".to_string())
        };
        vec![
            ("P4E portal", or_unknown(&self.portal)),
            ("Symphony API", self.api.clone()),
            ("Sample app", or_unknown(&self.sample_app)),
        ]
    }
}

/// Runs the install and removal sequences
pub struct Installer {
    deps: Dependencies,
    config: InstallerConfig,
}

impl Installer {
    pub fn new(deps: Dependencies, config: InstallerConfig) -> Self {
        Self { deps, config }
    }

    fn api(&self) -> ChartRelease<'_> {
        ChartRelease {
            display: API_DISPLAY,
            chart: &self.config.api,
        }
    }

    fn portal(&self) -> ChartRelease<'_> {
        ChartRelease {
            display: PORTAL_DISPLAY,
            chart: &self.config.portal,
        }
    }

    /// Bring the whole stack up and return where to reach it
    pub async fn up(&self) -> Result<AccessSummary, InstallError> {
        let mut address = None;

        for step in Step::ALL {
            let span = info_span!("step", %step);
            if let Some(ip) = self.run_step(step).instrument(span).await? {
                address = Some(ip);
            }
            debug!("{} passed", step);
        }

        let address =
            address.ok_or_else(|| InstallError::command_failed("Checking Symphony address"))?;
        Ok(AccessSummary::for_api_address(&address))
    }

    async fn run_step(&self, step: Step) -> Result<Option<String>, InstallError> {
        let deps = &self.deps;
        let verbose = self.config.verbose;
        let tools = ToolResolver::new(deps, &self.config.tools);
        let resources = ResourceManager::new(deps, verbose);
        let helm = HelmManager::new(deps, verbose);

        match step {
            Step::KubectlPresent => tools.ensure_kubectl().await?,
            Step::ClusterReachable => {
                ClusterManager::new(deps, &self.config)
                    .ensure_reachable()
                    .await?
            }
            Step::CertManagerInstalled => {
                resources
                    .apply_manifest("Installing cert manager", &self.config.cert_manager_manifest)
                    .await?
            }
            Step::HelmPresent => tools.ensure_helm().await?,
            Step::ApiInstalled => {
                helm.ensure_release(&self.api()).await?;
            }
            Step::PortalInstalled => {
                helm.ensure_release(&self.portal()).await?;
            }
            Step::SampleDeployed => self.deploy_sample().await?,
            Step::AddressResolved => {
                let ip = resources
                    .wait_for_service_address("Checking Symphony address", &self.config.address)
                    .await?;
                return Ok(Some(ip));
            }
        }

        Ok(None)
    }

    /// Placeholder for deploying the sample solution
    async fn deploy_sample(&self) -> Result<(), InstallError> {
        let label = "Deploying sample solution";
        let spec = CommandSpec::new("ls")
            .label(label)
            .show_output(self.config.verbose);

        if self.deps.shell.run(&spec).await.success {
            Ok(())
        } else {
            Err(InstallError::command_failed(label))
        }
    }

    /// Uninstall the portal and API releases
    pub async fn remove(&self) -> Result<usize, InstallError> {
        ToolResolver::new(&self.deps, &self.config.tools)
            .ensure_helm()
            .await?;

        let helm = HelmManager::new(&self.deps, self.config.verbose);
        let mut removed = 0;
        for release in [self.portal(), self.api()] {
            if helm.remove_release(&release).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
