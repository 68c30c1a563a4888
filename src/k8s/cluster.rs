/// Cluster connectivity and local cluster creation
use tracing::{debug, info};

use crate::config::InstallerConfig;
use crate::deps::Dependencies;
use crate::error::InstallError;
use crate::tools::ToolResolver;
use crate::utils::CommandSpec;

/// Remediations offered when no cluster is reachable, in menu order
pub const REMEDIATIONS: [&str; 2] = [
    "Install a local cluster (Kind)",
    "Connect to a remote cluster (AKS)",
];

const LOCAL_CLUSTER: usize = 0;
const REMOTE_CLUSTER: usize = 1;

/// Makes sure kubectl talks to a cluster
pub struct ClusterManager<'a> {
    deps: &'a Dependencies,
    config: &'a InstallerConfig,
}

impl<'a> ClusterManager<'a> {
    pub fn new(deps: &'a Dependencies, config: &'a InstallerConfig) -> Self {
        Self { deps, config }
    }

    /// Check the current context and offer a remedy when it is unreachable
    pub async fn ensure_reachable(&self) -> Result<(), InstallError> {
        let probe = CommandSpec::new("kubectl")
            .args(["get", "nodes"])
            .label("Checking Kubernetes connection")
            .success("OK");

        if self.deps.shell.run(&probe).await.success {
            return self.setup_connection();
        }

        let choice = self
            .deps
            .choose(
                "kubectl is not connected to a Kubernetes cluster, what do you want to do?",
                &REMEDIATIONS,
            )
            .await?;

        match choice {
            LOCAL_CLUSTER => {
                ToolResolver::new(self.deps, &self.config.tools)
                    .ensure_kind()
                    .await?;
                self.create_kind_cluster().await
            }
            REMOTE_CLUSTER => {
                info!("Expecting the kubectl context to be configured for a remote cluster");
                Ok(())
            }
            _ => Err(InstallError::ConnectionUnavailable),
        }
    }

    /// Prepare an already reachable cluster; nothing to do yet
    fn setup_connection(&self) -> Result<(), InstallError> {
        debug!("Using the current kubectl context");
        Ok(())
    }

    /// Create the local kind cluster
    pub async fn create_kind_cluster(&self) -> Result<(), InstallError> {
        let label = "Creating Kubernetes cluster";
        let spec = CommandSpec::new("kind")
            .args(["create", "cluster", "--name", self.config.cluster_name.as_str()])
            .label(label);

        if self.deps.shell.run(&spec).await.success {
            info!("Created kind cluster {}", self.config.cluster_name);
            Ok(())
        } else {
            Err(InstallError::command_failed(label))
        }
    }
}
