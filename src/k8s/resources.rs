/// Generic Kubernetes resource operations
use tracing::info;

use crate::config::AddressConfig;
use crate::deps::Dependencies;
use crate::error::InstallError;
use crate::utils::{CommandSpec, PollingConfig};

/// Generic Kubernetes resource management
pub struct ResourceManager<'a> {
    deps: &'a Dependencies,
    verbose: bool,
}

impl<'a> ResourceManager<'a> {
    pub fn new(deps: &'a Dependencies, verbose: bool) -> Self {
        Self { deps, verbose }
    }

    /// Apply a Kubernetes manifest by path or URL
    pub async fn apply_manifest(&self, label: &str, manifest: &str) -> Result<(), InstallError> {
        info!("Applying Kubernetes manifest: {}", manifest);

        let spec = CommandSpec::new("kubectl")
            .args(["apply", "-f", manifest])
            .label(label)
            .show_output(self.verbose);

        if self.deps.shell.run(&spec).await.success {
            Ok(())
        } else {
            Err(InstallError::command_failed(label))
        }
    }

    /// Read the first load balancer ingress IP of `service`, if assigned yet
    pub async fn service_ingress_ip(
        &self,
        label: &str,
        service: &str,
    ) -> Result<Option<String>, InstallError> {
        let spec = CommandSpec::new("kubectl")
            .args([
                "get",
                "svc",
                service,
                "-o",
                "jsonpath={.status.loadBalancer.ingress[0].ip}",
            ])
            .label(label)
            .success("OK")
            .show_output(self.verbose);

        let result = self.deps.shell.run(&spec).await;
        if !result.success {
            return Err(InstallError::command_failed(label));
        }

        let address = result.joined_output().trim().to_string();
        Ok((!address.is_empty()).then_some(address))
    }

    /// Poll until the service has an external address
    pub async fn wait_for_service_address(
        &self,
        label: &str,
        address: &AddressConfig,
    ) -> Result<String, InstallError> {
        let polling = PollingConfig::new(
            address.timeout(),
            address.initial_interval(),
            address.max_interval(),
            format!("Waiting for an external address on {}", address.service),
        );

        let ip = polling
            .poll(|| self.service_ingress_ip(label, &address.service))
            .await?;

        info!("{} is reachable at {}", address.service, ip);
        Ok(ip)
    }
}
