/// Configuration management for p4ectl
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default P4E portal chart version
pub const DEFAULT_PORTAL_VERSION: &str = "0.36.8-amd64";

/// Default Symphony API chart version
pub const DEFAULT_SYMPHONY_VERSION: &str = "0.1.57";

/// Main installer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Echo command output and report existing deployments
    pub verbose: bool,

    /// Name of the kind cluster created when no cluster is reachable
    pub cluster_name: String,

    /// Manifest applied to install cert-manager
    pub cert_manager_manifest: String,

    /// Versions used when installing missing tools
    pub tools: ToolVersions,

    /// P4E API (Symphony) chart
    pub api: ChartConfig,

    /// P4E portal chart
    pub portal: ChartConfig,

    /// Service address polling
    pub address: AddressConfig,
}

/// Versions of the tools downloaded by the installer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolVersions {
    /// kubectl release (e.g., "v1.24.0")
    pub kubectl: String,

    /// kind release (e.g., "v0.14.0")
    pub kind: String,
}

/// Helm chart configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Release name, also used as the `name=` label when listing releases
    pub release: String,

    /// Chart reference (e.g., "oci://registry/helm/chart")
    pub chart: String,

    /// Chart version
    pub version: String,

    /// Values passed with `--set`
    #[serde(default)]
    pub set_values: Vec<String>,
}

/// Load balancer address polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressConfig {
    /// Service exposing the API
    pub service: String,

    /// Give up after this many seconds
    pub timeout_secs: u64,

    /// First wait between polls
    pub initial_interval_ms: u64,

    /// Upper bound for the wait between polls
    pub max_interval_ms: u64,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            cluster_name: "p4e-kind".to_string(),
            cert_manager_manifest:
                "https://github.com/jetstack/cert-manager/releases/download/v1.4.0/cert-manager.yaml"
                    .to_string(),
            tools: ToolVersions::default(),
            api: ChartConfig {
                release: "symphony".to_string(),
                chart: "oci://p4etest.azurecr.io/helm/symphony".to_string(),
                version: DEFAULT_SYMPHONY_VERSION.to_string(),
                set_values: vec!["CUSTOM_VISION_KEY=dummy".to_string()],
            },
            portal: ChartConfig {
                release: "voe".to_string(),
                chart: "oci://p4etest.azurecr.io/helm/voe".to_string(),
                version: DEFAULT_PORTAL_VERSION.to_string(),
                set_values: vec![],
            },
            address: AddressConfig::default(),
        }
    }
}

impl Default for ToolVersions {
    fn default() -> Self {
        Self {
            kubectl: "v1.24.0".to_string(),
            kind: "v0.14.0".to_string(),
        }
    }
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            service: "symphony-service-ext".to_string(),
            timeout_secs: 600,
            initial_interval_ms: 1_000,
            max_interval_ms: 10_000,
        }
    }
}

impl AddressConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }
}

/// Values given on the command line, overriding the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub portal_version: Option<String>,
    pub symphony_version: Option<String>,
    pub verbose: bool,
}

impl InstallerConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: InstallerConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise start from defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command line overrides
    pub fn with_overrides(mut self, overrides: Overrides) -> anyhow::Result<Self> {
        if let Some(version) = overrides.portal_version {
            self.portal.version = version;
        }
        if let Some(version) = overrides.symphony_version {
            self.api.version = version;
        }
        self.verbose |= overrides.verbose;
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cluster_name.is_empty() {
            anyhow::bail!("cluster_name cannot be empty");
        }

        url::Url::parse(&self.cert_manager_manifest).map_err(|e| {
            anyhow::anyhow!(
                "Invalid cert_manager_manifest URL {}: {}",
                self.cert_manager_manifest,
                e
            )
        })?;

        if self.tools.kubectl.is_empty() || self.tools.kind.is_empty() {
            anyhow::bail!("tool versions cannot be empty");
        }

        for (name, chart) in [("api", &self.api), ("portal", &self.portal)] {
            if chart.release.is_empty() || chart.chart.is_empty() {
                anyhow::bail!("{} chart needs a release name and a chart reference", name);
            }
            if chart.version.is_empty() {
                anyhow::bail!("{} chart version cannot be empty", name);
            }
        }

        if self.address.service.is_empty() {
            anyhow::bail!("address.service cannot be empty");
        }
        if self.address.timeout_secs == 0 {
            anyhow::bail!("address.timeout_secs must be greater than zero");
        }
        if self.address.initial_interval_ms == 0 {
            anyhow::bail!("address.initial_interval_ms must be greater than zero");
        }

        Ok(())
    }

    /// Generate an example configuration file
    pub fn example() -> Self {
        Self::default()
    }
}
