/// Presence checks and automatic installation of kubectl, kind and helm
pub mod platform;

use tracing::{debug, info};

use crate::config::ToolVersions;
use crate::deps::Dependencies;
use crate::error::InstallError;
use crate::utils::CommandSpec;

pub use platform::{install_plan, PlatformKind};

/// External tools the installer depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Kubectl,
    Kind,
    Helm,
}

impl Tool {
    /// Executable name
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Kubectl => "kubectl",
            Tool::Kind => "kind",
            Tool::Helm => "helm",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Tool::Kubectl => "kubectl",
            Tool::Kind => "Kind",
            Tool::Helm => "Helm",
        }
    }

    /// Arguments of the presence probe
    pub fn probe_args(&self) -> &'static [&'static str] {
        match self {
            Tool::Kubectl => &["version", "--client"],
            Tool::Kind | Tool::Helm => &["version"],
        }
    }

    /// Where to read about installing the tool by hand
    pub fn install_hint(&self) -> &'static str {
        match self {
            Tool::Kubectl => "https://kubernetes.io/docs/tasks/tools/",
            Tool::Kind => "https://kind.sigs.k8s.io/docs/user/quick-start/#installation",
            Tool::Helm => "https://helm.sh/docs/intro/install/",
        }
    }

    /// Whether the installer may download the tool itself
    pub fn auto_installable(&self) -> bool {
        !matches!(self, Tool::Helm)
    }

    pub(crate) fn missing(&self) -> InstallError {
        InstallError::ToolMissing {
            tool: self.display_name().to_string(),
            hint: self.install_hint().to_string(),
        }
    }

    fn probe(&self) -> CommandSpec {
        CommandSpec::new(self.name())
            .args(self.probe_args().iter().copied())
            .label(format!("Checking {}", self.display_name()))
            .success("found")
    }
}

/// Resolves missing tools, offering to install them
pub struct ToolResolver<'a> {
    deps: &'a Dependencies,
    versions: &'a ToolVersions,
}

impl<'a> ToolResolver<'a> {
    pub fn new(deps: &'a Dependencies, versions: &'a ToolVersions) -> Self {
        Self { deps, versions }
    }

    /// Make sure kubectl is available, offering to install it
    pub async fn ensure_kubectl(&self) -> Result<(), InstallError> {
        self.ensure(Tool::Kubectl).await
    }

    /// Make sure kind is available, offering to install it
    pub async fn ensure_kind(&self) -> Result<(), InstallError> {
        self.ensure(Tool::Kind).await
    }

    /// Make sure helm is available; never installs it
    pub async fn ensure_helm(&self) -> Result<(), InstallError> {
        self.ensure(Tool::Helm).await
    }

    /// Check whether `tool` answers its version probe
    pub async fn is_present(&self, tool: Tool) -> bool {
        self.deps.shell.run(&tool.probe()).await.success
    }

    async fn ensure(&self, tool: Tool) -> Result<(), InstallError> {
        if self.is_present(tool).await {
            debug!("{} is present", tool.name());
            return Ok(());
        }

        if !tool.auto_installable() {
            return Err(tool.missing());
        }

        let question = format!(
            "{} is not found. Do you want to install it? [Yes/No]",
            tool.name()
        );
        if !self.deps.confirm(question).await? {
            return Err(tool.missing());
        }

        self.install(tool).await
    }

    /// Run the install plan for `tool` on the host platform
    pub async fn install(&self, tool: Tool) -> Result<(), InstallError> {
        let steps = install_plan(tool, &self.deps.platform, self.versions)?;
        info!(
            "Installing {} on {} in {} step(s)",
            tool.name(),
            self.deps.platform,
            steps.len()
        );

        for step in &steps {
            let result = self.deps.shell.run(&step.command()).await;
            if !result.success {
                return Err(InstallError::ToolInstallFailed {
                    tool: tool.display_name().to_string(),
                    step: step.label.clone(),
                });
            }
        }

        Ok(())
    }
}
