/// Host platform detection and per-platform install plans
use std::fmt;

use crate::config::ToolVersions;
use crate::error::InstallError;
use crate::utils::CommandSpec;

use super::Tool;

/// Host operating system family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformKind {
    Windows,
    Darwin,
    Linux,
    Unknown(String),
}

impl PlatformKind {
    /// Platform of the running host
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS name (`std::env::consts::OS` or Go-style) to a platform
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => PlatformKind::Windows,
            "macos" | "darwin" => PlatformKind::Darwin,
            "linux" => PlatformKind::Linux,
            other => PlatformKind::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Windows => write!(f, "windows"),
            PlatformKind::Darwin => write!(f, "darwin"),
            PlatformKind::Linux => write!(f, "linux"),
            PlatformKind::Unknown(os) => write!(f, "{}", os),
        }
    }
}

/// One command of an install plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStep {
    pub label: String,
    pub program: &'static str,
    pub args: Vec<String>,
}

impl InstallStep {
    fn new<const N: usize>(label: &str, program: &'static str, args: [&str; N]) -> Self {
        Self {
            label: label.to_string(),
            program,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Command spec that runs this step
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(self.program)
            .args(self.args.iter().cloned())
            .label(self.label.clone())
    }
}

/// Ordered install steps for `tool` on `platform`
pub fn install_plan(
    tool: Tool,
    platform: &PlatformKind,
    versions: &ToolVersions,
) -> Result<Vec<InstallStep>, InstallError> {
    let unsupported = || InstallError::UnrecognizedPlatform {
        tool: tool.name().to_string(),
        platform: platform.to_string(),
    };

    match tool {
        Tool::Kubectl => kubectl_plan(platform, &versions.kubectl).ok_or_else(unsupported),
        Tool::Kind => kind_plan(platform, &versions.kind).ok_or_else(unsupported),
        Tool::Helm => Err(tool.missing()),
    }
}

fn kubectl_plan(platform: &PlatformKind, version: &str) -> Option<Vec<InstallStep>> {
    let url = |os: &str, file: &str| {
        format!(
            "https://dl.k8s.io/release/{}/bin/{}/amd64/{}",
            version, os, file
        )
    };

    let plan = match platform {
        PlatformKind::Windows => vec![InstallStep::new(
            "Downloading kubectl",
            "curl",
            ["-LO", &url("windows", "kubectl.exe")],
        )],
        PlatformKind::Darwin => vec![
            InstallStep::new(
                "Downloading kubectl",
                "curl",
                ["-LO", &url("darwin", "kubectl")],
            ),
            InstallStep::new("Updating kubectl access", "chmod", ["+x", "./kubectl"]),
            InstallStep::new(
                "Moving kubectl",
                "sudo",
                ["mv", "./kubectl", "/usr/local/bin/kubectl"],
            ),
            InstallStep::new(
                "Updating kubectl access",
                "sudo",
                ["chown", "root:", "/usr/local/bin/kubectl"],
            ),
        ],
        PlatformKind::Linux => vec![
            InstallStep::new(
                "Downloading kubectl",
                "curl",
                ["-LO", &url("linux", "kubectl")],
            ),
            InstallStep::new(
                "Installing kubectl",
                "sudo",
                [
                    "install",
                    "-o",
                    "root",
                    "-g",
                    "root",
                    "-m",
                    "0755",
                    "kubectl",
                    "/usr/local/bin/kubectl",
                ],
            ),
        ],
        PlatformKind::Unknown(_) => return None,
    };

    Some(plan)
}

fn kind_plan(platform: &PlatformKind, version: &str) -> Option<Vec<InstallStep>> {
    let url = |os: &str| format!("https://kind.sigs.k8s.io/dl/{}/kind-{}-amd64", version, os);

    let plan = match platform {
        PlatformKind::Windows => vec![
            InstallStep::new(
                "Downloading Kind",
                "curl",
                ["-Lo", "kind-windows-amd64.exe", &url("windows")],
            ),
            InstallStep::new("Moving Kind", "mv", ["kind-windows-amd64.exe", "kind.exe"]),
        ],
        PlatformKind::Darwin | PlatformKind::Linux => vec![
            InstallStep::new(
                "Downloading Kind",
                "curl",
                ["-Lo", "./kind", &url(&platform.to_string())],
            ),
            InstallStep::new("Updating Kind access", "chmod", ["+x", "./kind"]),
            InstallStep::new("Moving Kind", "sudo", ["mv", "./kind", "/usr/local/bin/kind"]),
        ],
        PlatformKind::Unknown(_) => return None,
    };

    Some(plan)
}
