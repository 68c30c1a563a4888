/// Error taxonomy for installer operations
use thiserror::Error;

/// Errors that abort an orchestration run
#[derive(Debug, Error)]
pub enum InstallError {
    /// A required external tool is absent
    #[error("{tool} is not found. Please install {tool} first. See: {hint}")]
    ToolMissing { tool: String, hint: String },

    /// One step of an automatic tool installation failed
    #[error("Failed to install {tool}: {step} failed")]
    ToolInstallFailed { tool: String, step: String },

    /// No reachable cluster and no remediation was chosen
    #[error("Can't connect to a Kubernetes cluster. Please configure your kubectl context to a valid Kubernetes cluster.")]
    ConnectionUnavailable,

    /// A shelled-out command exited non-zero or could not be spawned
    #[error("{step} failed")]
    CommandFailed { step: String },

    /// The host OS has no install plan
    #[error("Doesn't know how to install {tool} on {platform}")]
    UnrecognizedPlatform { tool: String, platform: String },

    /// A bounded poll ran out of time
    #[error("Timed out after {secs} seconds: {what}")]
    Timeout { what: String, secs: u64 },

    /// Standard input closed while an answer was still required
    #[error("Input closed before a valid answer was given")]
    PromptClosed,

    /// The interactive terminal prompt could not be driven
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InstallError {
    /// Process exit code for this failure kind
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallError::ToolMissing { .. } => 10,
            InstallError::ToolInstallFailed { .. } => 11,
            InstallError::ConnectionUnavailable => 12,
            InstallError::CommandFailed { .. } => 13,
            InstallError::UnrecognizedPlatform { .. } => 14,
            InstallError::Timeout { .. } => 15,
            InstallError::PromptClosed => 16,
            InstallError::Prompt(_) => 17,
            InstallError::Io(_) => 1,
        }
    }

    pub(crate) fn command_failed(step: impl Into<String>) -> Self {
        InstallError::CommandFailed { step: step.into() }
    }
}
