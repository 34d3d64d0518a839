use std::path::PathBuf;

use thiserror::Error;

/// Typed failures for environment and package mutations. Every variant that
/// wraps an external tool carries the tool's combined diagnostic output so a
/// human can act on it; nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum VenvError {
    #[error("failed to create environment:\n{output}")]
    CreationFailed { output: String },

    #[error("environment created but {} not found under {}", venvy_domain::PYVENV_CFG, path.display())]
    Inconsistent { path: PathBuf },

    #[error("safety check failed: {} does not appear to be a virtual environment", path.display())]
    SafetyCheck { path: PathBuf },

    #[error("pip install failed:\n{output}")]
    InstallFailed { output: String },

    #[error("pip uninstall failed:\n{output}")]
    RemoveFailed { output: String },

    #[error("pip upgrade failed:\n{output}")]
    UpgradeFailed { output: String },

    #[error("no usable interpreter at {}", path.display())]
    InterpreterUnavailable { path: PathBuf },

    #[error("failed to run {tool}: {message}")]
    ToolInvocationFailed { tool: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VenvError {
    /// Stable machine-readable tag, used by the CLI's JSON envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreationFailed { .. } => "creation-failed",
            Self::Inconsistent { .. } => "inconsistent",
            Self::SafetyCheck { .. } => "safety-check",
            Self::InstallFailed { .. } => "install-failed",
            Self::RemoveFailed { .. } => "remove-failed",
            Self::UpgradeFailed { .. } => "upgrade-failed",
            Self::InterpreterUnavailable { .. } => "interpreter-unavailable",
            Self::ToolInvocationFailed { .. } => "tool-invocation-failed",
            Self::Io(_) => "io",
        }
    }

    /// The underlying tool's captured output, when the variant carries one.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::CreationFailed { output }
            | Self::InstallFailed { output }
            | Self::RemoveFailed { output }
            | Self::UpgradeFailed { output } => Some(output),
            _ => None,
        }
    }
}
