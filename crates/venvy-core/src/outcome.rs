use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::VenvError;

/// Result envelope handed to the presentation layer: a one-line human
/// message plus machine-readable details for `--json` consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }

    /// Maps a core error onto the envelope. Precondition failures the user
    /// can fix (bad target, missing interpreter) rank as user errors; tool
    /// failures rank as failures, with the tool's raw output preserved under
    /// `details.output`.
    pub fn from_error(err: &VenvError) -> Self {
        let details = json!({
            "error": err.kind(),
            "output": err.output(),
        });
        match err {
            VenvError::SafetyCheck { .. } | VenvError::InterpreterUnavailable { .. } => {
                Self::user_error(err.to_string(), details)
            }
            _ => Self::failure(err.to_string(), details),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}
