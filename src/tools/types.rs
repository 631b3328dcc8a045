//! Shared tool result type.

use crate::policy::PolicyDecision;
use serde::{Deserialize, Serialize};

/// Outcome of a tool action
///
/// A failed action always carries an explanation in `output`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub ok: bool,
    pub output: String,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            ok: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        let output = output.into();
        Self {
            ok: false,
            output: if output.is_empty() {
                "tool action failed".to_string()
            } else {
                output
            },
        }
    }
}

impl From<PolicyDecision> for ToolResult {
    fn from(decision: PolicyDecision) -> Self {
        if decision.allowed {
            Self::success(decision.reason)
        } else {
            Self::failure(decision.reason)
        }
    }
}
