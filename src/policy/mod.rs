//! Policy checks for tool and trading actions
//!
//! Every check returns a [`PolicyDecision`] value; a denial is an expected
//! outcome, never an error.
//!
//! # Shell allowlist
//!
//! Only the leading token of a command is compared against the allowlist.
//! Arguments, pipes and shell metacharacters are not interpreted, so an
//! allowlisted interpreter can still run arbitrary code
//! (`python -c "import os; os.system('rm -rf /')"` is allowed). Treat the
//! allowlist as a guard against accidents, not as a sandbox.

mod path;

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use path::resolve;

/// Commands a shell action may start with
pub const DEFAULT_ALLOWED_COMMANDS: &[&str] =
    &["python", "pytest", "pip", "uvicorn", "mkdir", "cat", "echo"];

/// Outcome of a policy check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: String,
}

impl PolicyDecision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Allowlist policy rooted at a workspace directory
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    workspace_root: PathBuf,
    allowed_commands: Vec<String>,
}

impl PolicyEngine {
    /// Create a policy with the default command allowlist
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self::with_allowed_commands(workspace_root, DEFAULT_ALLOWED_COMMANDS.iter().copied())
    }

    /// Create a policy with an explicit command allowlist
    pub fn with_allowed_commands<I, S>(workspace_root: impl Into<PathBuf>, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            workspace_root: workspace_root.into(),
            allowed_commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowed_commands(&self) -> &[String] {
        &self.allowed_commands
    }

    /// Authorize a shell command by its leading token
    pub fn authorize_shell(&self, command: &str) -> PolicyDecision {
        let token = command.split_whitespace().next().unwrap_or("");

        if self.allowed_commands.iter().any(|allowed| allowed == token) {
            debug!(command = token, "Shell command allowed");
            return PolicyDecision::allow("command allowed");
        }

        warn!(command = token, "Shell command denied by allowlist");
        PolicyDecision::deny(format!("command '{}' is not allowlisted", token))
    }

    /// Authorize a filesystem path against the workspace root
    ///
    /// Both sides are resolved to absolute, symlink-free paths first, so
    /// `..` segments and links pointing outside the workspace are denied.
    pub fn authorize_path(&self, path: &Path) -> PolicyDecision {
        let root = match resolve(&self.workspace_root) {
            Ok(root) => root,
            Err(e) => {
                warn!(
                    workspace_root = %self.workspace_root.display(),
                    error = %e,
                    "Could not resolve workspace root"
                );
                return PolicyDecision::deny("path outside workspace");
            }
        };

        match resolve(path) {
            Ok(resolved) if resolved.starts_with(&root) => {
                debug!(path = %resolved.display(), "Path allowed");
                PolicyDecision::allow("path allowed")
            }
            Ok(resolved) => {
                warn!(
                    path = %resolved.display(),
                    workspace_root = %root.display(),
                    "Path denied: outside workspace"
                );
                PolicyDecision::deny("path outside workspace")
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not resolve path");
                PolicyDecision::deny("path outside workspace")
            }
        }
    }

    /// Authorize a trade's risk against the loss limit (equality passes)
    pub fn authorize_trade(&self, requested_risk_usd: f64, max_daily_loss_usd: f64) -> PolicyDecision {
        if requested_risk_usd <= max_daily_loss_usd {
            debug!(
                requested_risk_usd,
                max_daily_loss_usd, "Trade risk within limit"
            );
            return PolicyDecision::allow("trade risk within limit");
        }

        warn!(
            requested_risk_usd,
            max_daily_loss_usd, "Trade rejected: risk exceeds limit"
        );
        PolicyDecision::deny("trade rejected: requested risk exceeds max daily loss")
    }
}
