//! Tool implementations for the agent
//!
//! Tools are the only way the agent touches the local system: shell
//! commands and workspace file reads/writes, each gated by the policy engine.

mod executor;
mod types;

pub use executor::{ToolExecutor, DEFAULT_SHELL_TIMEOUT};
pub use types::ToolResult;

