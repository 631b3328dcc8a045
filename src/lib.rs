//! Bitcoin Test Agent
//!
//! Scaffold for an autonomous agent that:
//! - Plans and critiques tasks through a cloud LLM
//! - Runs local tool actions (shell commands, file reads/writes)
//! - Evaluates BTC trade intents against a daily loss limit (paper only)
//!
//! # Security Model
//!
//! - Every tool action passes through the policy engine first
//! - File actions are confined to the workspace root (symlinks resolved)
//! - Shell commands are gated by their leading token only; an allowlisted
//!   interpreter can still run arbitrary code
//! - No order ever reaches a real venue

pub mod api;
pub mod config;
pub mod llm;
pub mod memory;
pub mod policy;
pub mod runner;
pub mod tools;
pub mod trading;

mod error;

// Re-export commonly used types
pub use config::{Settings, TradingConfig};
pub use error::{Error, Result};
pub use policy::{PolicyDecision, PolicyEngine};
pub use runner::{AgentRunner, RunResult};
pub use tools::{ToolExecutor, ToolResult};
pub use trading::{TradeEvaluation, TradeIntent, TradingEngine};
