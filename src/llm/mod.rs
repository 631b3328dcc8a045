//! Cloud LLM gateway abstraction
//!
//! The agent only needs plain text completion. [`LlmGateway`] standardizes
//! the three prompts it uses (planning, code generation, critique) on top of
//! a single `complete` call, so alternative providers or test doubles only
//! implement that one method.

mod openai;

pub use openai::OpenAiGateway;

use crate::Result;
use async_trait::async_trait;

/// Text-completion service used for planning, coding and critique
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Issue one completion call and return the trimmed text output
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;

    async fn generate_plan(&self, objective: &str) -> Result<String> {
        self.complete(&plan_prompt(objective)).await
    }

    async fn generate_code(&self, task: &str, constraints: &str) -> Result<String> {
        self.complete(&code_prompt(task, constraints)).await
    }

    async fn critic_review(&self, artifact: &str, objective: &str) -> Result<String> {
        self.complete(&review_prompt(artifact, objective)).await
    }
}

pub fn plan_prompt(objective: &str) -> String {
    format!("Create a concise executable plan for: {}", objective)
}

pub fn code_prompt(task: &str, constraints: &str) -> String {
    format!(
        "Write production-grade Python code for this task. Task: {}. Constraints: {}",
        task, constraints
    )
}

pub fn review_prompt(artifact: &str, objective: &str) -> String {
    format!(
        "Review this artifact against the objective and provide pass/fail + fixes. \
         Objective: {}\nArtifact:\n{}",
        objective, artifact
    )
}
