//! Agent run loop
//!
//! One run is exactly two LLM calls: a plan for the objective, then a
//! critique of that plan. Both outputs are recorded in the runner's memory
//! store. There is no retry; an upstream failure ends the run and whatever
//! was already recorded stays recorded.

use crate::llm::LlmGateway;
use crate::memory::{MemoryEvent, MemoryStore, Stage};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Output of a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,
    pub objective: String,
    pub plan: String,
    pub review: String,
    /// Every event in the runner's store, not only this run's
    pub events: Vec<MemoryEvent>,
}

/// Sequences plan and review calls against an LLM gateway
pub struct AgentRunner {
    llm: Arc<dyn LlmGateway>,
    memory: MemoryStore,
}

impl AgentRunner {
    pub fn new(llm: Arc<dyn LlmGateway>, memory: MemoryStore) -> Self {
        Self { llm, memory }
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Plan, then review, then return both with the event log
    pub async fn run_once(&mut self, objective: &str) -> Result<RunResult> {
        let run_id = run_id_at(Utc::now());
        info!(run_id = %run_id, provider = self.llm.name(), "Starting agent run");

        let plan = self.llm.generate_plan(objective).await.inspect_err(|e| {
            warn!(run_id = %run_id, stage = "plan", error = %e, "Agent run aborted");
        })?;
        self.memory
            .append(MemoryEvent::new(run_id.clone(), Stage::Plan, plan.clone()));

        let review = self
            .llm
            .critic_review(&plan, objective)
            .await
            .inspect_err(|e| {
                warn!(run_id = %run_id, stage = "review", error = %e, "Agent run aborted");
            })?;
        self.memory
            .append(MemoryEvent::new(run_id.clone(), Stage::Review, review.clone()));

        info!(
            run_id = %run_id,
            plan_chars = plan.len(),
            review_chars = review.len(),
            events = self.memory.len(),
            "Agent run completed"
        );

        Ok(RunResult {
            run_id,
            objective: objective.to_string(),
            plan,
            review,
            events: self.memory.all(),
        })
    }
}

/// `run-YYYYMMDDHHMMSS` for the given instant
pub fn run_id_at(at: DateTime<Utc>) -> String {
    at.format("run-%Y%m%d%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers plan prompts and review prompts differently, optionally failing
    /// from the n-th call on
    struct ScriptedGateway {
        calls: AtomicUsize,
        fail_from: Option<usize>,
    }

    impl ScriptedGateway {
        fn new(fail_from: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_from,
            })
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn complete(&self, prompt: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_from.is_some_and(|n| call >= n) {
                return Err(Error::Upstream("connection reset".to_string()));
            }
            if prompt.starts_with("Create a concise executable plan") {
                Ok("1. research\n2. build".to_string())
            } else {
                Ok("PASS".to_string())
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[test]
    fn run_id_has_second_resolution() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(run_id_at(at), "run-20250307090502");
    }

    #[tokio::test]
    async fn run_records_plan_then_review() {
        let mut runner = AgentRunner::new(ScriptedGateway::new(None), MemoryStore::new());

        let result = runner.run_once("build a bot").await.unwrap();

        assert!(result.run_id.starts_with("run-"));
        assert_eq!(result.run_id.len(), "run-YYYYMMDDHHMMSS".len());
        assert_eq!(result.objective, "build a bot");
        assert_eq!(result.plan, "1. research\n2. build");
        assert_eq!(result.review, "PASS");
        assert_eq!(
            result.events,
            vec![
                MemoryEvent::new(result.run_id.clone(), Stage::Plan, "1. research\n2. build"),
                MemoryEvent::new(result.run_id.clone(), Stage::Review, "PASS"),
            ]
        );
    }

    #[tokio::test]
    async fn events_include_earlier_runs_of_the_same_store() {
        let mut runner = AgentRunner::new(ScriptedGateway::new(None), MemoryStore::new());

        runner.run_once("first").await.unwrap();
        let second = runner.run_once("second").await.unwrap();

        assert_eq!(second.events.len(), 4);
        assert_eq!(second.events[0].stage, Stage::Plan);
        assert_eq!(second.events[3].stage, Stage::Review);
    }

    #[tokio::test]
    async fn plan_failure_records_nothing() {
        let mut runner = AgentRunner::new(ScriptedGateway::new(Some(0)), MemoryStore::new());

        let err = runner.run_once("anything").await.unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        assert!(runner.memory().is_empty());
    }

    #[tokio::test]
    async fn review_failure_keeps_the_plan_event() {
        let mut runner = AgentRunner::new(ScriptedGateway::new(Some(1)), MemoryStore::new());

        let err = runner.run_once("anything").await.unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        let events = runner.memory().all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, Stage::Plan);
    }
}
