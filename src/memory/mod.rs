//! In-memory run history
//!
//! Append-only, insertion-ordered, gone when the store is dropped.

use serde::{Deserialize, Serialize};

/// Step of an agent run an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Plan,
    Review,
}

/// One recorded LLM output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub run_id: String,
    pub stage: Stage,
    pub value: String,
}

impl MemoryEvent {
    pub fn new(run_id: impl Into<String>, stage: Stage, value: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            stage,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<MemoryEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: MemoryEvent) {
        self.events.push(event);
    }

    /// Copy of every event, oldest first
    pub fn all(&self) -> Vec<MemoryEvent> {
        self.events.clone()
    }

    /// Events of a single run, oldest first
    pub fn for_run(&self, run_id: &str) -> Vec<MemoryEvent> {
        self.events
            .iter()
            .filter(|event| event.run_id == run_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
