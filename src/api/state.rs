//! Shared application state for the HTTP service.

use std::sync::Arc;

use crate::config::Settings;
use crate::llm::{LlmGateway, OpenAiGateway};
use crate::trading;
use crate::Result;

/// State shared by all request handlers
///
/// Only immutable settings and the stateless LLM gateway live here. Policy,
/// trading and memory components are built per request.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub llm: Arc<dyn LlmGateway>,
}

impl AppState {
    pub fn new(settings: Settings, llm: Arc<dyn LlmGateway>) -> Self {
        Self {
            settings: Arc::new(settings),
            llm,
        }
    }

    /// State backed by the OpenAI gateway described by `settings`
    pub fn from_settings(settings: Settings) -> Result<Self> {
        trading::warn_if_live(&settings.trading);
        let llm = Arc::new(OpenAiGateway::from_settings(&settings)?);
        Ok(Self::new(settings, llm))
    }
}
