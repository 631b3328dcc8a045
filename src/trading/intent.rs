//! Trade intent and evaluation types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single trade the agent would like to place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub side: Side,
    pub quantity_btc: f64,
    pub price_usd: f64,
    /// Loss the trade may incur (USD), checked against the daily limit
    pub risk_usd: f64,
}

impl TradeIntent {
    /// Order value at the intent's price (USD)
    pub fn notional_usd(&self) -> f64 {
        self.quantity_btc * self.price_usd
    }
}

/// Result of evaluating an intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvaluation {
    pub accepted: bool,
    pub reason: String,
}

impl From<TradeEvaluation> for (bool, String) {
    fn from(evaluation: TradeEvaluation) -> Self {
        (evaluation.accepted, evaluation.reason)
    }
}
