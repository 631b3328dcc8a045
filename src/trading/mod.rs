//! Trading workflow (paper only)
//!
//! Evaluates one trade intent at a time against the configured loss limit.
//! There is no order book, no position tracking and no venue connectivity:
//! an accepted intent is a paper order, whatever `paper_trading` says.

mod intent;

pub use intent::{Side, TradeEvaluation, TradeIntent};

use crate::config::TradingConfig;
use crate::policy::PolicyEngine;
use tracing::{info, warn};

/// Warn when live trading is requested; returns whether it warned
///
/// Called once at startup. Live order routing does not exist, so accepted
/// intents stay paper orders either way.
pub fn warn_if_live(config: &TradingConfig) -> bool {
    if config.paper_trading {
        return false;
    }
    warn!(
        exchange = %config.exchange,
        symbol = %config.symbol,
        "paper_trading is disabled but live order routing does not exist; \
         accepted intents remain paper orders"
    );
    true
}

/// Single-shot trade evaluator
#[derive(Debug, Clone)]
pub struct TradingEngine {
    config: TradingConfig,
    policy: PolicyEngine,
}

impl TradingEngine {
    pub fn new(config: TradingConfig, policy: PolicyEngine) -> Self {
        Self { config, policy }
    }

    /// Evaluate an intent against the daily loss limit
    pub fn evaluate_intent(&self, intent: &TradeIntent) -> TradeEvaluation {
        let decision = self
            .policy
            .authorize_trade(intent.risk_usd, self.config.max_daily_loss_usd);

        let evaluation = if decision.allowed {
            TradeEvaluation {
                accepted: true,
                reason: format!(
                    "paper order accepted on {} for {}",
                    self.config.exchange, self.config.symbol
                ),
            }
        } else {
            TradeEvaluation {
                accepted: false,
                reason: decision.reason,
            }
        };

        info!(
            side = %intent.side,
            quantity_btc = intent.quantity_btc,
            price_usd = intent.price_usd,
            notional_usd = intent.notional_usd(),
            risk_usd = intent.risk_usd,
            max_daily_loss_usd = self.config.max_daily_loss_usd,
            accepted = evaluation.accepted,
            "Evaluated trade intent"
        );

        evaluation
    }
}
