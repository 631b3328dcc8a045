//! Policy, trading and tool behavior through the public API

use bitcoin_test_agent::tools::DEFAULT_SHELL_TIMEOUT;
use bitcoin_test_agent::trading::Side;
use bitcoin_test_agent::{
    PolicyDecision, PolicyEngine, ToolExecutor, ToolResult, TradeIntent, TradingConfig,
    TradingEngine,
};
use std::path::Path;
use tempfile::tempdir;

#[test]
fn shell_allowlist_blocks_dangerous_commands() {
    let policy = PolicyEngine::new("/ws");

    let denied = policy.authorize_shell("rm -rf /");

    assert_eq!(
        denied,
        PolicyDecision {
            allowed: false,
            reason: "command 'rm' is not allowlisted".to_string()
        }
    );
}

#[test]
fn every_default_command_is_allowed_with_arguments() {
    let policy = PolicyEngine::new("/ws");
    for command in ["python", "pytest", "pip", "uvicorn", "mkdir", "cat", "echo"] {
        assert!(policy.authorize_shell(&format!("{} --version", command)).allowed);
    }
    for command in ["rm", "curl", "sh", "bash", "sudo"] {
        let decision = policy.authorize_shell(&format!("{} something", command));
        assert!(!decision.allowed);
        assert!(decision.reason.contains(command));
    }
}

#[test]
fn trade_risk_is_enforced() {
    let engine = TradingEngine::new(
        TradingConfig {
            exchange: "Binance AUS".to_string(),
            symbol: "BTCUSDT".to_string(),
            max_daily_loss_usd: 20.0,
            paper_trading: true,
        },
        PolicyEngine::new("/ws"),
    );
    let intent = |risk_usd| TradeIntent {
        side: Side::Buy,
        quantity_btc: 0.001,
        price_usd: 60_000.0,
        risk_usd,
    };

    let accepted = engine.evaluate_intent(&intent(10.0));
    assert!(accepted.accepted);
    assert!(accepted.reason.contains("paper order accepted"));

    let rejected = engine.evaluate_intent(&intent(25.0));
    assert!(!rejected.accepted);
    assert!(rejected.reason.contains("exceeds"));
}

#[tokio::test]
async fn workspace_tools_round_trip_and_confinement() {
    let dir = tempdir().unwrap();
    let executor = ToolExecutor::for_workspace(dir.path());

    assert_eq!(
        executor.write_file("src/main.py", "print('hi')\n").await,
        ToolResult::success("wrote src/main.py")
    );
    assert_eq!(
        executor.read_file("src/main.py").await,
        ToolResult::success("print('hi')\n")
    );
    assert_eq!(
        executor.read_file("src/missing.py").await,
        ToolResult::failure("file does not exist")
    );
    assert_eq!(
        executor.write_file("../../outside.txt", "x").await,
        ToolResult::failure("path outside workspace")
    );

    let listing = executor.run_shell("cat src/main.py", DEFAULT_SHELL_TIMEOUT).await;
    assert_eq!(listing, ToolResult::success("print('hi')"));
}

#[test]
fn workspace_root_itself_is_allowed() {
    let dir = tempdir().unwrap();
    let policy = PolicyEngine::new(dir.path());
    assert!(policy.authorize_path(dir.path()).allowed);
    assert!(!policy.authorize_path(Path::new("/")).allowed);
}
