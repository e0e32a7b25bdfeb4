mod common;

use common::{addr, event_log, MockProvider};
use ethereum_types::U256;
use ethers::abi::Token;
use std::sync::Arc;
use vigia_bots::bots::fee_change::{FLASH_LOAN_FEE_PERCENTAGE_CHANGED, SWAP_FEE_PERCENTAGE_CHANGED};
use vigia_bots::config::FeeChangeConfig;
use vigia_bots::{FeeChange, FeeChangeBot};
use vigia_core::traits::BlockHandler;
use vigia_core::BlockEvent;

const COLLECTOR: u64 = 0xfee5;

fn setup() -> (FeeChangeBot<MockProvider>, Arc<MockProvider>) {
    let provider = Arc::new(MockProvider::new());
    let config = FeeChangeConfig {
        protocol_fees_collector: addr(COLLECTOR),
    };
    (FeeChangeBot::new(Arc::clone(&provider), &config).unwrap(), provider)
}

fn fee_log(emitter: u64, signature: &str, fee: U256, block: u64) -> ethers::types::Log {
    event_log(addr(emitter), signature, &[], &[Token::Uint(fee)], block)
}

fn e14(n: u64) -> U256 {
    U256::from(n) * U256::exp10(14)
}

#[tokio::test]
async fn empty_block_has_no_findings() {
    let (bot, _) = setup();
    assert!(bot.handle_block(&BlockEvent::new(0)).await.unwrap().is_empty());
}

#[tokio::test]
async fn ignores_other_blocks_events_and_emitters() {
    let (bot, provider) = setup();
    provider.add_log(fee_log(COLLECTOR, SWAP_FEE_PERCENTAGE_CHANGED, e14(1), 0));
    provider.add_log(event_log(addr(COLLECTOR), "event IrrelevantEvent()", &[], &[], 1));
    provider.add_log(fee_log(0xbad, SWAP_FEE_PERCENTAGE_CHANGED, e14(1), 1));

    assert!(bot.handle_block(&BlockEvent::new(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn reports_fee_changes_in_log_order() {
    let (bot, provider) = setup();
    provider.add_log(fee_log(COLLECTOR, SWAP_FEE_PERCENTAGE_CHANGED, e14(200), 5));
    provider.add_log(fee_log(COLLECTOR, FLASH_LOAN_FEE_PERCENTAGE_CHANGED, e14(1), 5));

    let findings = bot.handle_block(&BlockEvent::new(5)).await.unwrap();
    assert_eq!(findings.len(), 2);

    assert_eq!(findings[0].alert_id, "BAL-1-2");
    assert_eq!(findings[0].name, "Swap fee changed");
    assert_eq!(findings[0].metadata["newFeePercentage"], "2.0");

    assert_eq!(findings[1].alert_id, "BAL-1-1");
    assert_eq!(findings[1].name, "FlashLoan fee changed");
    assert_eq!(findings[1].metadata["newFeePercentage"], "0.01");
    assert_eq!(findings[1].protocol, "Balancer");
}

#[test]
fn fee_change_findings_are_tagged_by_kind() {
    assert_eq!(FeeChange::Swap(e14(10)).finding().metadata["newFeePercentage"], "0.1");
    assert_eq!(FeeChange::FlashLoan(e14(3000)).finding().alert_id, "BAL-1-1");
}
