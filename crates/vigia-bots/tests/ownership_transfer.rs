mod common;

use common::{addr, event_log, topic};
use ethereum_types::H256;
use vigia_bots::bots::ownership_transfer::OWNERSHIP_TRANSFERRED;
use vigia_bots::OwnershipTransferBot;
use vigia_core::traits::TransactionHandler;
use vigia_core::{FindingSeverity, FindingType, TransactionEvent};

fn transfer(contract: u64, previous: u64, new: u64) -> ethers::types::Log {
    event_log(addr(contract), OWNERSHIP_TRANSFERRED, &[topic(addr(previous)), topic(addr(new))], &[], 10)
}

fn bot() -> OwnershipTransferBot {
    OwnershipTransferBot::new(vec![addr(1), addr(2), addr(3)]).unwrap()
}

#[tokio::test]
async fn empty_transaction_has_no_findings() {
    let findings = bot().handle_transaction(&TransactionEvent::default()).await.unwrap();
    assert!(findings.is_empty());
}

#[tokio::test]
async fn ignores_unmonitored_contracts() {
    let tx = TransactionEvent::new(H256::zero(), 10).with_log(transfer(6, 4, 5));
    assert!(bot().handle_transaction(&tx).await.unwrap().is_empty());
}

#[tokio::test]
async fn reports_each_transfer_in_order() {
    let tx = TransactionEvent::new(H256::zero(), 10)
        .with_log(transfer(2, 4, 5))
        .with_log(transfer(9, 4, 5))
        .with_log(transfer(3, 5, 6));

    let findings = bot().handle_transaction(&tx).await.unwrap();
    assert_eq!(findings.len(), 2);

    let first = &findings[0];
    assert_eq!(first.alert_id, "IMPOSSIBLE-3");
    assert_eq!(first.name, "Ownership Transfers Detection");
    assert_eq!(first.severity, FindingSeverity::High);
    assert_eq!(first.finding_type, FindingType::Info);
    assert_eq!(first.protocol, "Impossible Finance");
    assert_eq!(first.metadata["contract"], "0x0000000000000000000000000000000000000002");
    assert_eq!(first.metadata["previousOwner"], "0x0000000000000000000000000000000000000004");
    assert_eq!(first.metadata["newOwner"], "0x0000000000000000000000000000000000000005");

    assert_eq!(findings[1].metadata["contract"], "0x0000000000000000000000000000000000000003");
    assert_eq!(findings[1].metadata["newOwner"], "0x0000000000000000000000000000000000000006");
}
