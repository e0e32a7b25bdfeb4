use async_trait::async_trait;
use ethereum_types::Address;
use ethers::abi::Event;
use tracing::info;
use vigia_core::error::Result;
use vigia_core::events::parse_event;
use vigia_core::traits::TransactionHandler;
use vigia_core::utils::format_address;
use vigia_core::{DecodedLog, Finding, FindingSeverity, FindingType, TransactionEvent};

use crate::config::OwnershipTransferConfig;

pub const OWNERSHIP_TRANSFERRED: &str =
    "event OwnershipTransferred(address indexed previousOwner, address indexed newOwner)";

/// Detecta transferências de ownership nos contratos monitorados
pub struct OwnershipTransferBot {
    contracts: Vec<Address>,
    event: Event,
}

impl OwnershipTransferBot {
    pub fn new(contracts: Vec<Address>) -> Result<Self> {
        Ok(Self {
            contracts,
            event: parse_event(OWNERSHIP_TRANSFERRED)?,
        })
    }

    pub fn from_config(config: &OwnershipTransferConfig) -> Result<Self> {
        Self::new(config.contracts.clone())
    }

    fn finding(log: &DecodedLog) -> Result<Finding> {
        let previous_owner = log.address_param("previousOwner")?;
        let new_owner = log.address_param("newOwner")?;
        Ok(Finding::new(
            "Ownership Transfers Detection",
            "The ownership is transferred.",
            "IMPOSSIBLE-3",
            FindingSeverity::High,
            FindingType::Info,
            "Impossible Finance",
        )
        .with_metadata("contract", format_address(&log.address))
        .with_metadata("previousOwner", format_address(&previous_owner))
        .with_metadata("newOwner", format_address(&new_owner))
        .with_address(log.address))
    }
}

#[async_trait]
impl TransactionHandler for OwnershipTransferBot {
    fn name(&self) -> &str {
        "ownership-transfer"
    }

    async fn handle_transaction(&self, tx: &TransactionEvent) -> Result<Vec<Finding>> {
        let findings = tx
            .filter_log(&self.event, Some(self.contracts.as_slice()))
            .iter()
            .map(Self::finding)
            .collect::<Result<Vec<_>>>()?;

        if !findings.is_empty() {
            info!(tx = ?tx.hash, count = findings.len(), "transferência de ownership detectada");
        }
        Ok(findings)
    }
}
