use async_trait::async_trait;
use ethereum_types::{Address, U256};
use ethers::abi::Event;
use ethers::types::Log;
use std::sync::Arc;
use tracing::{debug, info};
use vigia_core::error::Result;
use vigia_core::events::{decode_log, parse_event};
use vigia_core::traits::{BlockHandler, RpcProvider};
use vigia_core::utils::format_units;
use vigia_core::{BlockEvent, Finding, FindingSeverity, FindingType, LogFilter};

use crate::config::FeeChangeConfig;

pub const SWAP_FEE_PERCENTAGE_CHANGED: &str = "event SwapFeePercentageChanged(uint256 newSwapFeePercentage)";
pub const FLASH_LOAN_FEE_PERCENTAGE_CHANGED: &str =
    "event FlashLoanFeePercentageChanged(uint256 newFlashLoanFeePercentage)";

/// Percentuais são armazenados com 18 casas e 1e18 = 100%
const FEE_PERCENTAGE_DECIMALS: u8 = 16;

/// Mudança de taxa emitida pelo coletor de taxas do protocolo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeChange {
    Swap(U256),
    FlashLoan(U256),
}

impl FeeChange {
    pub fn finding(&self) -> Finding {
        let (name, description, alert_id, value) = match self {
            FeeChange::Swap(v) => (
                "Swap fee changed",
                "A Swap fee percentage change was detected",
                "BAL-1-2",
                v,
            ),
            FeeChange::FlashLoan(v) => (
                "FlashLoan fee changed",
                "A FlashLoan fee percentage change was detected",
                "BAL-1-1",
                v,
            ),
        };
        Finding::new(name, description, alert_id, FindingSeverity::Info, FindingType::Info, "Balancer")
            .with_metadata("newFeePercentage", format_units(value, FEE_PERCENTAGE_DECIMALS))
    }
}

/// Acompanha as taxas de swap e flash loan do Balancer a cada bloco
pub struct FeeChangeBot<P: ?Sized> {
    provider: Arc<P>,
    collector: Address,
    swap_fee_changed: Event,
    flash_loan_fee_changed: Event,
}

impl<P: RpcProvider + ?Sized> FeeChangeBot<P> {
    pub fn new(provider: Arc<P>, config: &FeeChangeConfig) -> Result<Self> {
        Ok(Self {
            provider,
            collector: config.protocol_fees_collector,
            swap_fee_changed: parse_event(SWAP_FEE_PERCENTAGE_CHANGED)?,
            flash_loan_fee_changed: parse_event(FLASH_LOAN_FEE_PERCENTAGE_CHANGED)?,
        })
    }

    fn decode(&self, log: &Log) -> Option<FeeChange> {
        if let Some(decoded) = decode_log(&self.swap_fee_changed, log) {
            return decoded.uint_param("newSwapFeePercentage").ok().map(FeeChange::Swap);
        }
        decode_log(&self.flash_loan_fee_changed, log)?
            .uint_param("newFlashLoanFeePercentage")
            .ok()
            .map(FeeChange::FlashLoan)
    }
}

#[async_trait]
impl<P: RpcProvider + ?Sized + 'static> BlockHandler for FeeChangeBot<P> {
    fn name(&self) -> &str {
        "fee-change"
    }

    async fn handle_block(&self, block: &BlockEvent) -> Result<Vec<Finding>> {
        let filter = LogFilter::block(block.number).address(self.collector);
        let logs = self.provider.get_logs(filter).await?;

        let findings: Vec<Finding> = logs
            .iter()
            // o node pode devolver logs fora do filtro
            .filter(|log| log.address == self.collector)
            .filter(|log| log.block_number.map_or(false, |n| n.as_u64() == block.number))
            .filter_map(|log| {
                let change = self.decode(log);
                if change.is_none() {
                    debug!(block = block.number, "log do coletor ignorado");
                }
                change
            })
            .map(|change| change.finding())
            .collect();

        if !findings.is_empty() {
            info!(block = block.number, count = findings.len(), "mudança de taxa detectada");
        }
        Ok(findings)
    }
}
