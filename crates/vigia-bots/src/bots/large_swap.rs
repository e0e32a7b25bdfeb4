use async_trait::async_trait;
use ethereum_types::{Address, U256};
use ethers::abi::Event;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};
use vigia_core::error::Result;
use vigia_core::events::parse_event;
use vigia_core::traits::{RpcProvider, TransactionHandler};
use vigia_core::utils::{format_address, percentage_of};
use vigia_core::{BlockTag, DecodedLog, Finding, FindingSeverity, FindingType, TransactionEvent};

use crate::config::LargeSwapConfig;
use crate::fetchers::{pair_create2_address, PairFetcher};

pub const SWAP: &str = "event Swap(address indexed sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address indexed to)";

/// Argumentos de um evento `Swap` de par V2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapEvent {
    pub pair: Address,
    pub sender: Address,
    pub amount0_in: U256,
    pub amount1_in: U256,
    pub amount0_out: U256,
    pub amount1_out: U256,
    pub to: Address,
}

impl SwapEvent {
    pub fn from_log(log: &DecodedLog) -> Result<Self> {
        Ok(Self {
            pair: log.address,
            sender: log.address_param("sender")?,
            amount0_in: log.uint_param("amount0In")?,
            amount1_in: log.uint_param("amount1In")?,
            amount0_out: log.uint_param("amount0Out")?,
            amount1_out: log.uint_param("amount1Out")?,
            to: log.address_param("to")?,
        })
    }

    fn finding(&self) -> Finding {
        Finding::new(
            "Large Swap has occurred",
            "Swap event was emitted with a large amount",
            "TRADERJOE-03",
            FindingSeverity::Info,
            FindingType::Info,
            "TraderJoe",
        )
        .with_metadata("sender", format_address(&self.sender))
        .with_metadata("amount0In", self.amount0_in.to_string())
        .with_metadata("amount1In", self.amount1_in.to_string())
        .with_metadata("amount0Out", self.amount0_out.to_string())
        .with_metadata("amount1Out", self.amount1_out.to_string())
        .with_metadata("to", format_address(&self.to))
        .with_address(self.pair)
    }
}

/// Detecta swaps grandes em relação às reservas do par
pub struct LargeSwapBot<P: ?Sized> {
    fetcher: Arc<PairFetcher<P>>,
    config: LargeSwapConfig,
    swap: Event,
}

impl<P: RpcProvider + ?Sized> LargeSwapBot<P> {
    pub fn new(fetcher: Arc<PairFetcher<P>>, config: LargeSwapConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            config,
            swap: parse_event(SWAP)?,
        })
    }

    async fn check(&self, swap: SwapEvent, block: BlockTag) -> Option<Finding> {
        let fetched = tokio::try_join!(
            self.fetcher.tokens(swap.pair, block),
            self.fetcher.reserves(swap.pair, block)
        );
        let ((token0, token1), reserves) = match fetched {
            Ok(data) => data,
            Err(err) => {
                debug!(pair = ?swap.pair, %err, "emissor não responde como par");
                return None;
            }
        };

        let factory = self.config.pair_factory;
        if pair_create2_address(factory.factory, factory.init_code_hash, token0, token1) != swap.pair {
            return None;
        }

        let pct = self.config.threshold_percentage;
        let threshold0 = percentage_of(&reserves.reserve0, pct);
        let threshold1 = percentage_of(&reserves.reserve1, pct);
        let large = swap.amount0_in >= threshold0
            || swap.amount0_out >= threshold0
            || swap.amount1_in >= threshold1
            || swap.amount1_out >= threshold1;

        large.then(|| swap.finding())
    }
}

#[async_trait]
impl<P: RpcProvider + ?Sized + 'static> TransactionHandler for LargeSwapBot<P> {
    fn name(&self) -> &str {
        "large-swap"
    }

    async fn handle_transaction(&self, tx: &TransactionEvent) -> Result<Vec<Finding>> {
        let block = BlockTag::Number(tx.block_number.saturating_sub(1));
        let swaps: Vec<SwapEvent> = tx
            .filter_log(&self.swap, None)
            .iter()
            .filter_map(|log| SwapEvent::from_log(log).ok())
            .collect();

        let findings: Vec<Finding> = join_all(swaps.into_iter().map(|swap| self.check(swap, block)))
            .await
            .into_iter()
            .flatten()
            .collect();

        if !findings.is_empty() {
            info!(tx = ?tx.hash, count = findings.len(), "swap grande detectado");
        }
        Ok(findings)
    }
}
