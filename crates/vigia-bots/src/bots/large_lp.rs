use async_trait::async_trait;
use ethereum_types::{Address, U256};
use ethers::abi::Event;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vigia_core::error::Result;
use vigia_core::events::parse_event;
use vigia_core::traits::{RpcProvider, TransactionHandler};
use vigia_core::utils::{format_address, percentage_of};
use vigia_core::{BlockTag, DecodedLog, Finding, FindingSeverity, FindingType, TransactionEvent};

use crate::config::LargeLpConfig;
use crate::fetchers::{pair_create2_address, PairFetcher};

pub const MINT: &str = "event Mint(address indexed sender, uint256 amount0, uint256 amount1)";
pub const BURN: &str =
    "event Burn(address indexed sender, uint256 amount0, uint256 amount1, address indexed to)";

/// Movimento de liquidez em um pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpEvent {
    Mint { pool: Address, amount0: U256, amount1: U256 },
    Burn { pool: Address, amount0: U256, amount1: U256 },
}

impl LpEvent {
    pub fn from_log(log: &DecodedLog) -> Option<Self> {
        let pool = log.address;
        let amount0 = log.uint_param("amount0").ok()?;
        let amount1 = log.uint_param("amount1").ok()?;
        match log.name.as_str() {
            "Mint" => Some(LpEvent::Mint { pool, amount0, amount1 }),
            "Burn" => Some(LpEvent::Burn { pool, amount0, amount1 }),
            _ => None,
        }
    }

    pub fn pool(&self) -> Address {
        match self {
            LpEvent::Mint { pool, .. } | LpEvent::Burn { pool, .. } => *pool,
        }
    }

    pub fn amounts(&self) -> (U256, U256) {
        match self {
            LpEvent::Mint { amount0, amount1, .. } | LpEvent::Burn { amount0, amount1, .. } => (*amount0, *amount1),
        }
    }

    fn finding(&self, token0: Address, token1: Address) -> Finding {
        let (name, description, alert_id) = match self {
            LpEvent::Mint { .. } => (
                "Large LP Deposit in Apeswap pool",
                "Mint event with large amounts emitted from Apeswap pool",
                "APESWAP-9-1",
            ),
            LpEvent::Burn { .. } => (
                "Large LP Withdrawal from Apeswap pool",
                "Burn event with large amount emitted from an Apeswap pool",
                "APESWAP-9-2",
            ),
        };
        let (amount0, amount1) = self.amounts();
        Finding::new(name, description, alert_id, FindingSeverity::Info, FindingType::Info, "Apeswap")
            .with_metadata("pool", format_address(&self.pool()))
            .with_metadata("token0", format_address(&token0))
            .with_metadata("amount0", amount0.to_string())
            .with_metadata("token1", format_address(&token1))
            .with_metadata("amount1", amount1.to_string())
            .with_address(self.pool())
    }
}

/// Tokens e supply de um pool válido no bloco anterior ao evento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolData {
    token0: Address,
    token1: Address,
    total_supply: U256,
}

/// Detecta depósitos e saques grandes de liquidez em pools da factory
/// configurada
pub struct LargeLpBot<P: ?Sized> {
    fetcher: Arc<PairFetcher<P>>,
    config: LargeLpConfig,
    events: [Event; 2],
}

impl<P: RpcProvider + ?Sized> LargeLpBot<P> {
    pub fn new(fetcher: Arc<PairFetcher<P>>, config: LargeLpConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            config,
            events: [parse_event(MINT)?, parse_event(BURN)?],
        })
    }

    /// `None` quando o emissor não é um pool da factory
    async fn pool_data(&self, pool: Address, block: BlockTag) -> Option<PoolData> {
        let fetched = tokio::try_join!(
            self.fetcher.tokens(pool, block),
            self.fetcher.total_supply(pool, block)
        );
        let ((token0, token1), total_supply) = match fetched {
            Ok(data) => data,
            Err(err) => {
                debug!(pool = ?pool, %err, "emissor não responde como pool");
                return None;
            }
        };

        let factory = self.config.pair_factory;
        if pair_create2_address(factory.factory, factory.init_code_hash, token0, token1) != pool {
            return None;
        }
        Some(PoolData {
            token0,
            token1,
            total_supply,
        })
    }

    async fn check(&self, event: LpEvent, block: BlockTag) -> Option<Finding> {
        let pool = event.pool();
        let data = self.pool_data(pool, block).await?;
        if data.total_supply <= self.config.pool_supply_threshold {
            return None;
        }

        let balances = tokio::try_join!(
            self.fetcher.balance_of(data.token0, pool, block),
            self.fetcher.balance_of(data.token1, pool, block)
        );
        let (balance0, balance1) = match balances {
            Ok(b) => b,
            Err(err) => {
                warn!(pool = ?pool, %err, "falha ao obter saldos do pool");
                return None;
            }
        };

        let pct = self.config.amount_threshold_percentage;
        let (amount0, amount1) = event.amounts();
        if amount0 >= percentage_of(&balance0, pct) || amount1 >= percentage_of(&balance1, pct) {
            Some(event.finding(data.token0, data.token1))
        } else {
            None
        }
    }
}

#[async_trait]
impl<P: RpcProvider + ?Sized + 'static> TransactionHandler for LargeLpBot<P> {
    fn name(&self) -> &str {
        "large-lp"
    }

    async fn handle_transaction(&self, tx: &TransactionEvent) -> Result<Vec<Finding>> {
        let block = BlockTag::Number(tx.block_number.saturating_sub(1));
        let events: Vec<LpEvent> = tx
            .filter_logs(&self.events, None)
            .iter()
            .filter_map(LpEvent::from_log)
            .collect();

        let findings: Vec<Finding> = join_all(events.into_iter().map(|event| self.check(event, block)))
            .await
            .into_iter()
            .flatten()
            .collect();

        if !findings.is_empty() {
            info!(tx = ?tx.hash, count = findings.len(), "movimento grande de liquidez detectado");
        }
        Ok(findings)
    }
}
