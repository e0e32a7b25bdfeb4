use std::sync::Arc;
use tracing::{info, warn};
use vigia_core::error::Result;
use vigia_core::traits::{BlockHandler, RpcProvider, TransactionHandler};
use vigia_core::{BlockEvent, Finding, TransactionEvent};

use crate::bots::{FeeChangeBot, LargeLpBot, LargeSwapBot, OwnershipTransferBot};
use crate::config::{for_network, BotsConfig};
use crate::fetchers::PairFetcher;

/// Conjunto de bots executados para cada evento
#[derive(Default)]
pub struct BotRegistry {
    transaction_handlers: Vec<Box<dyn TransactionHandler>>,
    block_handlers: Vec<Box<dyn BlockHandler>>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instancia os bots configurados para `chain_id`.
    ///
    /// Bots sem seção para a rede ficam de fora. Os bots de pares compartilham
    /// um único [`PairFetcher`].
    pub fn from_config<P>(provider: Arc<P>, config: &BotsConfig, chain_id: u64) -> Result<Self>
    where
        P: RpcProvider + ?Sized + 'static,
    {
        let mut registry = Self::new();

        if let Some(section) = for_network(&config.ownership_transfer, chain_id) {
            registry.add_transaction_handler(OwnershipTransferBot::from_config(&section)?);
        }
        if let Some(section) = for_network(&config.fee_change, chain_id) {
            registry.add_block_handler(FeeChangeBot::new(Arc::clone(&provider), &section)?);
        }

        let large_lp = for_network(&config.large_lp, chain_id);
        let large_swap = for_network(&config.large_swap, chain_id);
        if large_lp.is_some() || large_swap.is_some() {
            let fetcher = Arc::new(PairFetcher::new(Arc::clone(&provider), &config.cache)?);
            if let Some(section) = large_lp {
                registry.add_transaction_handler(LargeLpBot::new(Arc::clone(&fetcher), section)?);
            }
            if let Some(section) = large_swap {
                registry.add_transaction_handler(LargeSwapBot::new(fetcher, section)?);
            }
        }

        info!(chain_id, bots = ?registry.names(), "bots registrados");
        Ok(registry)
    }

    pub fn add_transaction_handler(&mut self, handler: impl TransactionHandler + 'static) {
        self.transaction_handlers.push(Box::new(handler));
    }

    pub fn add_block_handler(&mut self, handler: impl BlockHandler + 'static) {
        self.block_handlers.push(Box::new(handler));
    }

    pub fn names(&self) -> Vec<&str> {
        self.transaction_handlers
            .iter()
            .map(|h| h.name())
            .chain(self.block_handlers.iter().map(|h| h.name()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.transaction_handlers.len() + self.block_handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Executa os bots de transação na ordem de registro.
    ///
    /// A falha de um bot é registrada em log e não impede os demais.
    pub async fn handle_transaction(&self, tx: &TransactionEvent) -> Vec<Finding> {
        let mut findings = Vec::new();
        for handler in &self.transaction_handlers {
            match handler.handle_transaction(tx).await {
                Ok(found) => findings.extend(found),
                Err(err) => warn!(bot = handler.name(), tx = ?tx.hash, %err, "bot falhou na transação"),
            }
        }
        findings
    }

    pub async fn handle_block(&self, block: &BlockEvent) -> Vec<Finding> {
        let mut findings = Vec::new();
        for handler in &self.block_handlers {
            match handler.handle_block(block).await {
                Ok(found) => findings.extend(found),
                Err(err) => warn!(bot = handler.name(), block = block.number, %err, "bot falhou no bloco"),
            }
        }
        findings
    }
}
