/*!
 * Vigia Traits
 *
 * Traits comuns usados em toda a workspace Vigia
 */

use async_trait::async_trait;
use ethereum_types::Address;
use ethers::types::Log;
use std::sync::Arc;

use crate::error::Result;
use crate::events::{BlockEvent, TransactionEvent};
use crate::types::{BlockTag, Finding, LogFilter};

/// Trait para provedores RPC
#[async_trait]
pub trait RpcProvider: Send + Sync {
    /// Chama um método de contrato no estado do bloco informado
    async fn call(&self, to: Address, data: Vec<u8>, block: BlockTag) -> Result<Vec<u8>>;

    /// Obtém os logs que casam com o filtro
    async fn get_logs(&self, filter: LogFilter) -> Result<Vec<Log>>;

    /// Obtém o código de um contrato
    async fn get_code(&self, address: Address, block: BlockTag) -> Result<Vec<u8>>;

    /// Obtém o número do bloco atual
    async fn get_block_number(&self) -> Result<u64>;

    /// Obtém o chain id da rede conectada
    async fn chain_id(&self) -> Result<u64>;
}

#[async_trait]
impl<P: RpcProvider + ?Sized> RpcProvider for Arc<P> {
    async fn call(&self, to: Address, data: Vec<u8>, block: BlockTag) -> Result<Vec<u8>> {
        (**self).call(to, data, block).await
    }

    async fn get_logs(&self, filter: LogFilter) -> Result<Vec<Log>> {
        (**self).get_logs(filter).await
    }

    async fn get_code(&self, address: Address, block: BlockTag) -> Result<Vec<u8>> {
        (**self).get_code(address, block).await
    }

    async fn get_block_number(&self) -> Result<u64> {
        (**self).get_block_number().await
    }

    async fn chain_id(&self) -> Result<u64> {
        (**self).chain_id().await
    }
}

/// Bot que analisa transações individuais
#[async_trait]
pub trait TransactionHandler: Send + Sync {
    /// Nome usado em logs
    fn name(&self) -> &str;

    /// Retorna os findings gerados pela transação
    async fn handle_transaction(&self, tx: &TransactionEvent) -> Result<Vec<Finding>>;
}

/// Bot que analisa blocos inteiros
#[async_trait]
pub trait BlockHandler: Send + Sync {
    /// Nome usado em logs
    fn name(&self) -> &str;

    /// Retorna os findings gerados pelo bloco
    async fn handle_block(&self, block: &BlockEvent) -> Result<Vec<Finding>>;
}
