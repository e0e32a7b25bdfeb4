/*!
 * Vigia RPC
 *
 * Cliente RPC para interação com nodes Ethereum
 */

use async_trait::async_trait;
use ethereum_types::{Address, H256, U64};
use ethers::types::{Bytes as EthersBytes, Log};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use vigia_core::{error::Result, types::*, BlockEvent, Error, TransactionEvent};
use web3::{
    transports::{Http, WebSocket},
    types::{BlockId, BlockNumber, Bytes, FilterBuilder, H160, U64 as Web3U64},
    Web3,
};

/// Configuração do cliente RPC
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8545".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RpcConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Enum para diferentes tipos de transporte
pub enum TransportType {
    Http(Web3<Http>),
    WebSocket(Web3<WebSocket>),
}

/// Executa `$body` com o `Web3` do transporte ativo
macro_rules! with_web3 {
    ($client:expr, $web3:ident => $body:expr) => {
        match &$client.transport {
            TransportType::Http($web3) => $body,
            TransportType::WebSocket($web3) => $body,
        }
    };
}

/// Converte uma tag de bloco para o formato do web3
pub fn to_block_number(block: BlockTag) -> BlockNumber {
    match block {
        BlockTag::Earliest => BlockNumber::Earliest,
        BlockTag::Number(n) => BlockNumber::Number(Web3U64::from(n)),
        BlockTag::Latest => BlockNumber::Latest,
        BlockTag::Pending => BlockNumber::Pending,
    }
}

/// Converte um log do web3 para o tipo do ethers usado pelos bots
pub fn to_ethers_log(log: web3::types::Log) -> Log {
    Log {
        address: Address::from_slice(log.address.as_bytes()),
        topics: log.topics.iter().map(|t| H256::from_slice(t.as_bytes())).collect(),
        data: EthersBytes::from(log.data.0),
        block_hash: log.block_hash.map(|h| H256::from_slice(h.as_bytes())),
        block_number: log.block_number.map(|n| U64::from(n.as_u64())),
        transaction_hash: log.transaction_hash.map(|h| H256::from_slice(h.as_bytes())),
        transaction_index: log.transaction_index.map(|i| U64::from(i.as_u64())),
        log_index: log.log_index,
        transaction_log_index: log.transaction_log_index,
        log_type: log.log_type,
        removed: log.removed,
    }
}

/// Agrupa os logs de um bloco nas transações que os emitiram.
///
/// A ordem das transações é a do bloco; logs sem hash de transação ou de
/// transações desconhecidas são descartados.
pub fn group_logs(block_number: u64, transactions: Vec<TransactionEvent>, logs: Vec<Log>) -> Vec<TransactionEvent> {
    let mut by_hash: HashMap<H256, Vec<Log>> = HashMap::new();
    for log in logs {
        if let Some(hash) = log.transaction_hash {
            by_hash.entry(hash).or_default().push(log);
        }
    }
    transactions
        .into_iter()
        .map(|mut tx| {
            tx.block_number = block_number;
            tx.logs = by_hash.remove(&tx.hash).unwrap_or_default();
            tx
        })
        .collect()
}

/// Cliente RPC para Ethereum
pub struct VigiaRpcClient {
    transport: TransportType,
    config: RpcConfig,
}

impl VigiaRpcClient {
    /// Cria um novo cliente RPC HTTP
    pub async fn new_http(config: RpcConfig) -> Result<Self> {
        let transport = Http::new(&config.endpoint)
            .map_err(|e| Error::RpcError(format!("Falha ao conectar via HTTP: {}", e)))?;

        let client = Self {
            transport: TransportType::Http(Web3::new(transport)),
            config,
        };
        client.check_connection().await?;
        Ok(client)
    }

    /// Cria um novo cliente RPC WebSocket
    pub async fn new_websocket(config: RpcConfig) -> Result<Self> {
        let transport = WebSocket::new(&config.endpoint)
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao conectar via WebSocket: {}", e)))?;

        let client = Self {
            transport: TransportType::WebSocket(Web3::new(transport)),
            config,
        };
        client.check_connection().await?;
        Ok(client)
    }

    /// Cria um novo cliente baseado na URL
    pub async fn new(config: RpcConfig) -> Result<Self> {
        if config.endpoint.starts_with("ws") {
            Self::new_websocket(config).await
        } else {
            Self::new_http(config).await
        }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    async fn check_connection(&self) -> Result<()> {
        let number = self.get_block_number().await?;
        debug!(endpoint = %self.config.endpoint, block = number, "conectado ao node");
        Ok(())
    }

    /// Aplica o timeout configurado a uma chamada do web3
    async fn timed<T, F>(&self, action: &str, request: F) -> Result<T>
    where
        F: Future<Output = web3::Result<T>>,
    {
        match tokio::time::timeout(self.config.timeout, request).await {
            Ok(result) => result.map_err(|e| Error::RpcError(format!("Falha ao {}: {}", action, e))),
            Err(_) => Err(Error::TimeoutError(format!(
                "{} excedeu {:?}",
                action, self.config.timeout
            ))),
        }
    }

    /// Obtém o número do bloco atual
    pub async fn get_block_number(&self) -> Result<u64> {
        let number = with_web3!(self, web3 => self.timed("obter número do bloco", web3.eth().block_number()).await)?;
        Ok(number.as_u64())
    }

    /// Obtém o cabeçalho de um bloco
    pub async fn get_block(&self, number: u64) -> Result<Option<BlockEvent>> {
        let id = BlockId::Number(BlockNumber::Number(Web3U64::from(number)));
        let block = with_web3!(self, web3 => self.timed("obter bloco", web3.eth().block(id)).await)?;
        Ok(block.map(|b| BlockEvent {
            number,
            hash: b.hash.map(|h| H256::from_slice(h.as_bytes())),
            timestamp: b.timestamp.low_u64(),
        }))
    }

    /// Transações de um bloco com os logs que cada uma emitiu
    pub async fn get_block_transactions(&self, number: u64) -> Result<Vec<TransactionEvent>> {
        let id = BlockId::Number(BlockNumber::Number(Web3U64::from(number)));
        let block = with_web3!(self, web3 => self.timed("obter transações do bloco", web3.eth().block_with_txs(id)).await)?
            .ok_or_else(|| Error::NotFound(format!("Bloco {} não encontrado", number)))?;

        let transactions = block
            .transactions
            .into_iter()
            .map(|tx| TransactionEvent {
                hash: H256::from_slice(tx.hash.as_bytes()),
                block_number: number,
                from: tx.from.map(|a| Address::from_slice(a.as_bytes())).unwrap_or_default(),
                to: tx.to.map(|a| Address::from_slice(a.as_bytes())),
                logs: Vec::new(),
            })
            .collect();

        let logs = self.logs(LogFilter::block(number)).await?;
        Ok(group_logs(number, transactions, logs))
    }

    async fn logs(&self, filter: LogFilter) -> Result<Vec<Log>> {
        let mut builder = FilterBuilder::default()
            .from_block(BlockNumber::Number(Web3U64::from(filter.from_block)))
            .to_block(BlockNumber::Number(Web3U64::from(filter.to_block)));
        if !filter.addresses.is_empty() {
            builder = builder.address(
                filter
                    .addresses
                    .iter()
                    .map(|a| H160::from_slice(a.as_bytes()))
                    .collect(),
            );
        }
        if !filter.topic0.is_empty() {
            builder = builder.topics(
                Some(
                    filter
                        .topic0
                        .iter()
                        .map(|t| web3::types::H256::from_slice(t.as_bytes()))
                        .collect(),
                ),
                None,
                None,
                None,
            );
        }
        let web3_filter = builder.build();

        let logs = with_web3!(self, web3 => self.timed("obter logs", web3.eth().logs(web3_filter.clone())).await)?;
        Ok(logs.into_iter().map(to_ethers_log).collect())
    }
}

/// Implementação da trait RpcProvider do vigia-core
#[async_trait]
impl vigia_core::traits::RpcProvider for VigiaRpcClient {
    async fn call(&self, to: Address, data: Vec<u8>, block: BlockTag) -> Result<Vec<u8>> {
        let call_request = web3::types::CallRequest {
            from: None,
            to: Some(H160::from_slice(to.as_bytes())),
            gas: None,
            gas_price: None,
            value: None,
            data: Some(Bytes(data)),
            transaction_type: None,
            access_list: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
        };
        let block_id = Some(BlockId::Number(to_block_number(block)));

        let result = with_web3!(self, web3 => {
            self.timed("executar eth_call", web3.eth().call(call_request.clone(), block_id)).await
        })?;

        Ok(result.0)
    }

    async fn get_logs(&self, filter: LogFilter) -> Result<Vec<Log>> {
        self.logs(filter).await
    }

    async fn get_code(&self, address: Address, block: BlockTag) -> Result<Vec<u8>> {
        let address = H160::from_slice(address.as_bytes());
        let code = with_web3!(self, web3 => {
            self.timed("obter código do contrato", web3.eth().code(address, Some(to_block_number(block)))).await
        })?;
        Ok(code.0)
    }

    async fn get_block_number(&self) -> Result<u64> {
        VigiaRpcClient::get_block_number(self).await
    }

    async fn chain_id(&self) -> Result<u64> {
        let id = with_web3!(self, web3 => self.timed("obter chain id", web3.eth().chain_id()).await)?;
        Ok(id.low_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_of(tx: H256, index: u64) -> Log {
        Log {
            transaction_hash: Some(tx),
            log_index: Some(index.into()),
            ..Default::default()
        }
    }

    #[test]
    fn block_tags_map_to_web3() {
        assert_eq!(to_block_number(BlockTag::Number(26)), BlockNumber::Number(Web3U64::from(26u64)));
        assert_eq!(to_block_number(BlockTag::Latest), BlockNumber::Latest);
        assert_eq!(to_block_number(BlockTag::Pending), BlockNumber::Pending);
        assert_eq!(to_block_number(BlockTag::Earliest), BlockNumber::Earliest);
    }

    #[test]
    fn web3_logs_keep_their_fields() {
        let raw = web3::types::Log {
            address: H160::repeat_byte(0x0a),
            topics: vec![web3::types::H256::repeat_byte(0x01)],
            data: Bytes(vec![1, 2, 3]),
            block_hash: None,
            block_number: Some(Web3U64::from(12u64)),
            transaction_hash: Some(web3::types::H256::repeat_byte(0x02)),
            transaction_index: Some(Web3U64::from(3u64)),
            log_index: None,
            transaction_log_index: None,
            log_type: None,
            removed: Some(false),
        };
        let log = to_ethers_log(raw);
        assert_eq!(log.address, Address::repeat_byte(0x0a));
        assert_eq!(log.topics, vec![H256::repeat_byte(0x01)]);
        assert_eq!(log.data.to_vec(), vec![1, 2, 3]);
        assert_eq!(log.block_number, Some(U64::from(12u64)));
        assert_eq!(log.transaction_hash, Some(H256::repeat_byte(0x02)));
    }

    #[test]
    fn logs_are_grouped_by_transaction() {
        let a = H256::repeat_byte(0xaa);
        let b = H256::repeat_byte(0xbb);
        let txs = vec![TransactionEvent::new(a, 0), TransactionEvent::new(b, 0)];
        let logs = vec![log_of(b, 0), log_of(a, 1), log_of(b, 2), Log::default()];

        let grouped = group_logs(9, txs, logs);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].hash, a);
        assert_eq!(grouped[0].logs.len(), 1);
        assert_eq!(grouped[1].logs.len(), 2);
        assert_eq!(grouped[1].logs[1].log_index, Some(2u64.into()));
        assert!(grouped.iter().all(|tx| tx.block_number == 9));
    }
}
