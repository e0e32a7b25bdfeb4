#![allow(dead_code)]

use async_trait::async_trait;
use ethereum_types::{Address, H256, U64};
use ethers::abi::{encode, Token};
use ethers::types::{Bytes, Log};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use vigia_cache::parse_function;
use vigia_core::error::{Error, Result};
use vigia_core::events::parse_event;
use vigia_core::traits::RpcProvider;
use vigia_core::types::{BlockTag, LogFilter};

/// Provider com respostas registradas por (contrato, calldata, bloco).
/// Chamadas sem resposta registrada falham como um revert.
#[derive(Default)]
pub struct MockProvider {
    calls: AtomicUsize,
    responses: Mutex<HashMap<(Address, Vec<u8>, BlockTag), Vec<u8>>>,
    logs: Mutex<Vec<Log>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_call(&self, to: Address, signature: &str, args: &[Token], block: u64, outputs: &[Token]) {
        let function = parse_function(signature).unwrap();
        let data = function.encode_input(args).unwrap();
        self.responses
            .lock()
            .unwrap()
            .insert((to, data, BlockTag::Number(block)), encode(outputs));
    }

    pub fn add_log(&self, log: Log) {
        self.logs.lock().unwrap().push(log);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RpcProvider for MockProvider {
    async fn call(&self, to: Address, data: Vec<u8>, block: BlockTag) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(&(to, data, block))
            .cloned()
            .ok_or_else(|| Error::RpcError("execution reverted".into()))
    }

    async fn get_logs(&self, filter: LogFilter) -> Result<Vec<Log>> {
        // como um node real, devolve apenas os logs do intervalo e dos emissores pedidos
        let logs = self.logs.lock().unwrap();
        Ok(logs
            .iter()
            .filter(|log| {
                let number = log.block_number.map(|n| n.as_u64()).unwrap_or_default();
                number >= filter.from_block && number <= filter.to_block
            })
            .filter(|log| filter.addresses.is_empty() || filter.addresses.contains(&log.address))
            .cloned()
            .collect())
    }

    async fn get_code(&self, _address: Address, _block: BlockTag) -> Result<Vec<u8>> {
        Ok(vec![])
    }

    async fn get_block_number(&self) -> Result<u64> {
        Ok(0)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(1)
    }
}

/// Log do evento `signature` com tópicos indexados e dados já codificados
pub fn event_log(emitter: Address, signature: &str, indexed: &[H256], data: &[Token], block: u64) -> Log {
    let event = parse_event(signature).unwrap();
    let mut topics = vec![event.signature()];
    topics.extend_from_slice(indexed);
    Log {
        address: emitter,
        topics,
        data: Bytes::from(encode(data)),
        block_number: Some(U64::from(block)),
        ..Default::default()
    }
}

pub fn topic(address: Address) -> H256 {
    H256::from(address)
}

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}
