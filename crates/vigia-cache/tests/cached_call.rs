use async_trait::async_trait;
use ethereum_types::{Address, U256};
use ethers::abi::{encode, Token};
use ethers::types::Log;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vigia_cache::{CacheConfig, CachedCall};
use vigia_core::error::{Error, Result};
use vigia_core::traits::RpcProvider;
use vigia_core::types::{BlockTag, LogFilter};

const GET_RESERVES: &str =
    "function getReserves() view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)";

/// Responde getReserves com (50, 70) no bloco 10 e (1, 2) nos demais
struct CountingProvider {
    calls: Arc<AtomicUsize>,
    revert: bool,
}

fn reserves(r0: u64, r1: u64) -> Vec<u8> {
    encode(&[Token::Uint(r0.into()), Token::Uint(r1.into()), Token::Uint(0u64.into())])
}

#[async_trait]
impl RpcProvider for CountingProvider {
    async fn call(&self, _to: Address, _data: Vec<u8>, block: BlockTag) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.revert {
            return Ok(vec![]);
        }
        Ok(match block {
            BlockTag::Number(10) => reserves(50, 70),
            _ => reserves(1, 2),
        })
    }
    async fn get_logs(&self, _filter: LogFilter) -> Result<Vec<Log>> { Ok(vec![]) }
    async fn get_code(&self, _address: Address, _block: BlockTag) -> Result<Vec<u8>> { Ok(vec![]) }
    async fn get_block_number(&self) -> Result<u64> { Ok(0) }
    async fn chain_id(&self) -> Result<u64> { Ok(1) }
}

fn setup(capacity: usize, revert: bool) -> (CachedCall<CountingProvider>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = Arc::new(CountingProvider { calls: calls.clone(), revert });
    let call = CachedCall::new(provider, GET_RESERVES, &CacheConfig::with_capacity(capacity)).unwrap();
    (call, calls)
}

fn as_uint(token: &Token) -> U256 {
    token.clone().into_uint().unwrap()
}

#[tokio::test]
async fn lru_scenario_with_capacity_two() {
    let (reserves_call, calls) = setup(2, false);
    let block = BlockTag::Number(10);
    let k1 = Address::repeat_byte(0x01);
    let k2 = Address::repeat_byte(0x02);
    let k3 = Address::repeat_byte(0x03);

    for pool in [k1, k2, k3] {
        reserves_call.call(pool, block, &[]).await.unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(!reserves_call.fetcher().store().has(&reserves_call.key(k1, block, &[])));

    let out = reserves_call.call(k1, block, &[]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(as_uint(&out[0]), U256::from(50u64));
    assert_eq!(as_uint(&out[1]), U256::from(70u64));
}

#[tokio::test]
async fn repeated_calls_hit_the_cache() {
    let (reserves_call, calls) = setup(16, false);
    let pool = Address::repeat_byte(0xaa);

    let first = reserves_call.call(pool, BlockTag::Number(10), &[]).await.unwrap();
    let second = reserves_call.call(pool, "0xa".parse().unwrap(), &[]).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let other_block = reserves_call.call(pool, BlockTag::Number(11), &[]).await.unwrap();
    assert_eq!(as_uint(&other_block[0]), U256::from(1u64));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_output_is_an_error_and_not_cached() {
    let (reserves_call, calls) = setup(16, true);
    let pool = Address::repeat_byte(0xbb);

    for _ in 0..2 {
        let err = reserves_call.call(pool, BlockTag::Number(10), &[]).await.unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(reserves_call.fetcher().store().is_empty());
}

#[tokio::test]
async fn latest_always_reaches_the_node() {
    let (reserves_call, calls) = setup(16, false);
    let pool = Address::repeat_byte(0xcc);

    reserves_call.call(pool, BlockTag::Latest, &[]).await.unwrap();
    reserves_call.call(pool, BlockTag::Latest, &[]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(reserves_call.stats().bypassed, 2);
}

#[tokio::test]
async fn arguments_are_part_of_the_key() {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = Arc::new(CountingProvider { calls: calls.clone(), revert: false });
    let balance_of = CachedCall::new(
        provider,
        "function balanceOf(address owner) view returns (uint256)",
        &CacheConfig::default(),
    )
    .unwrap();
    let token = Address::repeat_byte(0x10);
    let block = BlockTag::Number(5);

    // a resposta do mock tem 3 words; o decoder usa apenas a primeira
    balance_of.call(token, block, &[Token::Address(Address::repeat_byte(1))]).await.unwrap();
    balance_of.call(token, block, &[Token::Address(Address::repeat_byte(2))]).await.unwrap();
    balance_of.call(token, block, &[Token::Address(Address::repeat_byte(1))]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn invalid_signature_is_rejected() {
    let provider = Arc::new(CountingProvider { calls: Arc::new(AtomicUsize::new(0)), revert: false });
    let result = CachedCall::new(provider, "function getReserves(uint256", &CacheConfig::default());
    assert!(matches!(result, Err(Error::EncodeError(_))));
}
