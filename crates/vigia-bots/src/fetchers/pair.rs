use ethereum_types::{Address, H256, U256};
use ethers::abi::Token;
use std::sync::Arc;
use vigia_cache::{CacheConfig, CachedCall};
use vigia_core::error::{Error, Result};
use vigia_core::traits::RpcProvider;
use vigia_core::types::BlockTag;
use vigia_core::utils::{calculate_create2_address, keccak256};

pub const TOKEN0: &str = "function token0() view returns (address)";
pub const TOKEN1: &str = "function token1() view returns (address)";
pub const GET_RESERVES: &str =
    "function getReserves() view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)";
pub const TOTAL_SUPPLY: &str = "function totalSupply() view returns (uint256)";
pub const BALANCE_OF: &str = "function balanceOf(address account) view returns (uint256)";

/// Reservas de um par Uniswap V2-like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reserves {
    pub reserve0: U256,
    pub reserve1: U256,
    pub block_timestamp_last: u32,
}

/// Endereço do par de `token_a`/`token_b` criado pela factory via CREATE2.
///
/// A ordem dos tokens não importa; o salt usa o menor endereço primeiro.
pub fn pair_create2_address(factory: Address, init_code_hash: H256, token_a: Address, token_b: Address) -> Address {
    let (token0, token1) = if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    let mut packed = Vec::with_capacity(40);
    packed.extend_from_slice(token0.as_bytes());
    packed.extend_from_slice(token1.as_bytes());
    let salt = H256::from(keccak256(&packed));
    calculate_create2_address(&factory, &salt, &init_code_hash)
}

/// Leituras de pares e tokens ERC20 memorizadas por bloco
pub struct PairFetcher<P: ?Sized> {
    token0: CachedCall<P>,
    token1: CachedCall<P>,
    reserves: CachedCall<P>,
    total_supply: CachedCall<P>,
    balance_of: CachedCall<P>,
}

impl<P: RpcProvider + ?Sized> PairFetcher<P> {
    pub fn new(provider: Arc<P>, config: &CacheConfig) -> Result<Self> {
        Ok(Self {
            token0: CachedCall::new(Arc::clone(&provider), TOKEN0, config)?,
            token1: CachedCall::new(Arc::clone(&provider), TOKEN1, config)?,
            reserves: CachedCall::new(Arc::clone(&provider), GET_RESERVES, config)?,
            total_supply: CachedCall::new(Arc::clone(&provider), TOTAL_SUPPLY, config)?,
            balance_of: CachedCall::new(provider, BALANCE_OF, config)?,
        })
    }

    pub async fn token0(&self, pair: Address, block: BlockTag) -> Result<Address> {
        let out = self.token0.call(pair, block, &[]).await?;
        address_at(out, 0, "token0")
    }

    pub async fn token1(&self, pair: Address, block: BlockTag) -> Result<Address> {
        let out = self.token1.call(pair, block, &[]).await?;
        address_at(out, 0, "token1")
    }

    pub async fn tokens(&self, pair: Address, block: BlockTag) -> Result<(Address, Address)> {
        tokio::try_join!(self.token0(pair, block), self.token1(pair, block))
    }

    pub async fn reserves(&self, pair: Address, block: BlockTag) -> Result<Reserves> {
        let out = self.reserves.call(pair, block, &[]).await?;
        Ok(Reserves {
            reserve0: uint_at(&out, 0, "getReserves")?,
            reserve1: uint_at(&out, 1, "getReserves")?,
            block_timestamp_last: uint_at(&out, 2, "getReserves")?.low_u32(),
        })
    }

    pub async fn total_supply(&self, token: Address, block: BlockTag) -> Result<U256> {
        let out = self.total_supply.call(token, block, &[]).await?;
        uint_at(&out, 0, "totalSupply")
    }

    pub async fn balance_of(&self, token: Address, holder: Address, block: BlockTag) -> Result<U256> {
        let out = self.balance_of.call(token, block, &[Token::Address(holder)]).await?;
        uint_at(&out, 0, "balanceOf")
    }
}

fn address_at(out: Vec<Token>, index: usize, method: &str) -> Result<Address> {
    out.into_iter()
        .nth(index)
        .and_then(Token::into_address)
        .ok_or_else(|| Error::DecodeError(format!("{} não retornou address na posição {}", method, index)))
}

fn uint_at(out: &[Token], index: usize, method: &str) -> Result<U256> {
    out.get(index)
        .cloned()
        .and_then(Token::into_uint)
        .ok_or_else(|| Error::DecodeError(format!("{} não retornou uint na posição {}", method, index)))
}
