use std::sync::Arc;

use ethereum_types::Address;
use ethers::abi::{AbiParser, Function, Token};
use tracing::trace;
use vigia_core::error::{Error, Result};
use vigia_core::traits::RpcProvider;
use vigia_core::types::BlockTag;

use crate::config::CacheConfig;
use crate::fetcher::{BlockFetcher, FetcherStats};
use crate::key::CacheKey;

/// Faz o parse de uma assinatura legível de função
/// (`function getReserves() view returns (uint112,uint112,uint32)`)
pub fn parse_function(signature: &str) -> Result<Function> {
    AbiParser::default()
        .parse_function(signature)
        .map_err(|e| Error::EncodeError(format!("assinatura de função inválida `{}`: {}", signature, e)))
}

/// Leitor de contratos via `eth_call` em um bloco específico.
///
/// Não faz retry nem aplica valores padrão: qualquer falha do provider ou da
/// decodificação é devolvida ao chamador.
pub struct ContractReader<P: ?Sized> {
    provider: Arc<P>,
}

impl<P: ?Sized> Clone for ContractReader<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: RpcProvider + ?Sized> ContractReader<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Executa `function` em `contract` no estado de `block`
    pub async fn read(&self, contract: Address, function: &Function, block: BlockTag, args: &[Token]) -> Result<Vec<Token>> {
        let data = function
            .encode_input(args)
            .map_err(|e| Error::EncodeError(format!("{}: {}", function.name, e)))?;

        trace!(contract = ?contract, method = %function.name, block = %block, "eth_call");
        let out = self.provider.call(contract, data, block).await?;

        if out.is_empty() && !function.outputs.is_empty() {
            return Err(Error::DecodeError(format!(
                "{} retornou vazio em {:?} no bloco {}",
                function.name, contract, block
            )));
        }

        function
            .decode_output(&out)
            .map_err(|e| Error::DecodeError(format!("{}: {}", function.name, e)))
    }
}

/// Leitura memorizada de uma única função de contrato.
///
/// A chave é composta por contrato, bloco, nome da função e argumentos.
pub struct CachedCall<P: ?Sized> {
    reader: ContractReader<P>,
    function: Function,
    fetcher: BlockFetcher<Vec<Token>>,
}

impl<P: RpcProvider + ?Sized> CachedCall<P> {
    pub fn new(provider: Arc<P>, signature: &str, config: &CacheConfig) -> Result<Self> {
        let function = parse_function(signature)?;
        let fetcher = BlockFetcher::from_config(function.name.clone(), config)?;
        Ok(Self {
            reader: ContractReader::new(provider),
            function,
            fetcher,
        })
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn key(&self, contract: Address, block: BlockTag, args: &[Token]) -> CacheKey {
        CacheKey::builder(contract, block)
            .method(&self.function.name)
            .tokens(args)
            .build()
    }

    pub async fn call(&self, contract: Address, block: BlockTag, args: &[Token]) -> Result<Vec<Token>> {
        let key = self.key(contract, block, args);
        self.fetcher
            .fetch(key, block, || self.reader.read(contract, &self.function, block, args))
            .await
    }

    pub fn stats(&self) -> FetcherStats {
        self.fetcher.stats()
    }

    pub fn fetcher(&self) -> &BlockFetcher<Vec<Token>> {
        &self.fetcher
    }
}
