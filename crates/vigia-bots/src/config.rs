/*!
 * Configuração dos bots
 *
 * Arquivo JSON com uma seção por bot, cada uma indexada pelo chain id.
 */

use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use vigia_cache::CacheConfig;
use vigia_core::error::{Error, Result};
use vigia_core::NetworkManager;

/// Configuração distribuída com a crate
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipTransferConfig {
    pub contracts: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeChangeConfig {
    pub protocol_fees_collector: Address,
}

/// Factory e init code hash usados para validar pares via CREATE2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairFactory {
    pub factory: Address,
    pub init_code_hash: H256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeLpConfig {
    #[serde(flatten)]
    pub pair_factory: PairFactory,
    /// totalSupply mínimo do pool, em unidades do LP token
    pub pool_supply_threshold: U256,
    pub amount_threshold_percentage: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeSwapConfig {
    #[serde(flatten)]
    pub pair_factory: PairFactory,
    pub threshold_percentage: u64,
}

/// Configuração de todos os bots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotsConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub ownership_transfer: HashMap<u64, OwnershipTransferConfig>,
    #[serde(default)]
    pub fee_change: HashMap<u64, FeeChangeConfig>,
    #[serde(default)]
    pub large_lp: HashMap<u64, LargeLpConfig>,
    #[serde(default)]
    pub large_swap: HashMap<u64, LargeSwapConfig>,
}

impl BotsConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("falha ao ler {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Endereços e limites distribuídos com a crate
    pub fn shipped() -> Result<Self> {
        Self::from_json_str(DEFAULT_CONFIG)
    }

    fn validate(&self) -> Result<()> {
        self.cache.capacity()?;
        let percentages = self
            .large_lp
            .values()
            .map(|c| c.amount_threshold_percentage)
            .chain(self.large_swap.values().map(|c| c.threshold_percentage));
        for pct in percentages {
            if pct == 0 || pct > 100 {
                return Err(Error::ConfigError(format!("percentual fora de 1..=100: {}", pct)));
            }
        }
        Ok(())
    }
}

/// Configuração de uma seção para a rede informada, se existir
pub fn for_network<T: Clone>(section: &HashMap<u64, T>, chain_id: u64) -> Option<T> {
    let manager = NetworkManager::new(section.clone(), Some(chain_id)).ok()?;
    manager.get().ok().cloned()
}
