/*!
 * Vigia Network
 *
 * Seleção de configuração por chain id
 */

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::traits::RpcProvider;

/// Mapa de configurações por rede, com uma rede ativa.
#[derive(Debug, Clone)]
pub struct NetworkManager<T> {
    network_map: HashMap<u64, T>,
    chain_id: Option<u64>,
}

impl<T> NetworkManager<T> {
    /// Cria o gerenciador. Se `chain_id` for informado ele precisa existir no mapa.
    pub fn new(network_map: HashMap<u64, T>, chain_id: Option<u64>) -> Result<Self> {
        let mut manager = Self {
            network_map,
            chain_id: None,
        };
        if let Some(id) = chain_id {
            manager.set_network(id)?;
        }
        Ok(manager)
    }

    /// Define a rede a partir do chain id informado pelo node
    pub async fn init<P: RpcProvider + ?Sized>(&mut self, provider: &P) -> Result<()> {
        let chain_id = provider.chain_id().await?;
        self.set_network(chain_id)
    }

    pub fn set_network(&mut self, chain_id: u64) -> Result<()> {
        if !self.network_map.contains_key(&chain_id) {
            return Err(Error::UnsupportedNetwork(chain_id));
        }
        self.chain_id = Some(chain_id);
        Ok(())
    }

    /// Rede ativa, se já definida
    pub fn network(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn networks(&self) -> impl Iterator<Item = &u64> {
        self.network_map.keys()
    }

    /// Configuração da rede ativa
    pub fn get(&self) -> Result<&T> {
        let id = self
            .chain_id
            .ok_or_else(|| Error::ConfigError("nenhuma rede definida".to_string()))?;
        self.network_map.get(&id).ok_or(Error::UnsupportedNetwork(id))
    }
}
