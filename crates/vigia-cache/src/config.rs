use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use vigia_core::{error::Result, Error};

/// Capacidade padrão, igual à dos fetchers de produção
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Configuração de um cache por bloco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Capacidade validada; zero não é aceito
    pub fn capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity)
            .ok_or_else(|| Error::ValidationError("capacidade do cache deve ser maior que zero".to_string()))
    }
}
