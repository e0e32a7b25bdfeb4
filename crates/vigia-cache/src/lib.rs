/*!
 * Vigia Cache
 *
 * Cache read-through indexado por bloco para leituras de contrato.
 * Uma leitura em um bloco histórico é imutável, então cada combinação
 * (contrato, bloco, método, argumentos) é buscada no node no máximo uma vez
 * enquanto permanecer no cache.
 */

pub mod config;
pub mod fetcher;
pub mod key;
pub mod reader;
pub mod store;

pub use config::{CacheConfig, DEFAULT_CACHE_CAPACITY};
pub use fetcher::{BlockFetcher, FetcherStats};
pub use key::{CacheKey, CacheKeyBuilder, KeyPart};
pub use reader::{parse_function, CachedCall, ContractReader};
pub use store::CacheStore;
