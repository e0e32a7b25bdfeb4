/*!
 * Vigia Bots
 *
 * Bots de detecção para protocolos DeFi. Cada bot observa transações ou
 * blocos e emite `Finding`s; leituras de estado passam pelos fetchers com
 * cache por bloco de `vigia-cache`.
 */

pub mod bots;
pub mod config;
pub mod fetchers;
pub mod registry;

pub use bots::*;
pub use config::BotsConfig;
pub use fetchers::{pair_create2_address, PairFetcher, Reserves};
pub use registry::BotRegistry;
