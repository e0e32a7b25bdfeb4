/*!
 * Vigia Core
 * 
 * Tipos e utilitários compartilhados para a workspace Vigia
 */

pub mod types;
pub mod events;
pub mod traits;
pub mod utils;
pub mod network;
pub mod error;

// Re-exportações públicas
pub use error::Error;
pub use types::*;
pub use events::{BlockEvent, DecodedLog, TransactionEvent};
pub use network::NetworkManager;
