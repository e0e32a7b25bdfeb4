pub mod fee_change;
pub mod large_lp;
pub mod large_swap;
pub mod ownership_transfer;

pub use fee_change::{FeeChange, FeeChangeBot};
pub use large_lp::{LargeLpBot, LpEvent};
pub use large_swap::{LargeSwapBot, SwapEvent};
pub use ownership_transfer::OwnershipTransferBot;
