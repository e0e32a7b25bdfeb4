pub mod pair;

pub use pair::{pair_create2_address, PairFetcher, Reserves};
