pub mod entities;
pub mod helpers;
pub mod interfaces;
pub mod memory;
pub mod sqlite;

pub use helpers::{normalize_legacy, normalize_legacy_batch};
pub use interfaces::{RecordError, TradeRepository};
pub use memory::MemoryTradeRepository;
pub use sqlite::SqliteTradeRepository;
