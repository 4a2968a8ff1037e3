// Service exports
pub mod anthropic;
pub mod memory;
pub mod postgres;
pub mod store;

pub use anthropic::{AnthropicClient, TextGenError, TextGenerator};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use store::{BriefSource, ResultStore, StoreError, VenueCatalog};
