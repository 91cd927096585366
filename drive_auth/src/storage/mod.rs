mod memory;
mod sqlite;
mod store_type;

pub use memory::MemoryTokenStore;
pub use sqlite::SqliteTokenStore;
pub use store_type::TokenStore;
