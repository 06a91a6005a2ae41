pub mod executor;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

pub use executor::{ListPage, QueryExecutor};
pub use manager::{connect, DatabaseError};
pub use memory::MemoryExecutor;
pub use postgres::PgExecutor;
