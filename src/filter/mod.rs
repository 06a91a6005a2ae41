pub mod types;
pub mod params;
pub mod filter;
pub mod filter_compose;
pub mod filter_where;
pub mod filter_order;
pub mod filter_match;
pub mod error;

pub use types::*;
pub use error::QueryError;
pub use filter::Filter;
pub use params::QueryParameters;
