pub mod collections;
pub mod explain;
pub mod query;
