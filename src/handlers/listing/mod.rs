pub mod collection_get;
pub mod collections_get;

pub use collection_get::get as collection_get;
pub use collections_get::get as collections_get;
