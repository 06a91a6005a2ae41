use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::database::manager::DatabaseError;
use crate::database::models::CollectionSchema;
use crate::filter::ListingQuery;

/// One page of records plus the number of records matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListPage {
    pub records: Vec<Value>,
    pub total: u64,
}

/// The store a listing query runs against.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn find(&self, collection: &CollectionSchema, query: &ListingQuery) -> Result<ListPage, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
