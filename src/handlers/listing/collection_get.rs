use axum::extract::{Path, RawQuery, State};
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::filter::{Filter, QueryParameters};
use crate::middleware::{ApiResult, IntoApiResponse};

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    /// Records in this page.
    pub count: usize,
    /// Records matching the filter before pagination.
    pub total: u64,
    pub limit: u64,
    pub skip: u64,
    pub data: Vec<Value>,
}

/// GET /api/:collection - Filtered, sorted, paginated listing
///
/// Recognized filter parameters depend on the collection; `sortBy`, `order`,
/// `limit` and `skip` (alias `offset`) apply everywhere.
pub async fn get(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    RawQuery(raw): RawQuery,
) -> ApiResult<ListingResponse> {
    let schema = state.catalog.get(&collection)?;
    let params = QueryParameters::parse(raw.as_deref().unwrap_or_default());
    let query = Filter::new(schema, state.options).build(&params)?;

    let page = state.executor.find(schema, &query).await?;
    tracing::debug!(collection = %collection, total = page.total, returned = page.records.len(), "listing served");

    Ok(ListingResponse {
        count: page.records.len(),
        total: page.total,
        limit: query.page.limit,
        skip: query.page.skip,
        data: page.records,
    }
    .into_api_response())
}
