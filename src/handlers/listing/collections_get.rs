use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::ParamBinding;
use crate::filter::SortSpec;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    pub params: Vec<ParamBinding>,
    pub sortable: Vec<String>,
    pub default_sort: SortSpec,
}

/// GET /api/collections - What can be listed and how
pub async fn get(State(state): State<AppState>) -> ApiResult<Vec<CollectionSummary>> {
    let summaries = state
        .catalog
        .iter()
        .map(|schema| CollectionSummary {
            name: schema.name().to_string(),
            params: schema.params().to_vec(),
            sortable: schema.sortable_fields().to_vec(),
            default_sort: schema.default_sort_spec().clone(),
        })
        .collect();

    Ok(ApiResponse::success(summaries))
}
