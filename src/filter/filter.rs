use serde_json::Value;

use crate::database::models::CollectionSchema;

use super::error::QueryError;
use super::filter_order::FilterOrder;
use super::filter_compose::FilterCompose;
use super::filter_where::FilterWhere;
use super::params::{normalize, QueryParameters};
use super::types::{FilterOptions, ListingQuery, SqlResult};

/// Turns raw query parameters into a `ListingQuery` for one collection.
pub struct Filter<'a> {
    schema: &'a CollectionSchema,
    options: FilterOptions,
}

impl<'a> Filter<'a> {
    pub fn new(schema: &'a CollectionSchema, options: FilterOptions) -> Self {
        Self { schema, options }
    }

    pub fn build(&self, params: &QueryParameters) -> Result<ListingQuery, QueryError> {
        let normalized = normalize(params, self.schema, self.options.param_mode)?;

        let filter = FilterCompose::new(self.options.precedence).compose(&normalized.filters);
        let sort = FilterOrder::resolve_sort(self.schema, normalized.sort_by.as_deref(), normalized.order.as_deref());
        let page = FilterOrder::resolve_page(normalized.limit, normalized.skip, &self.options);

        let query = ListingQuery { filter, sort, page };
        if self.options.debug_logging {
            tracing::debug!(
                collection = self.schema.name(),
                query = %serde_json::to_string(&query).unwrap_or_default(),
                "built listing query"
            );
        }
        Ok(query)
    }
}

impl ListingQuery {
    /// `SELECT` for one page, each row folded into a JSON object.
    pub fn to_sql(&self, table_name: &str) -> SqlResult {
        let (where_clause, mut params) = FilterWhere::generate(&self.filter, 0);
        let order_clause = FilterOrder::generate(&self.sort);
        let limit_index = params.len() + 1;
        params.push(Value::from(self.page.limit));
        params.push(Value::from(self.page.skip));

        let inner = [
            format!("SELECT * FROM \"{}\"", table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            format!("LIMIT ${} OFFSET ${}", limit_index, limit_index + 1),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult {
            query: format!("SELECT row_to_json(t) AS record FROM ({}) t", inner),
            params,
        }
    }

    pub fn to_count_sql(&self, table_name: &str) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.filter, 0);
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) as count FROM \"{}\"", table_name)
        } else {
            format!("SELECT COUNT(*) as count FROM \"{}\" WHERE {}", table_name, where_clause)
        };
        SqlResult { query, params }
    }
}
