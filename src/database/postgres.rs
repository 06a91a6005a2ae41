use async_trait::async_trait;
use serde_json::Value;
use sqlx::{self, postgres::PgArguments, PgPool, Row};

use crate::database::executor::{ListPage, QueryExecutor};
use crate::database::manager::DatabaseError;
use crate::database::models::CollectionSchema;
use crate::filter::{ListingQuery, SqlResult};

/// Runs listing queries against PostgreSQL tables named after collections.
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn select_all(&self, sql_result: &SqlResult) -> Result<Vec<Value>, DatabaseError> {
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<Value, _>("record").map_err(DatabaseError::from))
            .collect()
    }

    async fn count(&self, sql_result: &SqlResult) -> Result<u64, DatabaseError> {
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn find(&self, collection: &CollectionSchema, query: &ListingQuery) -> Result<ListPage, DatabaseError> {
        let page_sql = query.to_sql(collection.name());
        let count_sql = query.to_count_sql(collection.name());
        tracing::debug!(sql = %page_sql.query, params = page_sql.params.len(), "listing query");

        let records = self.select_all(&page_sql).await?;
        let total = self.count(&count_sql).await?;
        Ok(ListPage { records, total })
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
        Ok(())
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                // Postgres doesn't have u64; saturate
                q.bind(i64::try_from(u).unwrap_or(i64::MAX))
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Predicates only ever produce scalar parameters.
        Value::Array(_) | Value::Object(_) => q.bind(v),
    }
}
