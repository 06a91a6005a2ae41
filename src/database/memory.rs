use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::executor::{ListPage, QueryExecutor};
use crate::database::manager::DatabaseError;
use crate::database::models::CollectionSchema;
use crate::filter::{ListingQuery, Scalar, SortDirection, SortSpec};

const FIXTURES: &[(&str, &str)] = &[
    ("students", include_str!("../../fixtures/students.json")),
    ("grades", include_str!("../../fixtures/grades.json")),
    ("products", include_str!("../../fixtures/products.json")),
];

/// Collections of JSON records held in process memory.
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the fixture files bundled with the crate.
    pub fn with_fixtures() -> Result<Self, DatabaseError> {
        let mut collections = HashMap::new();
        for (name, raw) in FIXTURES {
            let parsed: Value = serde_json::from_str(raw)
                .map_err(|e| DatabaseError::QueryError(format!("fixture {}: {}", name, e)))?;
            collections.insert(name.to_string(), prepare_records(parsed)?);
        }
        Ok(Self { collections: RwLock::new(collections) })
    }

    pub fn from_records<I>(collections: I) -> Result<Self, DatabaseError>
    where
        I: IntoIterator<Item = (String, Vec<Value>)>,
    {
        let mut map = HashMap::new();
        for (name, records) in collections {
            map.insert(name, prepare_records(Value::Array(records))?);
        }
        Ok(Self { collections: RwLock::new(map) })
    }

    /// Append records, filling in `id` and `created_at` when absent.
    pub async fn insert_many(&self, collection: &str, records: Vec<Value>) -> Result<usize, DatabaseError> {
        let prepared = prepare_records(Value::Array(records))?;
        let count = prepared.len();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .extend(prepared);
        Ok(count)
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn find(&self, collection: &CollectionSchema, query: &ListingQuery) -> Result<ListPage, DatabaseError> {
        let guard = self.collections.read().await;
        let Some(records) = guard.get(collection.name()) else {
            return Ok(ListPage::default());
        };

        let mut matched: Vec<&Value> = records.iter().filter(|r| query.filter.matches(r)).collect();
        // Stable: ties keep insertion order.
        matched.sort_by(|a, b| compare_records(a, b, &query.sort));

        let total = matched.len() as u64;
        let skip = usize::try_from(query.page.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.limit).unwrap_or(usize::MAX);
        let records = matched.into_iter().skip(skip).take(limit).cloned().collect();

        Ok(ListPage { records, total })
    }
}

fn prepare_records(value: Value) -> Result<Vec<Value>, DatabaseError> {
    let Value::Array(items) = value else {
        return Err(DatabaseError::QueryError("records must be a JSON array".to_string()));
    };
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(mut obj) => {
                obj.entry("id").or_insert_with(|| Value::from(Uuid::new_v4().to_string()));
                obj.entry("created_at").or_insert_with(|| Value::from(now.clone()));
                Ok(Value::Object(obj))
            }
            other => Err(DatabaseError::QueryError(format!("record must be a JSON object, got {}", other))),
        })
        .collect()
}

// Numbers, then text, then missing values when ascending. Descending reverses
// the whole order, matching NULLS LAST / NULLS FIRST.
fn compare_records(a: &Value, b: &Value, sort: &SortSpec) -> Ordering {
    let key = |r: &Value| r.get(&sort.field).and_then(Scalar::from_value);
    let ordering = match (key(a), key(b)) {
        (Some(x), Some(y)) => x.sort_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::catalog::students;
    use crate::filter::{Filter, FilterOptions, QueryParameters};
    use serde_json::json;

    fn ages_fixture() -> MemoryExecutor {
        let records: Vec<Value> = [15, 18, 25, 30, 40]
            .iter()
            .enumerate()
            .map(|(i, age)| json!({ "name": format!("student{}", i), "city": "Springfield", "age": age }))
            .collect();
        MemoryExecutor::from_records([("students".to_string(), records)]).unwrap()
    }

    async fn run(executor: &MemoryExecutor, raw: &str) -> ListPage {
        let schema = students();
        let query = Filter::new(&schema, FilterOptions::default())
            .build(&QueryParameters::parse(raw))
            .unwrap();
        executor.find(&schema, &query).await.unwrap()
    }

    fn ages(page: &ListPage) -> Vec<i64> {
        page.records.iter().filter_map(|r| r["age"].as_i64()).collect()
    }

    #[tokio::test]
    async fn range_sort_and_page_scenario() {
        let page = run(&ages_fixture(), "?minAge=18&maxAge=30&sortBy=age&order=asc&limit=2&skip=0").await;
        assert_eq!(ages(&page), vec![18, 25]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn descending_with_skip() {
        let page = run(&ages_fixture(), "sortBy=age&order=desc&limit=2&skip=1").await;
        assert_eq!(ages(&page), vec![30, 25]);
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn empty_query_returns_everything_in_creation_order() {
        let page = run(&ages_fixture(), "").await;
        assert_eq!(ages(&page), vec![15, 18, 25, 30, 40]);
    }

    #[tokio::test]
    async fn skip_past_end_is_empty_but_counts() {
        let page = run(&ages_fixture(), "skip=50").await;
        assert!(page.records.is_empty());
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn insert_fills_id_and_created_at() {
        let executor = MemoryExecutor::new();
        let inserted = executor.insert_many("students", vec![json!({ "name": "Anna", "age": 20 })]).await.unwrap();
        assert_eq!(inserted, 1);
        let page = run(&executor, "").await;
        assert!(page.records[0]["id"].is_string());
        assert!(page.records[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn rejects_non_object_records() {
        let executor = MemoryExecutor::new();
        assert!(executor.insert_many("students", vec![json!(42)]).await.is_err());
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let executor = MemoryExecutor::new();
        let page = run(&executor, "").await;
        assert_eq!(page, ListPage::default());
    }

    fn mixed_ages_fixture() -> MemoryExecutor {
        let records: Vec<Value> = (0..64)
            .map(|i| match i {
                i if i % 3 == 0 => json!({ "name": format!("student{}", i), "age": i.to_string() }),
                i if i % 5 == 0 => json!({ "name": format!("student{}", i) }),
                i => json!({ "name": format!("student{}", i), "age": 100 - i }),
            })
            .collect();
        MemoryExecutor::from_records([("students".to_string(), records)]).unwrap()
    }

    fn age_kinds(page: &ListPage) -> Vec<&'static str> {
        page.records
            .iter()
            .map(|r| match r.get("age") {
                Some(Value::Number(_)) => "number",
                Some(Value::String(_)) => "text",
                _ => "missing",
            })
            .collect()
    }

    #[tokio::test]
    async fn sorts_mixed_value_types_in_a_total_order() {
        let page = run(&mixed_ages_fixture(), "sortBy=age&limit=100").await;
        assert_eq!(page.total, 64);
        assert_eq!(page.records.len(), 64);

        // 22 text ages (multiples of 3), 8 missing (multiples of 5 only).
        let kinds = age_kinds(&page);
        let mut expected = vec!["number"; 34];
        expected.extend(vec!["text"; 22]);
        expected.extend(vec!["missing"; 8]);
        assert_eq!(kinds, expected);

        let numbers = ages(&page);
        assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
        let texts: Vec<&str> = page.records.iter().filter_map(|r| r["age"].as_str()).collect();
        assert!(texts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn descending_mixed_sort_reverses_the_order() {
        let page = run(&mixed_ages_fixture(), "sortBy=age&order=desc&limit=100").await;
        let kinds = age_kinds(&page);
        assert_eq!(kinds.first(), Some(&"missing"));
        assert_eq!(kinds.last(), Some(&"number"));
        assert!(ages(&page).windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn bundled_fixtures_parse() {
        assert!(MemoryExecutor::with_fixtures().is_ok());
    }
}
