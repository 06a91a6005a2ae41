use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::filter::{FilterExpression, ListingQuery};

/// Print any serializable value as pretty JSON
pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print either the JSON form or the pre-rendered text form
pub fn output<T: Serialize>(output_format: OutputFormat, value: &T, text: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(value),
        OutputFormat::Text => {
            println!("{}", text);
            Ok(())
        }
    }
}

/// One line per filtered field, predicates in their `$op` form
pub fn format_filter(filter: &FilterExpression) -> String {
    if filter.is_empty() {
        return "  (none, every record matches)".to_string();
    }
    filter
        .iter()
        .map(|(field, constraint)| {
            let predicates = serde_json::to_string(&constraint.predicates()).unwrap_or_default();
            format!("  {}: {}", field, predicates)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_query(collection: &str, query: &ListingQuery) -> String {
    format!(
        "Collection: {}\nFilter:\n{}\nSort: {} {}\nPage: limit {}, skip {}",
        collection,
        format_filter(&query.filter),
        query.sort.field,
        query.sort.direction.to_sql(),
        query.page.limit,
        query.page.skip,
    )
}

/// Compact `key=value` rendering of one record, `id` and `created_at` omitted
pub fn format_record(record: &Value) -> String {
    match record.as_object() {
        Some(obj) => obj
            .iter()
            .filter(|(k, _)| k.as_str() != "id" && k.as_str() != "created_at")
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join("  "),
        None => record.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOptions, Filter, QueryParameters};
    use crate::database::models::catalog::students;
    use serde_json::json;

    #[test]
    fn empty_filter_says_so() {
        assert!(format_filter(&FilterExpression::new()).contains("every record"));
    }

    #[test]
    fn query_text_shows_merged_range_and_page() {
        let schema = students();
        let query = Filter::new(&schema, FilterOptions::default())
            .build(&QueryParameters::parse("maxAge=30&minAge=18&sortBy=age&order=desc&limit=5"))
            .unwrap();
        let text = format_query("students", &query);
        assert!(text.contains("age: [{\"$gte\":18},{\"$lte\":30}]"), "{}", text);
        assert!(text.contains("Sort: age DESC"));
        assert!(text.contains("limit 5, skip 0"));
    }

    #[test]
    fn record_line_skips_bookkeeping_fields() {
        let line = format_record(&json!({ "id": "x", "name": "Anna", "age": 21 }));
        assert!(line.contains("name=Anna"));
        assert!(line.contains("age=21"));
        assert!(!line.contains("id="));
    }
}
