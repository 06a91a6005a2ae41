use serde_json::json;

use crate::cli::utils::{format_query, output};
use crate::cli::OutputFormat;
use crate::database::models::Catalog;
use crate::filter::{Filter, FilterOptions, QueryParameters, SqlResult};

pub fn handle(
    collection: &str,
    raw_query: &str,
    show_sql: bool,
    options: FilterOptions,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();
    let schema = catalog.get(collection)?;
    let query = Filter::new(schema, options).build(&QueryParameters::parse(raw_query))?;

    let mut text = format_query(schema.name(), &query);
    let mut value = json!({ "collection": schema.name(), "query": query });

    if show_sql {
        let select = query.to_sql(schema.name());
        let count = query.to_count_sql(schema.name());
        text.push_str(&format!("\n\n{}\n\n{}", format_sql(&select), format_sql(&count)));
        value["sql"] = json!({
            "select": { "query": select.query, "params": select.params },
            "count": { "query": count.query, "params": count.params },
        });
    }

    output(output_format, &value, &text)
}

fn format_sql(sql: &SqlResult) -> String {
    let params = sql
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| format!("  ${} = {}", i + 1, p))
        .collect::<Vec<_>>()
        .join("\n");
    if params.is_empty() {
        sql.query.clone()
    } else {
        format!("{}\n{}", sql.query, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn sql_listing_numbers_parameters_from_one() {
        let sql = SqlResult {
            query: "SELECT 1 WHERE \"age\" >= $1".to_string(),
            params: vec![Value::from(18)],
        };
        assert_eq!(format_sql(&sql), "SELECT 1 WHERE \"age\" >= $1\n  $1 = 18");
    }

    #[test]
    fn unknown_collection_is_an_error() {
        let result = handle("invoices", "", false, FilterOptions::default(), OutputFormat::Json);
        assert!(result.is_err());
    }
}
