use serde_json::json;

use crate::cli::utils::{format_query, format_record, output};
use crate::cli::OutputFormat;
use crate::database::models::Catalog;
use crate::database::{MemoryExecutor, QueryExecutor};
use crate::filter::{Filter, FilterOptions, QueryParameters};

pub async fn handle(
    collection: &str,
    raw_query: &str,
    options: FilterOptions,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();
    let schema = catalog.get(collection)?;
    let query = Filter::new(schema, options).build(&QueryParameters::parse(raw_query))?;

    let executor = MemoryExecutor::with_fixtures()?;
    let page = executor.find(schema, &query).await?;

    let mut text = format_query(schema.name(), &query);
    text.push_str(&format!("\n\n{} of {} record(s)", page.records.len(), page.total));
    for record in &page.records {
        text.push_str("\n  ");
        text.push_str(&format_record(record));
    }

    let value = json!({
        "count": page.records.len(),
        "total": page.total,
        "limit": query.page.limit,
        "skip": query.page.skip,
        "data": page.records,
    });

    output(output_format, &value, &text)
}
