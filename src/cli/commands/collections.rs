use serde_json::json;

use crate::cli::utils::output;
use crate::cli::OutputFormat;
use crate::database::models::Catalog;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let catalog = Catalog::builtin();

    let value: Vec<_> = catalog
        .iter()
        .map(|schema| {
            json!({
                "name": schema.name(),
                "params": schema.params(),
                "sortable": schema.sortable_fields(),
                "default_sort": schema.default_sort_spec(),
            })
        })
        .collect();

    let text = catalog
        .iter()
        .map(|schema| {
            let params = schema.params().iter().map(|b| b.param.as_str()).collect::<Vec<_>>().join(", ");
            format!(
                "{}\n  params:   {}\n  sortable: {}\n  default:  {} {}",
                schema.name(),
                params,
                schema.sortable_fields().join(", "),
                schema.default_sort_spec().field,
                schema.default_sort_spec().direction.to_sql(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    output(output_format, &value, &text)
}
