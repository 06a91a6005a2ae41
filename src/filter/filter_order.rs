use crate::database::models::CollectionSchema;

use super::types::{FilterOptions, PageSpec, SortDirection, SortSpec};

pub struct FilterOrder;

impl FilterOrder {
    /// Resolve `sortBy`/`order`. Fields the collection cannot sort on fall
    /// back to its default sort; unknown directions mean ascending.
    pub fn resolve_sort(schema: &CollectionSchema, sort_by: Option<&str>, order: Option<&str>) -> SortSpec {
        let default = schema.default_sort_spec();
        let direction = order.map(|o| SortDirection::parse(o).unwrap_or(SortDirection::Asc));

        match sort_by {
            Some(field) if schema.is_sortable(field) => {
                SortSpec::new(field, direction.unwrap_or(SortDirection::Asc))
            }
            Some(field) => {
                tracing::debug!(
                    "Unsupported sort field '{}' for {}, using '{}'",
                    field,
                    schema.name(),
                    default.field
                );
                SortSpec::new(default.field.clone(), direction.unwrap_or(default.direction))
            }
            None => SortSpec::new(default.field.clone(), direction.unwrap_or(default.direction)),
        }
    }

    pub fn resolve_page(limit: Option<i64>, skip: Option<i64>, options: &FilterOptions) -> PageSpec {
        let max_limit = options.max_limit.max(1);
        let limit = match limit {
            Some(l) if l > 0 => {
                let l = l as u64;
                if l > max_limit {
                    if options.debug_logging {
                        tracing::warn!("Limit {} exceeds max {}, capping to max", l, max_limit);
                    }
                    max_limit
                } else {
                    l
                }
            }
            _ => options.default_limit.clamp(1, max_limit),
        };
        let skip = skip.map_or(0, |s| s.max(0) as u64);
        PageSpec { limit, skip }
    }

    /// ORDER BY clause with `id` as tie-breaker so paging is stable.
    pub fn generate(sort: &SortSpec) -> String {
        if sort.field == "id" {
            return format!("ORDER BY \"id\" {}", sort.direction.to_sql());
        }
        format!("ORDER BY \"{}\" {}, \"id\" ASC", sort.field, sort.direction.to_sql())
    }
}
