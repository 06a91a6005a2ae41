use crate::filter::error::QueryError;
use crate::filter::types::SortDirection;

use super::schema::{CollectionSchema, FieldKind, ParamOp};

/// The set of collections exposed as listing endpoints.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    collections: Vec<CollectionSchema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::new().with(students()).with(grades()).with(products())
    }

    pub fn with(mut self, schema: CollectionSchema) -> Self {
        self.collections.retain(|c| c.name() != schema.name());
        self.collections.push(schema);
        self
    }

    pub fn get(&self, name: &str) -> Result<&CollectionSchema, QueryError> {
        self.collections
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| QueryError::UnknownCollection(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.collections.iter().map(|c| c.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectionSchema> {
        self.collections.iter()
    }
}

pub fn students() -> CollectionSchema {
    CollectionSchema::from_static("students")
        .field("name", FieldKind::Text)
        .field("city", FieldKind::Text)
        .field("age", FieldKind::Integer)
        .param("city", "city", ParamOp::Equals)
        .param("excludeCity", "city", ParamOp::NotEquals)
        .param("cities", "city", ParamOp::InSet)
        .param("excludeCities", "city", ParamOp::NotInSet)
        .param("minAge", "age", ParamOp::Min)
        .param("maxAge", "age", ParamOp::Max)
        .param("olderThan", "age", ParamOp::Above)
        .param("youngerThan", "age", ParamOp::Below)
        .param("nameContains", "name", ParamOp::Contains)
        .sortable(&["name", "age", "city"])
}

pub fn grades() -> CollectionSchema {
    CollectionSchema::from_static("grades")
        .field("student_name", FieldKind::Text)
        .field("course", FieldKind::Text)
        .field("score", FieldKind::Integer)
        .param("studentName", "student_name", ParamOp::Equals)
        .param("course", "course", ParamOp::Equals)
        .param("courses", "course", ParamOp::InSet)
        .param("excludeCourses", "course", ParamOp::NotInSet)
        .param("minScore", "score", ParamOp::Min)
        .param("maxScore", "score", ParamOp::Max)
        .param("courseContains", "course", ParamOp::Contains)
        .sortable(&["student_name", "course", "score"])
}

pub fn products() -> CollectionSchema {
    CollectionSchema::from_static("products")
        .field("name", FieldKind::Text)
        .field("category", FieldKind::Text)
        .field("price", FieldKind::Number)
        .field("stock", FieldKind::Integer)
        .param("category", "category", ParamOp::Equals)
        .param("excludeCategory", "category", ParamOp::NotEquals)
        .param("categories", "category", ParamOp::InSet)
        .param("excludeCategories", "category", ParamOp::NotInSet)
        .param("minPrice", "price", ParamOp::Min)
        .param("maxPrice", "price", ParamOp::Max)
        .param("minStock", "stock", ParamOp::Min)
        .param("nameContains", "name", ParamOp::Contains)
        .sortable(&["name", "price", "stock", "category"])
        .default_sort("name", SortDirection::Asc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_listing_collections() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.names(), vec!["students", "grades", "products"]);
        assert!(matches!(catalog.get("invoices"), Err(QueryError::UnknownCollection(_))));
    }

    #[test]
    fn student_params_cover_listing_endpoint() {
        let schema = students();
        for param in [
            "city", "excludeCity", "cities", "excludeCities", "minAge", "maxAge", "olderThan",
            "youngerThan", "nameContains",
        ] {
            assert!(schema.binding(param).is_some(), "missing binding for {}", param);
        }
        assert_eq!(schema.kind_of("age"), Some(FieldKind::Integer));
        assert_eq!(schema.default_sort_spec().field, "created_at");
    }

    #[test]
    fn product_prices_are_fractional() {
        assert_eq!(products().kind_of("price"), Some(FieldKind::Number));
    }

    #[test]
    fn products_default_to_name_order() {
        assert_eq!(products().default_sort_spec().field, "name");
    }
}
