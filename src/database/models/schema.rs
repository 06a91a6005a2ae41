use serde::{Deserialize, Serialize};

use crate::filter::error::QueryError;
use crate::filter::types::{SortDirection, SortSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// What a recognized query parameter does to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamOp {
    Equals,
    NotEquals,
    InSet,
    NotInSet,
    /// Inclusive lower bound.
    Min,
    /// Inclusive upper bound.
    Max,
    /// Exclusive lower bound.
    Above,
    /// Exclusive upper bound.
    Below,
    Contains,
}

impl ParamOp {
    pub fn is_list(&self) -> bool {
        matches!(self, ParamOp::InSet | ParamOp::NotInSet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamBinding {
    pub param: String,
    pub field: String,
    pub op: ParamOp,
}

/// A listing endpoint: its fields, the query parameters it understands and
/// how it may be sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSchema {
    name: String,
    fields: Vec<FieldDef>,
    params: Vec<ParamBinding>,
    sortable: Vec<String>,
    default_sort: SortSpec,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>) -> Result<Self, QueryError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(QueryError::InvalidCollectionName(name));
        }
        Ok(Self::unchecked(name))
    }

    /// Collections named in code.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(is_identifier(name), "invalid collection name {}", name);
        Self::unchecked(name.to_string())
    }

    fn unchecked(name: String) -> Self {
        Self {
            name,
            fields: vec![
                FieldDef { name: "id".to_string(), kind: FieldKind::Text },
                FieldDef { name: "created_at".to_string(), kind: FieldKind::Text },
            ],
            params: vec![],
            sortable: vec!["created_at".to_string()],
            default_sort: SortSpec::new("created_at", SortDirection::Asc),
        }
    }

    /// Field names end up quoted in SQL, so only identifiers are accepted.
    pub fn field(mut self, name: &str, kind: FieldKind) -> Self {
        if !is_identifier(name) {
            tracing::warn!("Collection '{}': skipping invalid field name '{}'", self.name, name);
            return self;
        }
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldDef { name: name.to_string(), kind });
        self
    }

    /// Bind a query parameter to a declared field. Unknown fields are skipped
    /// with a warning rather than producing a binding nothing can satisfy.
    pub fn param(mut self, param: &str, field: &str, op: ParamOp) -> Self {
        if self.kind_of(field).is_none() {
            tracing::warn!("Collection '{}': parameter '{}' targets undeclared field '{}'", self.name, param, field);
            return self;
        }
        self.params.retain(|p| p.param != param);
        self.params.push(ParamBinding { param: param.to_string(), field: field.to_string(), op });
        self
    }

    pub fn sortable(mut self, fields: &[&str]) -> Self {
        for field in fields {
            if self.kind_of(field).is_some() && !self.sortable.iter().any(|s| s == field) {
                self.sortable.push(field.to_string());
            }
        }
        self
    }

    pub fn default_sort(mut self, field: &str, direction: SortDirection) -> Self {
        if self.is_sortable(field) {
            self.default_sort = SortSpec::new(field, direction);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn params(&self) -> &[ParamBinding] {
        &self.params
    }

    pub fn binding(&self, param: &str) -> Option<&ParamBinding> {
        self.params.iter().find(|p| p.param == param)
    }

    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.fields.iter().find(|f| f.name == field).map(|f| f.kind)
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.iter().any(|s| s == field)
    }

    pub fn sortable_fields(&self) -> &[String] {
        &self.sortable
    }

    pub fn default_sort_spec(&self) -> &SortSpec {
        &self.default_sort
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
