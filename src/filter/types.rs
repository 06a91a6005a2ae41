use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Typed value carried by a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Compare two scalars. Numbers compare with numbers, text with text;
    /// anything else is incomparable.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Integer(a), Scalar::Integer(b)) => Some(a.cmp(b)),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    /// Total order for sorting mixed values: numbers by value, then text.
    pub fn sort_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Integer(a), Scalar::Integer(b)) => a.cmp(b),
            (Scalar::Integer(a), Scalar::Number(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Scalar::Number(a), Scalar::Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Scalar::Number(a), Scalar::Number(b)) => a.total_cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => a.cmp(b),
            (Scalar::Text(_), _) => Ordering::Greater,
            (_, Scalar::Text(_)) => Ordering::Less,
        }
    }

    /// Compare against a JSON value taken from a record.
    pub fn compare_value(&self, value: &Value) -> Option<Ordering> {
        Scalar::from_value(value)?.compare(self)
    }

    pub fn from_value(value: &Value) -> Option<Scalar> {
        match value {
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Scalar::Integer(i)),
                None => n.as_f64().map(Scalar::Number),
            },
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Integer(i) => Value::from(*i),
            Scalar::Number(f) => Value::from(*f),
            Scalar::Text(s) => Value::from(s.as_str()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Number(f) => Some(*f),
            Scalar::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Flattened view of a single condition on a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    #[serde(rename = "$eq")]
    Equals(Scalar),
    #[serde(rename = "$ne")]
    NotEquals(Scalar),
    #[serde(rename = "$gt")]
    GreaterThan(Scalar),
    #[serde(rename = "$lt")]
    LessThan(Scalar),
    #[serde(rename = "$gte")]
    GreaterOrEqual(Scalar),
    #[serde(rename = "$lte")]
    LessOrEqual(Scalar),
    #[serde(rename = "$in")]
    InSet(Vec<Scalar>),
    #[serde(rename = "$nin")]
    NotInSet(Vec<Scalar>),
    #[serde(rename = "$ilike")]
    MatchesSubstring { text: String, case_insensitive: bool },
}

/// Positive membership slot: a field is either pinned to one value or to a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inclusion {
    Equals(Scalar),
    InSet(Vec<Scalar>),
}

/// Negative membership slot. Excluded values accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    NotEquals(Scalar),
    NotInSet(Vec<Scalar>),
}

impl Exclusion {
    pub fn values(&self) -> Vec<Scalar> {
        match self {
            Exclusion::NotEquals(v) => vec![v.clone()],
            Exclusion::NotInSet(vs) => vs.clone(),
        }
    }

    /// Union of two exclusions, keeping first-seen order and dropping duplicates.
    pub fn union(self, other: Exclusion) -> Exclusion {
        let mut seen = BTreeSet::new();
        let values: Vec<Scalar> = self
            .values()
            .into_iter()
            .chain(other.values())
            .filter(|v| seen.insert(v.to_string()))
            .collect();
        match values.as_slice() {
            [single] => Exclusion::NotEquals(single.clone()),
            _ => Exclusion::NotInSet(values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: Scalar,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: Scalar) -> Self {
        Self { value, inclusive: true }
    }

    pub fn exclusive(value: Scalar) -> Self {
        Self { value, inclusive: false }
    }
}

/// Compound range on one field. Lower and upper bounds are set independently
/// and never overwrite each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<Bound>,
}

impl Range {
    pub fn is_empty(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    pub fn contains(&self, value: &Value) -> bool {
        let above = match &self.lower {
            Some(b) => match b.value.compare_value(value) {
                Some(Ordering::Greater) => true,
                Some(Ordering::Equal) => b.inclusive,
                _ => false,
            },
            None => true,
        };
        let below = match &self.upper {
            Some(b) => match b.value.compare_value(value) {
                Some(Ordering::Less) => true,
                Some(Ordering::Equal) => b.inclusive,
                _ => false,
            },
            None => true,
        };
        above && below
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substring {
    pub text: String,
    pub case_insensitive: bool,
}

/// All constraints on one field, one slot per constraint type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<Inclusion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion: Option<Exclusion>,
    #[serde(skip_serializing_if = "Range::is_empty", default)]
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substring: Option<Substring>,
}

impl FieldConstraint {
    pub fn is_empty(&self) -> bool {
        self.inclusion.is_none()
            && self.exclusion.is_none()
            && self.range.is_empty()
            && self.substring.is_none()
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        match &self.inclusion {
            Some(Inclusion::Equals(v)) => out.push(Predicate::Equals(v.clone())),
            Some(Inclusion::InSet(vs)) => out.push(Predicate::InSet(vs.clone())),
            None => {}
        }
        match &self.exclusion {
            Some(Exclusion::NotEquals(v)) => out.push(Predicate::NotEquals(v.clone())),
            Some(Exclusion::NotInSet(vs)) => out.push(Predicate::NotInSet(vs.clone())),
            None => {}
        }
        if let Some(b) = &self.range.lower {
            out.push(if b.inclusive {
                Predicate::GreaterOrEqual(b.value.clone())
            } else {
                Predicate::GreaterThan(b.value.clone())
            });
        }
        if let Some(b) = &self.range.upper {
            out.push(if b.inclusive {
                Predicate::LessOrEqual(b.value.clone())
            } else {
                Predicate::LessThan(b.value.clone())
            });
        }
        if let Some(s) = &self.substring {
            out.push(Predicate::MatchesSubstring {
                text: s.text.clone(),
                case_insensitive: s.case_insensitive,
            });
        }
        out
    }
}

/// Field name to constraint mapping, in the order fields were first constrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    fields: Vec<(String, FieldConstraint)>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, c)| c.is_empty())
    }

    pub fn get(&self, field: &str) -> Option<&FieldConstraint> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    pub fn entry(&mut self, field: &str) -> &mut FieldConstraint {
        let idx = match self.fields.iter().position(|(f, _)| f == field) {
            Some(idx) => idx,
            None => {
                self.fields.push((field.to_string(), FieldConstraint::default()));
                self.fields.len() - 1
            }
        };
        &mut self.fields[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldConstraint)> {
        self.fields
            .iter()
            .filter(|(_, c)| !c.is_empty())
            .map(|(f, c)| (f.as_str(), c))
    }
}

// Serialized as { field: [predicate, ...] } for explain output and debug logs.
impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (field, constraint) in self.iter() {
            map.serialize_entry(field, &constraint.predicates())?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Accepts "asc"/"desc" in any case.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if s.trim().eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub limit: u64,
    pub skip: u64,
}

/// Everything an executor needs to run one listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingQuery {
    pub filter: FilterExpression,
    pub sort: SortSpec,
    pub page: PageSpec,
}

/// Rule applied when two parameters target the same constraint slot of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// Equality beats set membership, the tighter of two bounds wins,
    /// otherwise the later parameter wins.
    #[default]
    MostSpecific,
    /// The parameter appearing later in the query string always wins.
    LastSpecified,
}

impl Precedence {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "most-specific" | "most_specific" | "specific" => Some(Precedence::MostSpecific),
            "last-specified" | "last_specified" | "last" => Some(Precedence::LastSpecified),
            _ => None,
        }
    }
}

/// How malformed parameter values are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamMode {
    /// Drop the offending filter or fall back to the default value.
    #[default]
    Lenient,
    /// Reject the request.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub default_limit: u64,
    pub max_limit: u64,
    pub precedence: Precedence,
    pub param_mode: ParamMode,
    pub debug_logging: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            precedence: Precedence::MostSpecific,
            param_mode: ParamMode::Lenient,
            debug_logging: false,
        }
    }
}

impl FilterOptions {
    pub fn from_config(config: &crate::config::FilterConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
            precedence: config.precedence,
            param_mode: if config.strict_params { ParamMode::Strict } else { ParamMode::Lenient },
            debug_logging: config.debug_logging,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
