use crate::database::models::{CollectionSchema, FieldKind, ParamBinding, ParamOp};

use super::error::QueryError;
use super::types::{ParamMode, Scalar};

/// Query string pairs in the order they were received. Repeated keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    pairs: Vec<(String, String)>,
}

impl QueryParameters {
    /// Parse a raw query string (with or without the leading `?`).
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self {
            pairs: url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Last value supplied for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Text(String),
}

/// A recognized filter parameter with its typed value. `position` is the
/// index of the parameter in the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFilter {
    pub binding: ParamBinding,
    pub value: ParamValue,
    pub position: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedParams {
    pub filters: Vec<NormalizedFilter>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// Type and validate raw query parameters against a collection schema.
///
/// Unrecognized names are ignored. In lenient mode a value that cannot be
/// typed is dropped; in strict mode it fails the whole request.
pub fn normalize(
    params: &QueryParameters,
    schema: &CollectionSchema,
    mode: ParamMode,
) -> Result<NormalizedParams, QueryError> {
    let mut out = NormalizedParams::default();

    for (position, (key, raw)) in params.iter().enumerate() {
        let value = raw.trim();
        match key {
            "sortBy" => out.sort_by = non_empty(value),
            "order" => out.order = non_empty(value),
            "limit" => out.limit = parse_window(key, value, mode)?,
            "skip" | "offset" => out.skip = parse_window(key, value, mode)?,
            _ => {
                let Some(binding) = schema.binding(key) else {
                    tracing::debug!("Ignoring unrecognized parameter '{}' for {}", key, schema.name());
                    continue;
                };
                let Some(kind) = schema.kind_of(&binding.field) else { continue };
                let Some(typed) = normalize_value(binding, kind, value, mode)? else { continue };

                // Repeated list keys extend the first occurrence.
                if let ParamValue::List(more) = &typed {
                    if let Some(existing) = out.filters.iter_mut().find(|f| f.binding.param == binding.param) {
                        if let ParamValue::List(values) = &mut existing.value {
                            values.extend(more.iter().cloned());
                            continue;
                        }
                    }
                }

                out.filters.push(NormalizedFilter { binding: binding.clone(), value: typed, position });
            }
        }
    }

    Ok(out)
}

fn normalize_value(
    binding: &ParamBinding,
    kind: FieldKind,
    value: &str,
    mode: ParamMode,
) -> Result<Option<ParamValue>, QueryError> {
    if value.is_empty() {
        return Ok(None);
    }

    match binding.op {
        ParamOp::Contains => Ok(Some(ParamValue::Text(value.to_string()))),
        op if op.is_list() => {
            let segments: Vec<&str> = value.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
            if segments.is_empty() {
                return reject(mode, QueryError::malformed_list(&binding.param));
            }
            let parsed: Option<Vec<Scalar>> = segments.iter().map(|s| parse_scalar(kind, s)).collect();
            match parsed {
                Some(values) => Ok(Some(ParamValue::List(values))),
                None => reject(mode, QueryError::malformed_list(&binding.param)),
            }
        }
        _ => match parse_scalar(kind, value) {
            Some(scalar) => Ok(Some(ParamValue::Scalar(scalar))),
            None => reject(mode, QueryError::invalid_format(&binding.param, value)),
        },
    }
}

pub(crate) fn parse_scalar(kind: FieldKind, value: &str) -> Option<Scalar> {
    match kind {
        FieldKind::Text => Some(Scalar::Text(value.to_string())),
        FieldKind::Integer => value.parse::<i64>().ok().map(Scalar::Integer),
        FieldKind::Number => value.parse::<f64>().ok().filter(|f| f.is_finite()).map(Scalar::Number),
    }
}

fn parse_window(key: &str, value: &str, mode: ParamMode) -> Result<Option<i64>, QueryError> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<i64>() {
        Ok(n) => Ok(Some(n)),
        Err(_) => reject(mode, QueryError::invalid_format(key, value)),
    }
}

fn reject<T>(mode: ParamMode, err: QueryError) -> Result<Option<T>, QueryError> {
    match mode {
        ParamMode::Strict => Err(err),
        ParamMode::Lenient => {
            tracing::warn!("{}, ignoring", err);
            Ok(None)
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
