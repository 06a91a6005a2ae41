use std::cmp::Ordering;

use crate::database::models::ParamOp;

use super::params::{NormalizedFilter, ParamValue};
use super::types::{Bound, Exclusion, FieldConstraint, FilterExpression, Inclusion, Precedence, Substring};

/// Merges normalized parameters into one `FieldConstraint` per field,
/// resolving same-slot conflicts by `Precedence`.
pub struct FilterCompose {
    precedence: Precedence,
}

impl FilterCompose {
    pub fn new(precedence: Precedence) -> Self {
        Self { precedence }
    }

    pub fn compose(&self, filters: &[NormalizedFilter]) -> FilterExpression {
        let mut ordered: Vec<&NormalizedFilter> = filters.iter().collect();
        ordered.sort_by_key(|f| f.position);

        let mut expr = FilterExpression::new();
        for filter in ordered {
            let field = filter.binding.field.as_str();
            let constraint = expr.entry(field);
            match (&filter.binding.op, &filter.value) {
                (ParamOp::Equals, ParamValue::Scalar(v)) => {
                    self.apply_inclusion(field, constraint, Inclusion::Equals(v.clone()))
                }
                (ParamOp::InSet, ParamValue::List(vs)) => {
                    self.apply_inclusion(field, constraint, Inclusion::InSet(vs.clone()))
                }
                (ParamOp::NotEquals, ParamValue::Scalar(v)) => {
                    Self::apply_exclusion(constraint, Exclusion::NotEquals(v.clone()))
                }
                (ParamOp::NotInSet, ParamValue::List(vs)) => {
                    Self::apply_exclusion(constraint, Exclusion::NotInSet(vs.clone()))
                }
                (ParamOp::Min, ParamValue::Scalar(v)) => {
                    self.apply_lower(field, constraint, Bound::inclusive(v.clone()))
                }
                (ParamOp::Above, ParamValue::Scalar(v)) => {
                    self.apply_lower(field, constraint, Bound::exclusive(v.clone()))
                }
                (ParamOp::Max, ParamValue::Scalar(v)) => {
                    self.apply_upper(field, constraint, Bound::inclusive(v.clone()))
                }
                (ParamOp::Below, ParamValue::Scalar(v)) => {
                    self.apply_upper(field, constraint, Bound::exclusive(v.clone()))
                }
                (ParamOp::Contains, ParamValue::Text(text)) => {
                    constraint.substring = Some(Substring { text: text.clone(), case_insensitive: true });
                }
                (op, value) => {
                    tracing::warn!("Parameter '{}' ({:?}) carries unexpected value {:?}", filter.binding.param, op, value);
                }
            }
        }
        expr
    }

    fn apply_inclusion(&self, field: &str, constraint: &mut FieldConstraint, incoming: Inclusion) {
        let keep_existing = matches!(
            (&constraint.inclusion, &incoming, self.precedence),
            (Some(Inclusion::Equals(_)), Inclusion::InSet(_), Precedence::MostSpecific)
        );
        if let Some(existing) = &constraint.inclusion {
            tracing::debug!(
                "Field '{}': inclusion conflict {:?} vs {:?}, keeping {}",
                field,
                existing,
                incoming,
                if keep_existing { "first" } else { "last" }
            );
        }
        if !keep_existing {
            constraint.inclusion = Some(incoming);
        }
    }

    fn apply_exclusion(constraint: &mut FieldConstraint, incoming: Exclusion) {
        constraint.exclusion = Some(match constraint.exclusion.take() {
            Some(existing) => existing.union(incoming),
            None => incoming,
        });
    }

    fn apply_lower(&self, field: &str, constraint: &mut FieldConstraint, incoming: Bound) {
        let keep_existing = match (&constraint.range.lower, self.precedence) {
            (Some(existing), Precedence::MostSpecific) => !tighter_lower(&incoming, existing),
            _ => false,
        };
        if constraint.range.lower.is_some() {
            tracing::debug!("Field '{}': two lower bounds, keeping {}", field, if keep_existing { "first" } else { "last" });
        }
        if !keep_existing {
            constraint.range.lower = Some(incoming);
        }
    }

    fn apply_upper(&self, field: &str, constraint: &mut FieldConstraint, incoming: Bound) {
        let keep_existing = match (&constraint.range.upper, self.precedence) {
            (Some(existing), Precedence::MostSpecific) => !tighter_upper(&incoming, existing),
            _ => false,
        };
        if constraint.range.upper.is_some() {
            tracing::debug!("Field '{}': two upper bounds, keeping {}", field, if keep_existing { "first" } else { "last" });
        }
        if !keep_existing {
            constraint.range.upper = Some(incoming);
        }
    }
}

fn tighter_lower(incoming: &Bound, existing: &Bound) -> bool {
    match incoming.value.compare(&existing.value) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => !incoming.inclusive && existing.inclusive,
        Some(Ordering::Less) => false,
        None => true,
    }
}

fn tighter_upper(incoming: &Bound, existing: &Bound) -> bool {
    match incoming.value.compare(&existing.value) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => !incoming.inclusive && existing.inclusive,
        Some(Ordering::Greater) => false,
        None => true,
    }
}
