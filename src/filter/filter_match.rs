use std::cmp::Ordering;

use serde_json::Value;

use super::types::{Exclusion, FieldConstraint, FilterExpression, Inclusion, Scalar, Substring};

impl FilterExpression {
    /// Evaluate the expression against one JSON record.
    pub fn matches(&self, record: &Value) -> bool {
        self.iter().all(|(field, constraint)| constraint.matches(record.get(field)))
    }
}

impl FieldConstraint {
    /// A missing (or null) field satisfies exclusions and nothing else.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let value = value.filter(|v| !v.is_null());

        if let Some(inclusion) = &self.inclusion {
            let Some(v) = value else { return false };
            let hit = match inclusion {
                Inclusion::Equals(s) => equals(s, v),
                Inclusion::InSet(set) => set.iter().any(|s| equals(s, v)),
            };
            if !hit {
                return false;
            }
        }

        if let (Some(exclusion), Some(v)) = (&self.exclusion, value) {
            let hit = match exclusion {
                Exclusion::NotEquals(s) => equals(s, v),
                Exclusion::NotInSet(set) => set.iter().any(|s| equals(s, v)),
            };
            if hit {
                return false;
            }
        }

        if !self.range.is_empty() {
            let Some(v) = value else { return false };
            if !self.range.contains(v) {
                return false;
            }
        }

        if let Some(substring) = &self.substring {
            let Some(Value::String(s)) = value else { return false };
            if !contains(substring, s) {
                return false;
            }
        }

        true
    }
}

fn equals(scalar: &Scalar, value: &Value) -> bool {
    scalar.compare_value(value) == Some(Ordering::Equal)
}

fn contains(substring: &Substring, haystack: &str) -> bool {
    if substring.case_insensitive {
        haystack.to_lowercase().contains(&substring.text.to_lowercase())
    } else {
        haystack.contains(&substring.text)
    }
}
