use serde_json::Value;

use super::types::{Exclusion, FieldConstraint, FilterExpression, Inclusion, Scalar};

/// Renders a `FilterExpression` as a parameterized SQL condition.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    /// Render `expr` with `$n` placeholders numbered from
    /// `starting_param_index + 1`. An empty expression renders as "".
    pub fn generate(expr: &FilterExpression, starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self { param_values: vec![], param_index: starting_param_index };

        let mut sql_conditions = vec![];
        for (field, constraint) in expr.iter() {
            sql_conditions.extend(filter_where.build_sql_conditions(field, constraint));
        }
        (sql_conditions.join(" AND "), filter_where.param_values)
    }

    fn build_sql_conditions(&mut self, field: &str, constraint: &FieldConstraint) -> Vec<String> {
        let quoted_column = format!("\"{}\"", field);
        let mut out = vec![];

        match &constraint.inclusion {
            Some(Inclusion::Equals(v)) => out.push(format!("{} = {}", quoted_column, self.param(v))),
            Some(Inclusion::InSet(vs)) if vs.is_empty() => out.push("1=0".to_string()),
            Some(Inclusion::InSet(vs)) => out.push(format!("{} IN ({})", quoted_column, self.params(vs))),
            None => {}
        }

        // Missing values never count as excluded.
        match &constraint.exclusion {
            Some(Exclusion::NotEquals(v)) => {
                out.push(format!("({0} IS NULL OR {0} <> {1})", quoted_column, self.param(v)))
            }
            Some(Exclusion::NotInSet(vs)) if vs.is_empty() => {}
            Some(Exclusion::NotInSet(vs)) => {
                out.push(format!("({0} IS NULL OR {0} NOT IN ({1}))", quoted_column, self.params(vs)))
            }
            None => {}
        }

        if let Some(b) = &constraint.range.lower {
            let op = if b.inclusive { ">=" } else { ">" };
            out.push(format!("{} {} {}", quoted_column, op, self.param(&b.value)));
        }
        if let Some(b) = &constraint.range.upper {
            let op = if b.inclusive { "<=" } else { "<" };
            out.push(format!("{} {} {}", quoted_column, op, self.param(&b.value)));
        }

        if let Some(s) = &constraint.substring {
            let op = if s.case_insensitive { "ILIKE" } else { "LIKE" };
            let pattern = Scalar::Text(format!("%{}%", escape_like(&s.text)));
            out.push(format!("{} {} {}", quoted_column, op, self.param(&pattern)));
        }

        out
    }

    fn params(&mut self, values: &[Scalar]) -> String {
        values.iter().map(|v| self.param(v)).collect::<Vec<_>>().join(", ")
    }

    fn param(&mut self, value: &Scalar) -> String {
        self.param_values.push(value.to_value());
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
