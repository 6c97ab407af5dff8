//! Bound predicate queries and their evaluation against entities.

use core::cmp::Ordering;

use simpledao_core::{DaoError, DaoResult, Entity, FieldValue};

use crate::like::like_matches;
use crate::parser::{parse, CompareOp, Expr, Operand, ParsedQuery};

/// A parsed query with its positional parameters bound.
///
/// Construction fails with `MalformedQuery` on syntax errors, on a mismatch
/// between `?` placeholders and supplied parameters, and on LIKE patterns
/// that are not text.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    filter: Option<Expr>,
    params: Vec<FieldValue>,
}

impl Query {
    pub fn new(text: &str, params: &[FieldValue]) -> DaoResult<Self> {
        let ParsedQuery {
            filter,
            placeholders,
        } = parse(text)?;

        if placeholders != params.len() {
            return Err(DaoError::malformed_query(format!(
                "query has {placeholders} placeholder(s) but {} parameter(s) were supplied",
                params.len()
            )));
        }

        let query = Self {
            text: text.to_string(),
            filter,
            params: params.to_vec(),
        };
        query.check_like_patterns()?;
        Ok(query)
    }

    /// Parse, bind and check every referenced field exists on `T`.
    pub fn for_entity<T: Entity>(text: &str, params: &[FieldValue]) -> DaoResult<Self> {
        let query = Self::new(text, params)?;
        if let Some(unknown) = query.fields().into_iter().find(|f| !T::has_field(f)) {
            return Err(DaoError::malformed_query(format!(
                "unknown field '{unknown}' for {}",
                T::TYPE_NAME
            )));
        }
        Ok(query)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[FieldValue] {
        &self.params
    }

    /// True when the query has no predicates and matches everything.
    pub fn is_unfiltered(&self) -> bool {
        self.filter.is_none()
    }

    /// Field names referenced by the query, in order of appearance.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        if let Some(filter) = &self.filter {
            filter.for_each_field(&mut |f| {
                if !fields.contains(&f) {
                    fields.push(f);
                }
            });
        }
        fields
    }

    pub fn matches<T: Entity>(&self, candidate: &T) -> bool {
        match &self.filter {
            None => true,
            Some(filter) => self.eval(filter, candidate),
        }
    }

    fn resolve<'a>(&'a self, operand: &'a Operand) -> &'a FieldValue {
        match operand {
            Operand::Value(v) => v,
            // Placeholder count is checked at construction.
            Operand::Param(i) => &self.params[*i],
        }
    }

    fn check_like_patterns(&self) -> DaoResult<()> {
        let mut bad = None;
        if let Some(filter) = &self.filter {
            filter.for_each_like_pattern(&mut |pattern| {
                let value = self.resolve(pattern);
                if bad.is_none() && value.as_text().is_none() {
                    bad = Some(value.kind());
                }
            });
        }
        match bad {
            Some(kind) => Err(DaoError::malformed_query(format!(
                "LIKE pattern must be text, got {kind}"
            ))),
            None => Ok(()),
        }
    }

    fn eval<T: Entity>(&self, expr: &Expr, candidate: &T) -> bool {
        match expr {
            Expr::And(l, r) => self.eval(l, candidate) && self.eval(r, candidate),
            Expr::Or(l, r) => self.eval(l, candidate) || self.eval(r, candidate),
            Expr::Not(inner) => !self.eval(inner, candidate),
            Expr::IsNull { field, negated } => match candidate.value_of(field) {
                Some(value) => value.is_null() != *negated,
                None => false,
            },
            Expr::Like {
                field,
                pattern,
                negated,
            } => {
                let Some(FieldValue::Text(value)) = candidate.value_of(field) else {
                    return false;
                };
                let Some(pattern) = self.resolve(pattern).as_text() else {
                    return false;
                };
                like_matches(pattern, &value) != *negated
            }
            Expr::Compare { field, op, operand } => {
                let Some(actual) = candidate.value_of(field) else {
                    return false;
                };
                compare(&actual, *op, self.resolve(operand))
            }
        }
    }
}

/// SQL-flavoured comparison: `= null` / `!= null` test for null, any other
/// comparison involving null is false.
fn compare(actual: &FieldValue, op: CompareOp, expected: &FieldValue) -> bool {
    if expected.is_null() {
        return match op {
            CompareOp::Eq => actual.is_null(),
            CompareOp::NotEq => !actual.is_null(),
            _ => false,
        };
    }
    if actual.is_null() {
        return false;
    }

    let Some(ordering) = actual.compare(expected) else {
        // Mismatched kinds are never equal.
        return op == CompareOp::NotEq;
    };

    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::NotEq => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}

impl core::fmt::Display for Query {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.text.trim())?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}
