use simpledao_core::{DaoResult, Entity, FieldValue};

use crate::query::Query;
use crate::template::{constrained_fields, template_matches};

/// What a read, take or wait is looking for.
///
/// One `matches` entry point serves store scans and blocked waiters alike.
#[derive(Debug, Clone)]
pub enum Criteria<T> {
    /// Every stored object.
    All,
    /// Field-by-field equality over the template's non-null fields.
    Template(T),
    /// Exact match on the id field only.
    Id(String),
    /// A bound predicate query.
    Query(Query),
}

impl<T: Entity> Criteria<T> {
    pub fn template(template: T) -> Self {
        Criteria::Template(template)
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Criteria::Id(id.into())
    }

    /// Parse and bind a query string, checking its fields against `T`.
    pub fn query(text: &str, params: &[FieldValue]) -> DaoResult<Self> {
        match Query::for_entity::<T>(text, params) {
            Ok(query) => Ok(Criteria::Query(query)),
            Err(err) => {
                tracing::debug!(entity = T::TYPE_NAME, query = text, error = %err, "rejected query");
                Err(err)
            }
        }
    }

    pub fn matches(&self, candidate: &T) -> bool {
        match self {
            Criteria::All => true,
            Criteria::Template(template) => template_matches(template, candidate),
            Criteria::Id(id) => candidate.id() == Some(id.as_str()),
            Criteria::Query(query) => query.matches(candidate),
        }
    }

    /// The id this criteria pins down, if it can match at most one object.
    pub fn exact_id(&self) -> Option<&str> {
        match self {
            Criteria::Id(id) => Some(id),
            Criteria::Template(template) => template.id(),
            _ => None,
        }
    }
}

impl<T: Entity> core::fmt::Display for Criteria<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Criteria::All => write!(f, "all {}", T::TYPE_NAME),
            Criteria::Template(template) => {
                write!(f, "{} template {:?}", T::TYPE_NAME, constrained_fields(template))
            }
            Criteria::Id(id) => write!(f, "{} id={id}", T::TYPE_NAME),
            Criteria::Query(query) => write!(f, "{} query \"{query}\"", T::TYPE_NAME),
        }
    }
}
