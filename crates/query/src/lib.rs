//! `simpledao-query`: deciding whether a stored object matches.
//!
//! Two matching modes are supported:
//!
//! - **Templates**: an entity value whose non-null fields are equality
//!   constraints (null fields are wildcards).
//! - **Predicate queries**: a small `where`-clause grammar with comparisons,
//!   `LIKE`, `IS [NOT] NULL`, `AND`/`OR`/`NOT`, parentheses and positional
//!   `?` parameters.
//!
//! `Criteria` wraps both (plus match-all and match-by-id) behind one
//! `matches` call.

pub mod criteria;
pub mod like;
mod lexer;
pub mod parser;
pub mod query;
pub mod template;

pub use criteria::Criteria;
pub use like::like_matches;
pub use query::Query;
pub use template::{constrained_fields, template_matches};
