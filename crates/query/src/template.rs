//! Template matching: non-null template fields must equal the candidate's.

use simpledao_core::{Entity, FieldValue};

/// True when every non-null field of `template` equals the same field of
/// `candidate`. Null template fields are wildcards, so a default template
/// matches everything.
pub fn template_matches<T: Entity>(template: &T, candidate: &T) -> bool {
    T::field_names().all(|name| match template.value_of(name) {
        None | Some(FieldValue::Null) => true,
        Some(expected) => candidate.value_of(name).as_ref() == Some(&expected),
    })
}

/// Names of the fields a template actually constrains.
pub fn constrained_fields<T: Entity>(template: &T) -> Vec<&'static str> {
    T::field_names()
        .filter(|name| template.value_of(name).is_some_and(|v| !v.is_null()))
        .collect()
}
