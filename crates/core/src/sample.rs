//! Reference entity with a single text field.

use serde::{Deserialize, Serialize};

use crate::entity::{BaseEntity, Entity};
use crate::value::FieldValue;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleEntity {
    #[serde(flatten)]
    pub base: BaseEntity,
    pub text: Option<String>,
}

impl SampleEntity {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            base: BaseEntity::default(),
            text: Some(text.into()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl Entity for SampleEntity {
    const TYPE_NAME: &'static str = "SampleEntity";
    const FIELDS: &'static [&'static str] = &["text"];

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "text" => Some(self.text.clone().into()),
            _ => None,
        }
    }
}

impl core::fmt::Display for SampleEntity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SampleEntity{{text={:?}}}:{}", self.text, self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_of_reads_base_and_own_fields() {
        let mut e = SampleEntity::with_text("hello");
        e.base.id = Some("x".into());

        assert_eq!(e.value_of("id"), Some(FieldValue::Text("x".into())));
        assert_eq!(e.value_of("text"), Some(FieldValue::Text("hello".into())));
        assert_eq!(e.value_of("create_time"), Some(FieldValue::Null));
        assert_eq!(e.value_of("missing"), None);
    }

    #[test]
    fn field_names_list_base_fields_first() {
        let names: Vec<_> = SampleEntity::field_names().collect();
        assert_eq!(names, vec!["id", "create_time", "update_time", "text"]);
        assert!(SampleEntity::has_field("text"));
        assert!(!SampleEntity::has_field("txt"));
    }

    #[test]
    fn serializes_base_fields_flat() {
        let e = SampleEntity::with_text("t");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["text"], "t");
        assert!(json.get("id").is_some());
    }
}
