//! Entity model: identity + timestamps shared by every stored record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::generate_id;
use crate::value::FieldValue;

pub const ID_FIELD: &str = "id";
pub const CREATE_TIME_FIELD: &str = "create_time";
pub const UPDATE_TIME_FIELD: &str = "update_time";

/// Names of the base fields, in declaration order.
pub const BASE_FIELDS: &[&str] = &[ID_FIELD, CREATE_TIME_FIELD, UPDATE_TIME_FIELD];

/// Base attributes carried by every entity type.
///
/// All three fields are optional so that a default value works as a
/// match-everything template. The store fills them in on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseEntity {
    pub id: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl BaseEntity {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Apply write-time identity rules.
    ///
    /// - a missing id is generated
    /// - `create_time` is taken from the stored copy when one exists, otherwise
    ///   kept if supplied, otherwise set to `now`
    /// - `update_time` is always `now`
    ///
    /// Returns the (possibly generated) id.
    pub fn stamp(&mut self, stored_create_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
        let id = self.id.get_or_insert_with(generate_id).clone();
        self.create_time = stored_create_time.or(self.create_time).or(Some(now));
        self.update_time = Some(now);
        id
    }
}

impl core::fmt::Display for BaseEntity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "BaseEntity{{id={:?}, create_time={:?}, update_time={:?}}}",
            self.id, self.create_time, self.update_time
        )
    }
}

/// A storable entity type.
///
/// Implementors declare their own fields explicitly instead of relying on
/// reflection: `FIELDS` lists them and `field` reads one by name. Base fields
/// are handled by the provided methods and must not be repeated in `FIELDS`.
pub trait Entity: Clone + Default + core::fmt::Debug + Send + Sync + 'static {
    /// Type name used in logs.
    const TYPE_NAME: &'static str;

    /// The type's own field names (excluding base fields).
    const FIELDS: &'static [&'static str];

    fn base(&self) -> &BaseEntity;

    fn base_mut(&mut self) -> &mut BaseEntity;

    /// Read one of the type's own fields.
    ///
    /// Returns `None` for names not in `FIELDS` and `Some(FieldValue::Null)`
    /// for a known field that is unset.
    fn field(&self, name: &str) -> Option<FieldValue>;

    fn id(&self) -> Option<&str> {
        self.base().id.as_deref()
    }

    /// Read any field by name, base fields included.
    fn value_of(&self, name: &str) -> Option<FieldValue> {
        let base = self.base();
        match name {
            ID_FIELD => Some(base.id.clone().into()),
            CREATE_TIME_FIELD => Some(base.create_time.into()),
            UPDATE_TIME_FIELD => Some(base.update_time.into()),
            other => self.field(other),
        }
    }

    /// All field names, base fields first.
    fn field_names() -> impl Iterator<Item = &'static str> {
        BASE_FIELDS.iter().chain(Self::FIELDS.iter()).copied()
    }

    fn has_field(name: &str) -> bool {
        Self::field_names().any(|f| f == name)
    }

    /// A template that matches only the entity with the given id.
    fn template_for_id(id: impl Into<String>) -> Self {
        let mut template = Self::default();
        template.base_mut().id = Some(id.into());
        template
    }
}
