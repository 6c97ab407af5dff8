//! `simpledao-core`: entity model building blocks.
//!
//! This crate contains the **pure data** primitives shared by the query,
//! store and DAO layers (no locking, no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod sample;
pub mod value;

pub use entity::{BaseEntity, Entity, BASE_FIELDS, CREATE_TIME_FIELD, ID_FIELD, UPDATE_TIME_FIELD};
pub use error::{DaoError, DaoResult};
pub use id::generate_id;
pub use sample::SampleEntity;
pub use value::FieldValue;
