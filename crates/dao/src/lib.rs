//! Data access facade over the in-memory object store.
//!
//! ```
//! use simpledao_core::SampleEntity;
//! use simpledao_dao::{Dao, SpaceDao};
//!
//! let dao: SpaceDao<SampleEntity> = SpaceDao::default();
//! let stored = dao.write(SampleEntity::with_text("hello")).unwrap();
//! let found = dao.read_by_query("text = ?", &["hello".into()]).unwrap();
//! assert_eq!(found, Some(stored));
//! ```

pub mod dao;
pub mod space;

pub use dao::Dao;
pub use space::SpaceDao;

pub use simpledao_core::{DaoError, DaoResult, Entity, FieldValue};
pub use simpledao_store::{StatsSnapshot, StoreConfig};
