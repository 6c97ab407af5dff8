//! `Dao` backed by an in-process [`ObjectStore`].

use std::sync::Arc;
use std::time::Duration;

use simpledao_core::{DaoResult, Entity, FieldValue};
use simpledao_query::Criteria;
use simpledao_store::{ObjectStore, StatsSnapshot, StoreConfig, WaitMode, UNBOUNDED};

use crate::dao::Dao;

/// DAO over a shared object store.
///
/// Cloning is cheap and clones share the store, counters included.
#[derive(Debug, Clone)]
pub struct SpaceDao<T> {
    store: Arc<ObjectStore<T>>,
}

impl<T: Entity> Default for SpaceDao<T> {
    fn default() -> Self {
        Self::new(Arc::new(ObjectStore::new()))
    }
}

impl<T: Entity> SpaceDao<T> {
    pub fn new(store: Arc<ObjectStore<T>>) -> Self {
        Self { store }
    }

    pub fn with_config(config: StoreConfig) -> DaoResult<Self> {
        Ok(Self::new(Arc::new(ObjectStore::with_config(config)?)))
    }

    pub fn from_env() -> DaoResult<Self> {
        Ok(Self::new(Arc::new(ObjectStore::from_env()?)))
    }

    pub fn store(&self) -> &Arc<ObjectStore<T>> {
        &self.store
    }
}

impl<T: Entity> Dao<T> for SpaceDao<T> {
    fn read_multiple(&self, template: T) -> DaoResult<Vec<T>> {
        self.read_multiple_limit(template, UNBOUNDED)
    }

    fn read_multiple_limit(&self, template: T, count: usize) -> DaoResult<Vec<T>> {
        self.store.find_matching(&Criteria::template(template), count)
    }

    fn read(&self, template: T) -> DaoResult<Option<T>> {
        self.store.find_first(&Criteria::template(template))
    }

    fn read_by_id(&self, id: &str) -> DaoResult<Option<T>> {
        self.store.find_first(&Criteria::by_id(id))
    }

    fn read_by_query(&self, query: &str, params: &[FieldValue]) -> DaoResult<Option<T>> {
        self.store.find_first(&Criteria::query(query, params)?)
    }

    fn read_multiple_by_query(
        &self,
        query: &str,
        count: usize,
        params: &[FieldValue],
    ) -> DaoResult<Vec<T>> {
        self.store.find_matching(&Criteria::query(query, params)?, count)
    }

    fn take_multiple(&self, template: T) -> DaoResult<Vec<T>> {
        self.take_multiple_limit(template, UNBOUNDED)
    }

    fn take_multiple_limit(&self, template: T, count: usize) -> DaoResult<Vec<T>> {
        self.store.remove_matching(&Criteria::template(template), count)
    }

    fn take(&self, template: T) -> DaoResult<Option<T>> {
        self.store.remove_first(&Criteria::template(template))
    }

    fn take_by_id(&self, id: &str) -> DaoResult<Option<T>> {
        self.store.remove_first(&Criteria::by_id(id))
    }

    fn take_by_query(&self, query: &str, params: &[FieldValue]) -> DaoResult<Option<T>> {
        self.store.remove_first(&Criteria::query(query, params)?)
    }

    fn take_multiple_by_query(
        &self,
        query: &str,
        count: usize,
        params: &[FieldValue],
    ) -> DaoResult<Vec<T>> {
        self.store.remove_matching(&Criteria::query(query, params)?, count)
    }

    fn poll(&self, template: T, timeout: Duration) -> DaoResult<Option<T>> {
        self.store
            .wait_for(&Criteria::template(template), WaitMode::Poll, timeout)
    }

    fn peek(&self, template: T, timeout: Duration) -> DaoResult<Option<T>> {
        self.store
            .wait_for(&Criteria::template(template), WaitMode::Peek, timeout)
    }

    fn push(&self, entry: T) -> DaoResult<T> {
        self.store.insert(entry, None)
    }

    fn push_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T> {
        self.store.insert(entry, Some(timeout))
    }

    fn write(&self, entry: T) -> DaoResult<T> {
        self.store.insert(entry, None)
    }

    fn write_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T> {
        self.store.insert(entry, Some(timeout))
    }

    fn update(&self, entry: T) -> DaoResult<T> {
        self.store.update_entity(entry, None)
    }

    fn update_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T> {
        self.store.update_entity(entry, Some(timeout))
    }

    fn reads(&self) -> u64 {
        self.store.reads()
    }

    fn writes(&self) -> u64 {
        self.store.writes()
    }

    fn takes(&self) -> u64 {
        self.store.takes()
    }

    fn reset(&self) {
        self.store.reset_stats();
    }

    fn stats(&self) -> DaoResult<StatsSnapshot> {
        self.store.stats()
    }

    fn count(&self, template: T) -> DaoResult<usize> {
        self.store.count(&Criteria::template(template))
    }

    fn clear(&self) -> DaoResult<usize> {
        self.store.clear()
    }
}
