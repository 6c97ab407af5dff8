use std::sync::Arc;
use std::time::Duration;

use simpledao_core::{DaoResult, Entity, FieldValue};
use simpledao_store::StatsSnapshot;

/// Data access operations over one entity type.
///
/// Single-result methods return `Ok(None)` when nothing matches; absence is
/// never an error. Query methods take a predicate string with `?`
/// placeholders bound positionally to `params`.
pub trait Dao<T: Entity>: Send + Sync {
    // reads

    /// Every object matching `template`.
    fn read_multiple(&self, template: T) -> DaoResult<Vec<T>>;

    /// At most `count` objects matching `template`, oldest first.
    fn read_multiple_limit(&self, template: T, count: usize) -> DaoResult<Vec<T>>;

    fn read(&self, template: T) -> DaoResult<Option<T>>;

    fn read_by_id(&self, id: &str) -> DaoResult<Option<T>>;

    fn read_by_query(&self, query: &str, params: &[FieldValue]) -> DaoResult<Option<T>>;

    fn read_multiple_by_query(
        &self,
        query: &str,
        count: usize,
        params: &[FieldValue],
    ) -> DaoResult<Vec<T>>;

    // takes

    fn take_multiple(&self, template: T) -> DaoResult<Vec<T>>;

    fn take_multiple_limit(&self, template: T, count: usize) -> DaoResult<Vec<T>>;

    fn take(&self, template: T) -> DaoResult<Option<T>>;

    fn take_by_id(&self, id: &str) -> DaoResult<Option<T>>;

    fn take_by_query(&self, query: &str, params: &[FieldValue]) -> DaoResult<Option<T>>;

    fn take_multiple_by_query(
        &self,
        query: &str,
        count: usize,
        params: &[FieldValue],
    ) -> DaoResult<Vec<T>>;

    // messaging

    /// Remove a match, waiting up to `timeout` for one to be pushed.
    fn poll(&self, template: T, timeout: Duration) -> DaoResult<Option<T>>;

    /// Observe a match without removing it, waiting up to `timeout`.
    fn peek(&self, template: T, timeout: Duration) -> DaoResult<Option<T>>;

    fn push(&self, entry: T) -> DaoResult<T>;

    fn push_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T>;

    // writes

    /// Store `entry`, returning it with id and timestamps filled in.
    fn write(&self, entry: T) -> DaoResult<T>;

    fn write_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T>;

    /// Replace by id; an unknown id is inserted.
    fn update(&self, entry: T) -> DaoResult<T>;

    fn update_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T>;

    // stats

    fn reads(&self) -> u64;

    fn writes(&self) -> u64;

    fn takes(&self) -> u64;

    /// Zero the read, write and take counters.
    fn reset(&self);

    fn stats(&self) -> DaoResult<StatsSnapshot>;

    // housekeeping

    fn count(&self, template: T) -> DaoResult<usize>;

    /// Remove every stored object without counting takes.
    fn clear(&self) -> DaoResult<usize>;
}

impl<T, D> Dao<T> for Arc<D>
where
    T: Entity,
    D: Dao<T> + ?Sized,
{
    fn read_multiple(&self, template: T) -> DaoResult<Vec<T>> {
        (**self).read_multiple(template)
    }

    fn read_multiple_limit(&self, template: T, count: usize) -> DaoResult<Vec<T>> {
        (**self).read_multiple_limit(template, count)
    }

    fn read(&self, template: T) -> DaoResult<Option<T>> {
        (**self).read(template)
    }

    fn read_by_id(&self, id: &str) -> DaoResult<Option<T>> {
        (**self).read_by_id(id)
    }

    fn read_by_query(&self, query: &str, params: &[FieldValue]) -> DaoResult<Option<T>> {
        (**self).read_by_query(query, params)
    }

    fn read_multiple_by_query(
        &self,
        query: &str,
        count: usize,
        params: &[FieldValue],
    ) -> DaoResult<Vec<T>> {
        (**self).read_multiple_by_query(query, count, params)
    }

    fn take_multiple(&self, template: T) -> DaoResult<Vec<T>> {
        (**self).take_multiple(template)
    }

    fn take_multiple_limit(&self, template: T, count: usize) -> DaoResult<Vec<T>> {
        (**self).take_multiple_limit(template, count)
    }

    fn take(&self, template: T) -> DaoResult<Option<T>> {
        (**self).take(template)
    }

    fn take_by_id(&self, id: &str) -> DaoResult<Option<T>> {
        (**self).take_by_id(id)
    }

    fn take_by_query(&self, query: &str, params: &[FieldValue]) -> DaoResult<Option<T>> {
        (**self).take_by_query(query, params)
    }

    fn take_multiple_by_query(
        &self,
        query: &str,
        count: usize,
        params: &[FieldValue],
    ) -> DaoResult<Vec<T>> {
        (**self).take_multiple_by_query(query, count, params)
    }

    fn poll(&self, template: T, timeout: Duration) -> DaoResult<Option<T>> {
        (**self).poll(template, timeout)
    }

    fn peek(&self, template: T, timeout: Duration) -> DaoResult<Option<T>> {
        (**self).peek(template, timeout)
    }

    fn push(&self, entry: T) -> DaoResult<T> {
        (**self).push(entry)
    }

    fn push_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T> {
        (**self).push_with_timeout(entry, timeout)
    }

    fn write(&self, entry: T) -> DaoResult<T> {
        (**self).write(entry)
    }

    fn write_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T> {
        (**self).write_with_timeout(entry, timeout)
    }

    fn update(&self, entry: T) -> DaoResult<T> {
        (**self).update(entry)
    }

    fn update_with_timeout(&self, entry: T, timeout: Duration) -> DaoResult<T> {
        (**self).update_with_timeout(entry, timeout)
    }

    fn reads(&self) -> u64 {
        (**self).reads()
    }

    fn writes(&self) -> u64 {
        (**self).writes()
    }

    fn takes(&self) -> u64 {
        (**self).takes()
    }

    fn reset(&self) {
        (**self).reset()
    }

    fn stats(&self) -> DaoResult<StatsSnapshot> {
        (**self).stats()
    }

    fn count(&self, template: T) -> DaoResult<usize> {
        (**self).count(template)
    }

    fn clear(&self) -> DaoResult<usize> {
        (**self).clear()
    }
}
