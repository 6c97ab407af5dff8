use std::collections::{BTreeMap, HashMap};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use simpledao_core::{DaoError, DaoResult, Entity};
use simpledao_query::Criteria;

use crate::config::StoreConfig;
use crate::notifier::{WaitMode, Waiters};
use crate::stats::{Stats, StatsSnapshot};

/// Limit value meaning "every match".
pub const UNBOUNDED: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Write,
    Update,
}

/// Locked store state: live objects in insertion order plus blocked waiters.
#[derive(Debug)]
struct State<T> {
    /// Insertion sequence -> object. Iteration order is first-inserted-first.
    entries: BTreeMap<u64, T>,
    by_id: HashMap<String, u64>,
    next_seq: u64,
    waiters: Waiters<T>,
}

impl<T: Entity> State<T> {
    fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            by_id: HashMap::new(),
            next_seq: 0,
            waiters: Waiters::default(),
        }
    }

    /// Sequence numbers of up to `limit` matches, oldest first.
    fn matching(&self, criteria: &Criteria<T>, limit: usize) -> Vec<u64> {
        if limit == 0 {
            return Vec::new();
        }

        if let Some(id) = criteria.exact_id() {
            return self
                .by_id
                .get(id)
                .filter(|seq| self.entries.get(seq).is_some_and(|e| criteria.matches(e)))
                .map(|seq| vec![*seq])
                .unwrap_or_default();
        }

        self.entries
            .iter()
            .filter(|(_, e)| criteria.matches(e))
            .map(|(seq, _)| *seq)
            .take(limit)
            .collect()
    }

    fn remove(&mut self, seq: u64) -> Option<T> {
        let entity = self.entries.remove(&seq)?;
        if let Some(id) = entity.id() {
            self.by_id.remove(id);
        }
        Some(entity)
    }
}

/// In-memory typed object store.
///
/// - One mutex guards the objects and the waiter list; every mutation and
///   every waiter scan runs under it.
/// - One condvar wakes blocked poll/peek callers and writers waiting for
///   capacity.
/// - Reads hand out clones; stored copies change only through writes.
#[derive(Debug)]
pub struct ObjectStore<T> {
    config: StoreConfig,
    state: Mutex<State<T>>,
    changed: Condvar,
    stats: Stats,
}

impl<T: Entity> Default for ObjectStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> ObjectStore<T> {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            state: Mutex::new(State::new()),
            changed: Condvar::new(),
            stats: Stats::default(),
        }
    }

    pub fn with_config(config: StoreConfig) -> DaoResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn from_env() -> DaoResult<Self> {
        Self::with_config(StoreConfig::from_env()?)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn lock(&self) -> DaoResult<MutexGuard<'_, State<T>>> {
        self.state.lock().map_err(|_| DaoError::poisoned())
    }

    /// Store an entity, assigning id and timestamps as needed.
    ///
    /// A new id in a full bounded store waits up to `timeout` (or the
    /// configured default) for space. An existing id is replaced in place.
    pub fn insert(&self, entity: T, timeout: Option<Duration>) -> DaoResult<T> {
        self.put(entity, timeout, WriteKind::Write)
    }

    /// Replace the entity with the same id, inserting it when the id is
    /// unknown (upsert).
    pub fn update_entity(&self, entity: T, timeout: Option<Duration>) -> DaoResult<T> {
        self.put(entity, timeout, WriteKind::Update)
    }

    fn put(&self, mut entity: T, timeout: Option<Duration>, kind: WriteKind) -> DaoResult<T> {
        let mut state = self.lock()?;

        if !Self::is_stored(&state, &entity) {
            if self.is_full(&state) {
                // A blocked poller that would take the object needs no room.
                let mut candidate = entity.clone();
                let id = candidate.base_mut().stamp(None, Utc::now());
                if state.waiters.would_consume(&candidate) {
                    return Ok(self.hand_off(&mut state, candidate, id));
                }
            }
            state = self.wait_for_capacity(state, timeout)?;
        }

        // Re-resolve after any wait: another caller may have stored this id.
        let existing = entity.id().and_then(|id| state.by_id.get(id).copied());
        let stored_create_time = existing
            .and_then(|seq| state.entries.get(&seq))
            .and_then(|e| e.base().create_time);
        let id = entity.base_mut().stamp(stored_create_time, Utc::now());

        let seq = match existing {
            Some(seq) => seq,
            None => {
                let seq = state.next_seq;
                state.next_seq += 1;
                state.by_id.insert(id.clone(), seq);
                seq
            }
        };
        state.entries.insert(seq, entity.clone());
        self.stats.record_writes(1);

        if kind == WriteKind::Update && existing.is_none() {
            tracing::warn!(entity = T::TYPE_NAME, %id, "update of unknown id stored as new entity");
        } else {
            tracing::debug!(entity = T::TYPE_NAME, %id, replaced = existing.is_some(), "stored entity");
        }

        let offer = state.waiters.offer(&entity);
        if offer.consumed {
            state.remove(seq);
            self.stats.record_takes(1);
            tracing::debug!(entity = T::TYPE_NAME, %id, "handed entity to blocked poller");
        }
        if offer.delivered() {
            self.changed.notify_all();
        }

        Ok(entity)
    }

    /// Deliver a new object straight to waiters without storing it.
    ///
    /// Only called when a poll waiter is known to consume it.
    fn hand_off(&self, state: &mut State<T>, entity: T, id: String) -> T {
        self.stats.record_writes(1);
        let offer = state.waiters.offer(&entity);
        if offer.consumed {
            self.stats.record_takes(1);
        }
        self.changed.notify_all();
        tracing::debug!(entity = T::TYPE_NAME, %id, "full store, handed entity to blocked poller");
        entity
    }

    fn is_full(&self, state: &State<T>) -> bool {
        self.config
            .capacity
            .is_some_and(|capacity| state.entries.len() >= capacity)
    }

    fn is_stored(state: &State<T>, entity: &T) -> bool {
        entity.id().is_some_and(|id| state.by_id.contains_key(id))
    }

    fn wait_for_capacity<'a>(
        &self,
        mut state: MutexGuard<'a, State<T>>,
        timeout: Option<Duration>,
    ) -> DaoResult<MutexGuard<'a, State<T>>> {
        let Some(capacity) = self.config.capacity else {
            return Ok(state);
        };

        let deadline = deadline_after(timeout.unwrap_or_else(|| self.config.default_timeout()));
        while state.entries.len() >= capacity {
            state = match remaining(deadline) {
                Some(left) if left.is_zero() => {
                    tracing::warn!(entity = T::TYPE_NAME, capacity, "store full, rejecting write");
                    return Err(DaoError::capacity_exceeded(capacity));
                }
                Some(left) => {
                    self.changed
                        .wait_timeout(state, left)
                        .map_err(|_| DaoError::poisoned())?
                        .0
                }
                None => self.changed.wait(state).map_err(|_| DaoError::poisoned())?,
            };
        }
        Ok(state)
    }

    /// Non-destructive read of up to `limit` matches, oldest first.
    pub fn find_matching(&self, criteria: &Criteria<T>, limit: usize) -> DaoResult<Vec<T>> {
        let state = self.lock()?;
        let found: Vec<T> = state
            .matching(criteria, limit)
            .into_iter()
            .filter_map(|seq| state.entries.get(&seq).cloned())
            .collect();
        self.stats.record_reads(found.len() as u64);
        tracing::debug!(%criteria, found = found.len(), "read");
        Ok(found)
    }

    /// Non-destructive read of the oldest match. Counts as one read.
    pub fn find_first(&self, criteria: &Criteria<T>) -> DaoResult<Option<T>> {
        let state = self.lock()?;
        let found = state
            .matching(criteria, 1)
            .first()
            .and_then(|seq| state.entries.get(seq).cloned());
        self.stats.record_reads(1);
        tracing::debug!(%criteria, found = found.is_some(), "read one");
        Ok(found)
    }

    /// Remove and return up to `limit` matches, oldest first.
    pub fn remove_matching(&self, criteria: &Criteria<T>, limit: usize) -> DaoResult<Vec<T>> {
        let mut state = self.lock()?;
        let seqs = state.matching(criteria, limit);
        let taken: Vec<T> = seqs.into_iter().filter_map(|seq| state.remove(seq)).collect();
        if !taken.is_empty() {
            self.stats.record_takes(taken.len() as u64);
        }
        drop(state);

        if !taken.is_empty() {
            self.changed.notify_all();
        }
        tracing::debug!(%criteria, taken = taken.len(), "take");
        Ok(taken)
    }

    /// Remove and return the oldest match.
    pub fn remove_first(&self, criteria: &Criteria<T>) -> DaoResult<Option<T>> {
        Ok(self.remove_matching(criteria, 1)?.into_iter().next())
    }

    /// Wait up to `timeout` for a match.
    ///
    /// An existing match is returned at once. Otherwise the caller registers
    /// as a waiter and sleeps on the condvar until a write hands it an object
    /// or the deadline passes. A zero timeout never sleeps.
    pub fn wait_for(
        &self,
        criteria: &Criteria<T>,
        mode: WaitMode,
        timeout: Duration,
    ) -> DaoResult<Option<T>> {
        let mut state = self.lock()?;

        if let Some(seq) = state.matching(criteria, 1).first().copied() {
            let found = match mode {
                WaitMode::Peek => {
                    self.stats.record_reads(1);
                    state.entries.get(&seq).cloned()
                }
                WaitMode::Poll => {
                    let taken = state.remove(seq);
                    self.stats.record_takes(1);
                    self.changed.notify_all();
                    taken
                }
            };
            return Ok(found);
        }

        let result = if timeout.is_zero() {
            None
        } else {
            let ticket = state.waiters.register(mode, criteria.clone());
            let deadline = deadline_after(timeout);
            tracing::debug!(%criteria, ?mode, ?timeout, "waiting for match");

            loop {
                if state.waiters.is_delivered(ticket) {
                    break state.waiters.withdraw(ticket);
                }
                state = match remaining(deadline) {
                    Some(left) if left.is_zero() => break state.waiters.withdraw(ticket),
                    Some(left) => {
                        self.changed
                            .wait_timeout(state, left)
                            .map_err(|_| DaoError::poisoned())?
                            .0
                    }
                    None => self.changed.wait(state).map_err(|_| DaoError::poisoned())?,
                };
            }
        };

        // Poll deliveries were counted as takes at hand-off time.
        if mode == WaitMode::Peek {
            self.stats.record_reads(1);
        }
        if result.is_none() {
            tracing::debug!(%criteria, ?mode, "wait timed out");
        }
        Ok(result)
    }

    pub fn count(&self, criteria: &Criteria<T>) -> DaoResult<usize> {
        let state = self.lock()?;
        Ok(state.matching(criteria, UNBOUNDED).len())
    }

    pub fn len(&self) -> DaoResult<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> DaoResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of callers currently blocked in `wait_for`.
    pub fn waiting(&self) -> DaoResult<usize> {
        Ok(self.lock()?.waiters.len())
    }

    /// Drop every stored object. Counters are left alone.
    pub fn clear(&self) -> DaoResult<usize> {
        let mut state = self.lock()?;
        let removed = state.entries.len();
        state.entries.clear();
        state.by_id.clear();
        drop(state);

        if removed > 0 {
            self.changed.notify_all();
        }
        tracing::debug!(entity = T::TYPE_NAME, removed, "cleared store");
        Ok(removed)
    }

    pub fn reads(&self) -> u64 {
        self.stats.reads()
    }

    pub fn writes(&self) -> u64 {
        self.stats.writes()
    }

    pub fn takes(&self) -> u64 {
        self.stats.takes()
    }

    pub fn stats(&self) -> DaoResult<StatsSnapshot> {
        let size = self.len()?;
        Ok(self.stats.snapshot(size))
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}

/// `None` when the deadline is beyond what `Instant` can represent.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Time left until `deadline`; `None` means no deadline.
fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}
