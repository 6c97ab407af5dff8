//! Blocked poll/peek waiters and the hand-off of newly stored objects.
//!
//! Waiters live inside the store's locked state, so registering, offering
//! and withdrawing are all serialised with store mutations. That rules out
//! lost wake-ups and double delivery: when an object is stored, waiters are
//! visited in registration order, every matching peek waiter gets a copy and
//! only the first matching poll waiter gets the object itself.

use simpledao_core::Entity;
use simpledao_query::Criteria;

/// How a blocked caller wants to receive its match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Observe without removing.
    Peek,
    /// Remove on delivery.
    Poll,
}

#[derive(Debug)]
struct Waiter<T> {
    ticket: u64,
    mode: WaitMode,
    criteria: Criteria<T>,
    delivered: Option<T>,
}

/// Outcome of offering a stored object to the waiters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Offer {
    /// Peek waiters that received a copy.
    pub observed: usize,
    /// Whether a poll waiter took the object; the caller must remove it.
    pub consumed: bool,
}

impl Offer {
    pub fn delivered(&self) -> bool {
        self.consumed || self.observed > 0
    }
}

#[derive(Debug)]
pub(crate) struct Waiters<T> {
    next_ticket: u64,
    queue: Vec<Waiter<T>>,
}

impl<T> Default for Waiters<T> {
    fn default() -> Self {
        Self {
            next_ticket: 0,
            queue: Vec::new(),
        }
    }
}

impl<T: Entity> Waiters<T> {
    pub fn register(&mut self, mode: WaitMode, criteria: Criteria<T>) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.queue.push(Waiter {
            ticket,
            mode,
            criteria,
            delivered: None,
        });
        ticket
    }

    /// Offer a freshly stored object to pending waiters.
    pub fn offer(&mut self, value: &T) -> Offer {
        let mut offer = Offer::default();

        for waiter in self.queue.iter_mut().filter(|w| w.delivered.is_none()) {
            if !waiter.criteria.matches(value) {
                continue;
            }
            match waiter.mode {
                WaitMode::Peek => {
                    waiter.delivered = Some(value.clone());
                    offer.observed += 1;
                }
                WaitMode::Poll if !offer.consumed => {
                    waiter.delivered = Some(value.clone());
                    offer.consumed = true;
                }
                WaitMode::Poll => {}
            }
        }

        offer
    }

    /// Whether `offer(value)` would hand the object to a poll waiter.
    pub fn would_consume(&self, value: &T) -> bool {
        self.queue.iter().any(|w| {
            w.mode == WaitMode::Poll && w.delivered.is_none() && w.criteria.matches(value)
        })
    }

    pub fn is_delivered(&self, ticket: u64) -> bool {
        self.queue
            .iter()
            .any(|w| w.ticket == ticket && w.delivered.is_some())
    }

    /// Deregister a waiter, returning whatever was delivered to it.
    pub fn withdraw(&mut self, ticket: u64) -> Option<T> {
        let index = self.queue.iter().position(|w| w.ticket == ticket)?;
        self.queue.remove(index).delivered
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simpledao_core::SampleEntity;

    fn template(text: &str) -> Criteria<SampleEntity> {
        Criteria::template(SampleEntity::with_text(text))
    }

    #[test]
    fn first_registered_poll_waiter_wins() {
        let mut waiters = Waiters::default();
        let first = waiters.register(WaitMode::Poll, template("x"));
        let second = waiters.register(WaitMode::Poll, template("x"));

        let offer = waiters.offer(&SampleEntity::with_text("x"));
        assert!(offer.consumed);
        assert!(waiters.is_delivered(first));
        assert!(!waiters.is_delivered(second));

        assert!(waiters.withdraw(first).is_some());
        assert!(waiters.withdraw(second).is_none());
        assert!(waiters.is_empty());
    }

    #[test]
    fn every_matching_peek_waiter_observes() {
        let mut waiters = Waiters::default();
        let a = waiters.register(WaitMode::Peek, template("x"));
        let poll = waiters.register(WaitMode::Poll, template("x"));
        let b = waiters.register(WaitMode::Peek, Criteria::All);
        let other = waiters.register(WaitMode::Peek, template("y"));

        let offer = waiters.offer(&SampleEntity::with_text("x"));
        assert_eq!(offer, Offer { observed: 2, consumed: true });
        assert!(waiters.is_delivered(a));
        assert!(waiters.is_delivered(poll));
        assert!(waiters.is_delivered(b));
        assert!(!waiters.is_delivered(other));
        assert_eq!(waiters.len(), 4);
    }

    #[test]
    fn served_waiters_are_skipped_by_later_offers() {
        let mut waiters = Waiters::default();
        let first = waiters.register(WaitMode::Poll, Criteria::All);
        let second = waiters.register(WaitMode::Poll, Criteria::All);

        waiters.offer(&SampleEntity::with_text("one"));
        waiters.offer(&SampleEntity::with_text("two"));

        assert_eq!(waiters.withdraw(first).and_then(|e| e.text), Some("one".into()));
        assert_eq!(waiters.withdraw(second).and_then(|e| e.text), Some("two".into()));
    }

    #[test]
    fn would_consume_ignores_peekers_and_served_pollers() {
        let mut waiters = Waiters::default();
        waiters.register(WaitMode::Peek, template("x"));
        assert!(!waiters.would_consume(&SampleEntity::with_text("x")));

        waiters.register(WaitMode::Poll, template("x"));
        assert!(waiters.would_consume(&SampleEntity::with_text("x")));
        assert!(!waiters.would_consume(&SampleEntity::with_text("y")));

        waiters.offer(&SampleEntity::with_text("x"));
        assert!(!waiters.would_consume(&SampleEntity::with_text("x")));
    }

    #[test]
    fn no_match_delivers_nothing() {
        let mut waiters = Waiters::default();
        waiters.register(WaitMode::Poll, template("x"));
        let offer = waiters.offer(&SampleEntity::with_text("y"));
        assert!(!offer.delivered());
    }
}
