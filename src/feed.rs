//! Caller-owned bounded transaction feed with change notifications
//!
//! Holds the newest `capacity` entries, newest first. Observers are notified
//! synchronously, in subscription order, on every change.

use std::collections::VecDeque;

/// Change notification delivered to observers
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent<T> {
    Added(T),
    Evicted(T),
    Cleared,
}

/// Receiver of feed change notifications
pub trait FeedObserver<T>: Send + Sync {
    fn on_event(&self, event: &FeedEvent<T>);
}

impl<T, F> FeedObserver<T> for F
where
    F: Fn(&FeedEvent<T>) + Send + Sync,
{
    fn on_event(&self, event: &FeedEvent<T>) {
        self(event)
    }
}

/// Handle returned by [`BoundedFeed::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Bounded, newest-first collection of entries
pub struct BoundedFeed<T> {
    entries: VecDeque<T>,
    capacity: usize,
    observers: Vec<(SubscriptionId, Box<dyn FeedObserver<T>>)>,
    next_id: u64,
}

impl<T: Clone> BoundedFeed<T> {
    /// Create a feed holding at most `capacity` entries (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            observers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(&mut self, observer: impl FeedObserver<T> + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Add an entry at the front, evicting the oldest beyond capacity
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry.clone());
        self.notify(&FeedEvent::Added(entry));

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                self.notify(&FeedEvent::Evicted(evicted));
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.notify(&FeedEvent::Cleared);
    }

    /// Entries, newest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&self, event: &FeedEvent<T>) {
        for (_, observer) in &self.observers {
            observer.on_event(event);
        }
    }
}

impl<T> std::fmt::Debug for BoundedFeed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedFeed")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("observers", &self.observers.len())
            .finish()
    }
}
