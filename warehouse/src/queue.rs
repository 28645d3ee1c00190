use core::fmt;
use core::num::NonZeroUsize;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::error::{Cancelled, Error};
use crate::stop::StopToken;

/// Upper bound on how long a cancellable wait sleeps before re-checking its
/// [`StopToken`].
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A fixed-capacity FIFO queue whose operations block instead of failing.
///
/// All state lives behind a single mutex, which is held only while moving an
/// item in or out of its slot. Log events are emitted with the mutex released. Callers waiting for space park on `not_full`
/// and callers waiting for items park on `not_empty`; every state change
/// wakes one waiter of the class that can now make progress.
pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

struct Ring<T> {
    slots: Box<[Option<T>]>,
    /// Next slot to remove from.
    head: usize,
    /// Next slot to insert into.
    tail: usize,
    count: usize,
}

impl<T> Ring<T> {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None)
                .take(capacity.get())
                .collect(),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn push(&mut self, item: T) {
        debug_assert!(!self.is_full());
        let slot = &mut self.slots[self.tail];
        debug_assert!(slot.is_none(), "invalid queue state");
        *slot = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        self.count += 1;
    }

    fn pop(&mut self) -> T {
        debug_assert!(!self.is_empty());
        let item = self.slots[self.head].take().expect("invalid queue state");
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        item
    }
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or(Error::ZeroCapacity)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            ring: Mutex::new(Ring::new(capacity)),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    /// Returns the number of items currently held.
    ///
    /// The value may be stale as soon as it is returned.
    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.lock().is_full()
    }

    /// Moves `item` into the queue, blocking while the queue is full.
    pub fn insert(&self, item: T) {
        let mut ring = self.ring.lock();
        if ring.is_full() {
            let capacity = ring.capacity();
            MutexGuard::unlocked(&mut ring, || {
                tracing::trace!(capacity, "queue full, waiting for space");
            });
            self.not_full.wait_while(&mut ring, |r| r.is_full());
        }
        ring.push(item);
        drop(ring);
        self.not_empty.notify_one();
    }

    /// Takes the oldest item out of the queue, blocking while the queue is
    /// empty.
    pub fn remove(&self) -> T {
        let mut ring = self.ring.lock();
        if ring.is_empty() {
            MutexGuard::unlocked(&mut ring, || {
                tracing::trace!("queue empty, waiting for an item");
            });
            self.not_empty.wait_while(&mut ring, |r| r.is_empty());
        }
        let item = ring.pop();
        drop(ring);
        self.not_full.notify_one();
        item
    }

    /// Like [`insert`](Self::insert), but gives up once `stop` is stopped.
    ///
    /// The token is only consulted while the queue is full; if a slot is free
    /// the item is stored regardless. On cancellation the item is handed back
    /// untouched.
    pub fn insert_until(&self, item: T, stop: &StopToken) -> Result<(), Cancelled<T>> {
        let mut ring = self.ring.lock();
        if !Self::wait_until(&mut ring, &self.not_full, Ring::is_full, stop) {
            drop(ring);
            tracing::debug!("cancelled a blocked insert");
            return Err(Cancelled(item));
        }
        ring.push(item);
        drop(ring);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Like [`remove`](Self::remove), but gives up once `stop` is stopped.
    ///
    /// The token is only consulted while the queue is empty.
    pub fn remove_until(&self, stop: &StopToken) -> Result<T, Cancelled> {
        let mut ring = self.ring.lock();
        if !Self::wait_until(&mut ring, &self.not_empty, Ring::is_empty, stop) {
            drop(ring);
            tracing::debug!("cancelled a blocked remove");
            return Err(Cancelled(()));
        }
        let item = ring.pop();
        drop(ring);
        self.not_full.notify_one();
        Ok(item)
    }

    /// Waits on `cond` while `blocked` holds, re-checking `stop` on every
    /// wakeup and at least every [`STOP_POLL_INTERVAL`].
    ///
    /// Returns `false` if the wait was cancelled. Cancellation is only
    /// reported while still blocked, so a wakeup meant for this waiter is
    /// never swallowed.
    fn wait_until(
        ring: &mut MutexGuard<'_, Ring<T>>,
        cond: &Condvar,
        blocked: fn(&Ring<T>) -> bool,
        stop: &StopToken,
    ) -> bool {
        while blocked(&**ring) {
            if stop.is_stopped() {
                return false;
            }
            _ = cond.wait_for(ring, STOP_POLL_INTERVAL);
        }
        true
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("BoundedQueue")
            .field("capacity", &ring.capacity())
            .field("len", &ring.count)
            .finish_non_exhaustive()
    }
}
