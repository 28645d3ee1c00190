//! A bounded, blocking FIFO queue for handing items from producer threads to
//! consumer threads.
//!
//! [`BoundedQueue`] applies backpressure in both directions: inserting into a
//! full queue blocks until a slot is freed, and removing from an empty queue
//! blocks until an item arrives. The `*_until` variants additionally observe
//! a [`StopToken`] so callers can shut down without deadlocking.

mod error;
pub use error::{Cancelled, Error};

mod queue;
pub use queue::{BoundedQueue, STOP_POLL_INTERVAL};

mod stop;
pub use stop::StopToken;
