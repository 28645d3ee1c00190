use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative stop signal shared by every clone.
///
/// Stopping is one-way: once [`stop`](Self::stop) is called the token stays
/// stopped.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        // `Release` pairs with the `Acquire` in `is_stopped`.
        if !self.0.swap(true, Ordering::Release) {
            tracing::debug!("stop requested");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
