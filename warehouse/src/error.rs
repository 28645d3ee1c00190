use core::fmt;

/// Errors returned when constructing a [`BoundedQueue`](crate::BoundedQueue).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested capacity was zero.
    ZeroCapacity,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroCapacity => f.write_str("queue capacity must not be zero"),
        }
    }
}

impl std::error::Error for Error {}

/// A wait that was abandoned because its [`StopToken`](crate::StopToken) was
/// stopped.
///
/// For insertions this carries back the item that was never stored.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cancelled<T = ()>(pub T);

impl<T> Cancelled<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Items need not be `Debug`, so they are never printed.
impl<T> fmt::Debug for Cancelled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancelled").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Cancelled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation cancelled")
    }
}

impl<T> std::error::Error for Cancelled<T> {}
