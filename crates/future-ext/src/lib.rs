//! Small extension traits for working with futures.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

use std::future::Future;
use std::time::Duration;

use tokio::time::Timeout;

/// Adds a `.with_timeout(...)` combinator to any future.
pub trait FutureExt: Future + Sized {
    /// Wraps this future so that it resolves to `Err(Elapsed)` if it hasn't completed within
    /// `duration`.
    fn with_timeout(self, duration: Duration) -> Timeout<Self> {
        tokio::time::timeout(duration, self)
    }
}

impl<F: Future> FutureExt for F {}
