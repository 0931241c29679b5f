//! Crossing between the synchronous execution context and the event
//! scheduler.
//!
//! # Responsibilities
//! - Make the scheduler an explicit dependency of the adapters rather than
//!   ambient state
//! - Run an asynchronous operation to completion on behalf of a blocking
//!   caller, without ever blocking the scheduler on itself
//!
//! # Design Decisions
//! - Dispatch is decided per call: a caller already inside a runtime
//!   worker enters a blocking section first, a plain thread just parks on
//!   the result
//! - No busy-waiting anywhere; the runtime's own parking is used

use std::future::Future;

use tokio::runtime::Handle;

/// Handle to the event scheduler that drives the transport.
///
/// Cheap to clone; each input adapter owns one.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    handle: Handle,
}

impl SchedulerHandle {
    /// Wrap an explicit runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Capture the runtime the caller is currently executing on.
    ///
    /// Returns `None` when called outside any runtime context.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Run `future` on the scheduler and block the calling execution
    /// context until it completes.
    ///
    /// From a plain worker thread only that thread parks while the
    /// runtime driver makes progress. From inside a runtime worker the
    /// call enters [`tokio::task::block_in_place`] first so the scheduler
    /// keeps running its other tasks; that path requires the multi-thread
    /// runtime flavor.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(_) => tokio::task::block_in_place(|| self.handle.block_on(future)),
            Err(_) => self.handle.block_on(future),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_from_plain_thread() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let scheduler = SchedulerHandle::new(rt.handle().clone());

        // The test thread is not a runtime worker; the handle must still
        // drive the future to completion.
        let value = scheduler.block_on(async { 21 * 2 });
        assert_eq!(value, 42);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_block_on_from_runtime_worker() {
        let scheduler = SchedulerHandle::try_current().expect("inside runtime");

        // Calling from a worker thread must not deadlock the scheduler.
        let value = tokio::task::spawn_blocking(move || scheduler.block_on(async { "done" }))
            .await
            .unwrap();
        assert_eq!(value, "done");
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(SchedulerHandle::try_current().is_none());
    }
}
