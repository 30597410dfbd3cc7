use futures::future::LocalBoxFuture;
use std::time::Duration;

/// Timer and task seam for the single-threaded host event loop.
///
/// The engine only ever suspends inside discovery polling and the mutation
/// debounce, and both go through here.
pub trait Scheduler {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Runs `task` on the current thread. Nothing awaits the result.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}

/// Scheduler for native hosts and tests. Must be used from inside a
/// `tokio::task::LocalSet`.
#[cfg(feature = "tokio")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[cfg(feature = "tokio")]
impl Scheduler for TokioScheduler {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        drop(tokio::task::spawn_local(task));
    }
}
