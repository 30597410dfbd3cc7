//! Small async building blocks shared by the sidebar crates.
//!
//! Nothing in here assumes a particular executor: sleeping is always supplied
//! by the caller, so the same helpers run under tokio in tests and under the
//! browser event loop in production.

use async_trait::async_trait;
use futures::future::Either;
use futures::future::select;
use std::future::Future;
use std::pin::pin;
use tokio_util::sync::CancellationToken;

mod debounce;
mod poll;

pub use debounce::DebounceTicket;
pub use debounce::Debouncer;
pub use poll::Elapsed;
pub use poll::poll_until;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelErr {
    Cancelled,
}

#[async_trait(?Send)]
pub trait OrCancelExt: Sized {
    type Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr>;
}

#[async_trait(?Send)]
impl<F> OrCancelExt for F
where
    F: Future,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr> {
        if token.is_cancelled() {
            return Err(CancelErr::Cancelled);
        }
        let cancelled = pin!(token.cancelled());
        let work = pin!(self);
        match select(cancelled, work).await {
            Either::Left(_) => Err(CancelErr::Cancelled),
            Either::Right((output, _)) => Ok(output),
        }
    }
}
