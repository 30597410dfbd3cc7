use std::future::Future;
use std::time::Duration;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Returned by [`poll_until`] when the probe never produced a value within
/// the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed {
    pub waited: Duration,
}

/// Repeatedly runs `probe` until it yields a value, sleeping `interval`
/// between attempts, for at most `timeout` of accumulated sleep.
///
/// The probe runs once immediately and once more after the final sleep, so a
/// zero timeout still checks the current state exactly once. Elapsed time is
/// measured by the sleeps that were awaited rather than a wall clock, which
/// keeps the helper usable on executors without a monotonic clock.
pub async fn poll_until<T, P, S, F>(
    mut probe: P,
    sleep: S,
    interval: Duration,
    timeout: Duration,
) -> Result<T, Elapsed>
where
    P: FnMut() -> Option<T>,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let step = interval.max(MIN_POLL_INTERVAL);
    let mut waited = Duration::ZERO;
    loop {
        if let Some(value) = probe() {
            return Ok(value);
        }
        if waited >= timeout {
            return Err(Elapsed { waited });
        }
        sleep(step).await;
        waited += step;
    }
}
