use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Timed out after {}ms", .budget.as_millis())]
pub struct DeadlineExceeded {
    pub budget: Duration,
}

/// Races `work` against a timer of length `budget`.
///
/// Whichever branch loses is dropped before this returns, so the timer never
/// outlives the call. The work future is dropped too when the timer wins, but
/// anything it already spawned keeps running; callers that own such tasks are
/// responsible for cancelling them.
///
/// # Errors
/// Returns [`DeadlineExceeded`] if the timer fires before `work` completes.
pub async fn guard<F, T>(budget: Duration, work: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        output = work => Ok(output),
        () = tokio::time::sleep(budget) => Err(DeadlineExceeded { budget }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_work_finishes_first() {
        let res = guard(Duration::from_millis(500), async { 7 }).await;
        assert_eq!(res, Ok(7));
    }

    #[tokio::test]
    async fn test_underlying_failure_propagates() {
        let res: Result<Result<(), &str>, _> = guard(Duration::from_millis(500), async { Err("refused") }).await;
        assert_eq!(res, Ok(Err("refused")));
    }

    #[tokio::test]
    async fn test_timer_fires_first() {
        let start = Instant::now();
        let res = guard(Duration::from_millis(50), std::future::pending::<()>()).await;

        assert_eq!(res, Err(DeadlineExceeded { budget: Duration::from_millis(50) }));
        assert!(start.elapsed() < Duration::from_millis(1000));
    }

    #[test]
    fn test_timeout_message() {
        let err = DeadlineExceeded { budget: Duration::from_millis(1500) };
        assert_eq!(err.to_string(), "Timed out after 1500ms");
    }
}
