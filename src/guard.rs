//! Deadline guard for probe calls.
//!
//! Wraps a probe future in a race against a timer so a hung host API
//! (for example a permission prompt nobody answers) cannot stall report
//! assembly. On expiry the probe's eventual result is dropped with the
//! future; it can never reach merged report state afterwards.

use crate::signal::SignalResult;
use std::future::Future;
use std::time::Duration;

/// Default deadline applied to on-demand probes.
pub const DEFAULT_PROBE_DEADLINE: Duration = Duration::from_millis(4000);

/// Default wall-clock cap for transport-candidate gathering.
pub const DEFAULT_GATHER_CAP: Duration = Duration::from_millis(2500);

/// Race `probe` against `deadline`.
///
/// Guards are independent per call; there is no shared timer state.
pub async fn guard<T, F>(probe: F, deadline: Duration) -> SignalResult<T>
where
    F: Future<Output = SignalResult<T>>,
{
    match tokio::time::timeout(deadline, probe).await {
        Ok(result) => result,
        Err(_) => SignalResult::error(format!("timeout after {}ms", deadline.as_millis())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_guard_passes_through_fast_probe() {
        let result = guard(
            async { SignalResult::collected(41_u32) },
            Duration::from_millis(500),
        )
        .await;
        assert_eq!(result.value(), Some(&41));
    }

    #[tokio::test]
    async fn test_guard_times_out_hung_probe() {
        let started = Instant::now();
        let result: SignalResult<u32> =
            guard(std::future::pending(), Duration::from_millis(50)).await;

        assert_eq!(result, SignalResult::error("timeout after 50ms"));
        // Within deadline plus a small epsilon.
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_late_resolution_is_discarded() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let resolved = Arc::new(AtomicBool::new(false));
        let flag = resolved.clone();

        let result: SignalResult<u32> = guard(
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                SignalResult::collected(1)
            },
            Duration::from_millis(20),
        )
        .await;

        assert!(matches!(result, SignalResult::Error { .. }));

        // The probe future was dropped at expiry; even after its would-be
        // completion time it never ran to the end.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!resolved.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_guard_preserves_unsupported() {
        let result: SignalResult<u32> = guard(
            async { SignalResult::unsupported_with("no such capability") },
            Duration::from_millis(100),
        )
        .await;
        assert!(result.is_unsupported());
    }
}
