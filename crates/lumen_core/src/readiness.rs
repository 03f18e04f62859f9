//! Readiness gate
//!
//! Widgets defer their first render until the reactive-binding framework
//! they layer on has loaded. The framework arrives asynchronously, so the
//! gate polls a [`FrameworkProbe`] on a fixed interval until it reports a
//! version.
//!
//! A gate is shared: every widget awaiting it awaits the same
//! `tokio::sync::OnceCell`, so N waiting widgets cost one poll loop, not N.
//! The first waiter drives the loop; if that waiter is dropped, the next
//! waiter takes it over. Resolution is written once.
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::readiness::{shared_gate, ReadinessGate, FRAMEWORK_GATE};
//!
//! let gate = shared_gate(FRAMEWORK_GATE, || {
//!     ReadinessGate::new(|| std::env::var("FRAMEWORK_VERSION").ok())
//! });
//! let readiness = gate.wait().await;
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::sync::OnceCell;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::ReadinessConfig;

/// Well-known name of the reactive framework gate
pub const FRAMEWORK_GATE: &str = "framework";

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reports whether the external framework is available
pub trait FrameworkProbe: Send + Sync + 'static {
    /// The framework's version marker, once loaded
    fn version(&self) -> Option<String>;
}

impl<F> FrameworkProbe for F
where
    F: Fn() -> Option<String> + Send + Sync + 'static,
{
    fn version(&self) -> Option<String> {
        self()
    }
}

/// How a gate resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// Framework present (`version` is `None` for gates with no probe)
    Ready { version: Option<String> },
    /// Bounded wait expired; widgets render without enhancement
    TimedOut,
}

impl Readiness {
    /// Whether the enhancement step should run after renders
    pub fn is_enhanced(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }
}

struct GateInner {
    probe: Option<Arc<dyn FrameworkProbe>>,
    poll_interval: Duration,
    timeout: Option<Duration>,
    outcome: OnceCell<Readiness>,
    /// When polling first began; the timeout counts from here even if the
    /// polling waiter is dropped and another one takes over
    first_poll: OnceLock<Instant>,
    polls: AtomicU64,
}

/// Shared, resolve-once readiness signal
#[derive(Clone)]
pub struct ReadinessGate {
    inner: Arc<GateInner>,
}

impl ReadinessGate {
    /// Gate polling `probe` every 10ms with no timeout
    pub fn new(probe: impl FrameworkProbe) -> Self {
        Self::build(Some(Arc::new(probe)), DEFAULT_POLL_INTERVAL, None, None)
    }

    /// Gate polling `probe` with the configured interval and timeout
    pub fn with_config(probe: impl FrameworkProbe, config: &ReadinessConfig) -> Self {
        Self::build(
            Some(Arc::new(probe)),
            config.poll_interval(),
            config.timeout(),
            None,
        )
    }

    /// Gate that is already open (hosts without a reactive framework)
    pub fn resolved() -> Self {
        Self::build(
            None,
            DEFAULT_POLL_INTERVAL,
            None,
            Some(Readiness::Ready { version: None }),
        )
    }

    fn build(
        probe: Option<Arc<dyn FrameworkProbe>>,
        poll_interval: Duration,
        timeout: Option<Duration>,
        outcome: Option<Readiness>,
    ) -> Self {
        Self {
            inner: Arc::new(GateInner {
                probe,
                poll_interval: poll_interval.max(Duration::from_millis(1)),
                timeout,
                outcome: OnceCell::new_with(outcome),
                first_poll: OnceLock::new(),
                polls: AtomicU64::new(0),
            }),
        }
    }

    /// Wait for the gate to open
    pub async fn wait(&self) -> Readiness {
        self.inner
            .outcome
            .get_or_init(|| poll_until_ready(&self.inner))
            .await
            .clone()
    }

    /// The resolution, if the gate has already opened
    pub fn try_get(&self) -> Option<Readiness> {
        self.inner.outcome.get().cloned()
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.outcome.initialized()
    }

    /// Number of probe calls made so far
    pub fn poll_count(&self) -> u64 {
        self.inner.polls.load(Ordering::Relaxed)
    }

    /// Whether two handles refer to the same gate
    pub fn same_gate(&self, other: &ReadinessGate) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("poll_interval", &self.inner.poll_interval)
            .field("timeout", &self.inner.timeout)
            .field("outcome", &self.inner.outcome.get())
            .field("polls", &self.poll_count())
            .finish()
    }
}

async fn poll_until_ready(inner: &GateInner) -> Readiness {
    let Some(probe) = inner.probe.as_ref() else {
        return Readiness::Ready { version: None };
    };

    let started = *inner.first_poll.get_or_init(Instant::now);
    let mut interval = tokio::time::interval(inner.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        inner.polls.fetch_add(1, Ordering::Relaxed);

        if let Some(version) = probe.version() {
            tracing::debug!("Readiness gate open: framework {}", version);
            return Readiness::Ready {
                version: Some(version),
            };
        }

        if let Some(timeout) = inner.timeout {
            if started.elapsed() >= timeout {
                tracing::warn!(
                    "Framework not ready after {:?}; rendering without enhancement",
                    timeout
                );
                return Readiness::TimedOut;
            }
        }
    }
}

static SHARED_GATES: OnceLock<Mutex<FxHashMap<&'static str, ReadinessGate>>> = OnceLock::new();

/// Process-wide gate for `name`, created by `factory` on first use
///
/// Later calls return the memoized gate and ignore their factory.
pub fn shared_gate<F>(name: &'static str, factory: F) -> ReadinessGate
where
    F: FnOnce() -> ReadinessGate,
{
    let gates = SHARED_GATES.get_or_init(|| Mutex::new(FxHashMap::default()));
    let mut gates = gates.lock().unwrap();
    gates.entry(name).or_insert_with(factory).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn ready_after(calls: usize) -> (Arc<AtomicUsize>, impl FrameworkProbe) {
        let counter = Arc::new(AtomicUsize::new(0));
        let probe_counter = counter.clone();
        let probe = move || {
            let n = probe_counter.fetch_add(1, Ordering::SeqCst) + 1;
            (n >= calls).then(|| "3.14.1".to_string())
        };
        (counter, probe)
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_share_one_poll_loop() {
        let (calls, probe) = ready_after(5);
        let gate = ReadinessGate::new(probe);
        let other_handle = gate.clone();

        let (a, b, c) = tokio::join!(gate.wait(), gate.wait(), other_handle.wait());

        let expected = Readiness::Ready {
            version: Some("3.14.1".into()),
        };
        assert_eq!(a, expected);
        assert_eq!(b, expected);
        assert_eq!(c, expected);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(gate.poll_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolution_is_memoized() {
        let (calls, probe) = ready_after(1);
        let gate = ReadinessGate::new(probe);

        assert!(!gate.is_resolved());
        gate.wait().await;
        gate.wait().await;

        assert!(gate.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolved_gate_never_polls() {
        let gate = ReadinessGate::resolved();
        assert!(gate.is_resolved());
        assert_eq!(gate.wait().await, Readiness::Ready { version: None });
        assert_eq!(gate.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_renders_without_enhancement() {
        let config = ReadinessConfig {
            poll_interval_ms: 10,
            timeout_ms: Some(50),
        };
        let gate = ReadinessGate::with_config(|| None::<String>, &config);

        let readiness = gate.wait().await;
        assert_eq!(readiness, Readiness::TimedOut);
        assert!(!readiness.is_enhanced());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_survives_dropped_waiter() {
        let config = ReadinessConfig {
            poll_interval_ms: 10,
            timeout_ms: Some(100),
        };
        let gate = ReadinessGate::with_config(|| None::<String>, &config);
        let began = Instant::now();

        let abandoned = tokio::time::timeout(Duration::from_millis(60), gate.wait()).await;
        assert!(abandoned.is_err());
        assert!(!gate.is_resolved());

        assert_eq!(gate.wait().await, Readiness::TimedOut);
        assert!(began.elapsed() <= Duration::from_millis(110));
    }

    #[test]
    fn test_shared_gate_is_memoized_by_name() {
        let first = shared_gate("test-shared", ReadinessGate::resolved);
        let second = shared_gate("test-shared", || ReadinessGate::new(|| None::<String>));
        let other = shared_gate("test-other", ReadinessGate::resolved);

        assert!(first.same_gate(&second));
        assert!(!first.same_gate(&other));
    }
}
