//! Pen safety watchdog
//!
//! The pen mechanism can be damaged if left pressed against the drawing
//! surface unattended, so every pen-lowering or movement action arms a
//! countdown; if it is not disarmed (or re-armed) before expiry, the
//! guard lifts the pen once and disarms itself. A watchdog, not a
//! correctness mechanism for drawing.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Default)]
struct GuardInner {
    /// Bumped on every arm/disarm; a sleeping timer whose generation no
    /// longer matches has been superseded and must not fire.
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Cancelable auto-lift countdown for the pen.
///
/// Clones share the same timer; (re)arming replaces any pending
/// countdown.
#[derive(Clone)]
pub struct PenLiftGuard {
    inner: Arc<Mutex<GuardInner>>,
    delay: Duration,
}

impl PenLiftGuard {
    /// Create a guard with the given countdown delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GuardInner::default())),
            delay,
        }
    }

    /// (Re)start the countdown. On expiry, `lift` runs exactly once and
    /// the guard disarms itself.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&self, lift: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let inner = self.inner.clone();
        let delay = self.delay;

        let mut guard = self.inner.lock();
        guard.generation += 1;
        let generation = guard.generation;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut guard = inner.lock();
                if guard.generation != generation {
                    // Superseded by a later arm or a disarm while we slept
                    return;
                }
                // Self-disarm before lifting so the lift's own pen-up
                // (which disarms) cannot abort this task mid-flight.
                guard.generation += 1;
                guard.task.take();
            }
            tracing::warn!("Pen idle for {:?}, lifting it", delay);
            lift.await;
        });

        if let Some(previous) = guard.task.replace(task) {
            previous.abort();
        }
    }

    /// Cancel any pending countdown. No side effects.
    pub fn disarm(&self) {
        let mut guard = self.inner.lock();
        guard.generation += 1;
        if let Some(task) = guard.task.take() {
            task.abort();
        }
    }

    /// Whether a countdown is currently pending.
    pub fn is_armed(&self) -> bool {
        self.inner
            .lock()
            .task
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }
}
