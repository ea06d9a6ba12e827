//! Visibility notifications from the host.
//!
//! The host owns the actual observer. It calls [`Viewport::report_visible`]
//! whenever the sentinel scrolls into view; the loader receives those as
//! [`VisibilitySignal`]s on a channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::surface::Sentinel;

/// Generation 0 means nothing is observed.
const UNOBSERVED: u64 = 0;

/// The sentinel became visible while `generation` was being observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilitySignal {
    pub generation: u64,
}

#[derive(Debug)]
struct Shared {
    tx: mpsc::UnboundedSender<VisibilitySignal>,
    observing: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    shared: Arc<Shared>,
}

impl Viewport {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<VisibilitySignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let viewport = Self {
            shared: Arc::new(Shared {
                tx,
                observing: AtomicU64::new(UNOBSERVED),
            }),
        };
        (viewport, rx)
    }

    /// Starts observing `sentinel` for a session generation (must be non-zero).
    /// A later subscription replaces an earlier one.
    pub fn subscribe(&self, sentinel: &Sentinel, generation: u64) -> Subscription {
        debug_assert_ne!(generation, UNOBSERVED);
        self.shared.observing.store(generation, Ordering::SeqCst);
        tracing::debug!("Observing #{} for session {}", sentinel.id(), generation);
        Subscription {
            shared: self.shared.clone(),
            generation,
        }
    }

    /// Host hook. Returns false when nothing is observed or the loader is gone.
    pub fn report_visible(&self) -> bool {
        let generation = self.shared.observing.load(Ordering::SeqCst);
        if generation == UNOBSERVED {
            return false;
        }
        self.shared.tx.send(VisibilitySignal { generation }).is_ok()
    }

    pub fn is_observing(&self) -> bool {
        self.shared.observing.load(Ordering::SeqCst) != UNOBSERVED
    }
}

/// Observation handle. Dropping it stops observation too.
#[derive(Debug)]
pub struct Subscription {
    shared: Arc<Shared>,
    generation: u64,
}

impl Subscription {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stops observation now rather than when the handle goes out of scope.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Only clear our own generation; a newer subscription may have replaced us.
        let _ = self.shared.observing.compare_exchange(
            self.generation,
            UNOBSERVED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_without_subscription_is_noop() {
        let (viewport, mut rx) = Viewport::channel();
        assert!(!viewport.report_visible());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_signals_carry_generation() {
        let (viewport, mut rx) = Viewport::channel();
        let _sub = viewport.subscribe(&Sentinel::new("s"), 3);

        assert!(viewport.report_visible());
        assert_eq!(rx.try_recv().unwrap(), VisibilitySignal { generation: 3 });
    }

    #[test]
    fn test_unsubscribe_stops_signals() {
        let (viewport, mut rx) = Viewport::channel();
        let sub = viewport.subscribe(&Sentinel::new("s"), 1);
        sub.unsubscribe();

        assert!(!viewport.is_observing());
        assert!(!viewport.report_visible());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stale_subscription_drop_keeps_newer_one() {
        let (viewport, mut rx) = Viewport::channel();
        let old = viewport.subscribe(&Sentinel::new("s"), 1);
        let _new = viewport.subscribe(&Sentinel::new("s"), 2);
        drop(old);

        assert!(viewport.report_visible());
        assert_eq!(rx.try_recv().unwrap().generation, 2);
    }
}
