//! Advisory sync status derived from reachability transitions.
//!
//! The remote service reports no completion, so `Resyncing` is shown for a
//! fixed settle window after connectivity returns.
//!
//! # Invariants
//! - Going offline always wins and invalidates any armed settle timer.
//! - A settle timer only moves `Resyncing` to `Idle` for the arming it was
//!   issued for; stale fires are no-ops.

use log::debug;
use std::time::{Duration, Instant};

/// Time `Resyncing` is held after connectivity returns.
pub const RESYNC_SETTLE: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Offline,
    Resyncing,
}

impl SyncStatus {
    /// Status label shown next to the pager; `None` hides it.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Offline => Some("Offline"),
            Self::Resyncing => Some("Syncing…"),
        }
    }
}

/// Deferred callback armed when entering `Resyncing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimer {
    generation: u64,
    due_at: Instant,
}

impl SettleTimer {
    pub fn due_at(&self) -> Instant {
        self.due_at
    }
}

/// State machine over `Idle | Offline | Resyncing`.
#[derive(Debug, Default)]
pub struct SyncStatusCoordinator {
    state: SyncStatus,
    generation: u64,
    pending: Option<SettleTimer>,
}

impl SyncStatusCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SyncStatus {
        self.state
    }

    pub fn label(&self) -> Option<&'static str> {
        self.state.label()
    }

    /// Deadline of the armed settle timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|timer| timer.due_at)
    }

    /// Applies a reachability transition observed at `now`.
    ///
    /// Returns the timer to schedule when this call armed one.
    pub fn handle_network_change(&mut self, online: bool, now: Instant) -> Option<SettleTimer> {
        let previous = self.state;

        let armed = if !online {
            self.cancel_pending();
            self.state = SyncStatus::Offline;
            None
        } else if previous == SyncStatus::Offline {
            self.generation += 1;
            let timer = SettleTimer {
                generation: self.generation,
                due_at: now + RESYNC_SETTLE,
            };
            self.pending = Some(timer);
            self.state = SyncStatus::Resyncing;
            Some(timer)
        } else {
            self.cancel_pending();
            self.state = SyncStatus::Idle;
            None
        };

        if previous != self.state {
            debug!(
                "event=sync_status module=sync status=ok from={previous:?} to={:?}",
                self.state
            );
        }
        armed
    }

    /// Fires a settle timer. Returns whether the state changed.
    pub fn fire(&mut self, timer: SettleTimer) -> bool {
        let current = self
            .pending
            .is_some_and(|pending| pending.generation == timer.generation);
        if !current || self.state != SyncStatus::Resyncing {
            return false;
        }

        self.pending = None;
        self.state = SyncStatus::Idle;
        debug!("event=sync_status module=sync status=ok from=Resyncing to=Idle");
        true
    }

    /// Fires the armed timer when it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(timer) if timer.due_at <= now => self.fire(timer),
            _ => false,
        }
    }

    fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            self.generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SyncStatus, SyncStatusCoordinator, RESYNC_SETTLE};
    use std::time::{Duration, Instant};

    #[test]
    fn starts_idle_without_label() {
        let coordinator = SyncStatusCoordinator::new();
        assert_eq!(coordinator.state(), SyncStatus::Idle);
        assert_eq!(coordinator.label(), None);
    }

    #[test]
    fn online_offline_online_settles_to_idle_after_timer() {
        let start = Instant::now();
        let mut coordinator = SyncStatusCoordinator::new();

        assert!(coordinator.handle_network_change(true, start).is_none());
        assert!(coordinator.handle_network_change(false, start).is_none());
        assert_eq!(coordinator.label(), Some("Offline"));

        let timer = coordinator
            .handle_network_change(true, start)
            .expect("returning online arms the settle timer");
        assert_eq!(coordinator.state(), SyncStatus::Resyncing);
        assert_eq!(coordinator.label(), Some("Syncing…"));
        assert_eq!(timer.due_at(), start + RESYNC_SETTLE);

        assert!(!coordinator.poll(start + Duration::from_millis(1199)));
        assert_eq!(coordinator.state(), SyncStatus::Resyncing);
        assert!(coordinator.poll(start + RESYNC_SETTLE));
        assert_eq!(coordinator.state(), SyncStatus::Idle);
    }

    #[test]
    fn offline_before_settle_makes_stale_timer_a_no_op() {
        let start = Instant::now();
        let mut coordinator = SyncStatusCoordinator::new();
        coordinator.handle_network_change(true, start);
        coordinator.handle_network_change(false, start);
        let timer = coordinator
            .handle_network_change(true, start)
            .expect("timer armed");
        coordinator.handle_network_change(false, start + Duration::from_millis(300));

        assert!(!coordinator.fire(timer));
        assert!(!coordinator.poll(start + Duration::from_secs(5)));
        assert_eq!(coordinator.state(), SyncStatus::Offline);
        assert_eq!(coordinator.next_deadline(), None);
    }

    #[test]
    fn online_while_resyncing_goes_idle_and_cancels_timer() {
        let start = Instant::now();
        let mut coordinator = SyncStatusCoordinator::new();
        coordinator.handle_network_change(false, start);
        let timer = coordinator
            .handle_network_change(true, start)
            .expect("timer armed");

        assert!(coordinator.handle_network_change(true, start).is_none());
        assert_eq!(coordinator.state(), SyncStatus::Idle);
        assert!(!coordinator.fire(timer));
    }

    #[test]
    fn timer_from_an_earlier_arming_cannot_end_a_later_resync() {
        let start = Instant::now();
        let mut coordinator = SyncStatusCoordinator::new();
        coordinator.handle_network_change(false, start);
        let first = coordinator
            .handle_network_change(true, start)
            .expect("first arming");
        coordinator.handle_network_change(false, start);
        let second = coordinator
            .handle_network_change(true, start + Duration::from_secs(1))
            .expect("second arming");

        assert!(!coordinator.fire(first));
        assert_eq!(coordinator.state(), SyncStatus::Resyncing);
        assert!(coordinator.fire(second));
        assert_eq!(coordinator.state(), SyncStatus::Idle);
    }

    #[test]
    fn repeated_offline_is_idempotent() {
        let start = Instant::now();
        let mut coordinator = SyncStatusCoordinator::new();
        coordinator.handle_network_change(false, start);
        coordinator.handle_network_change(false, start);
        assert_eq!(coordinator.state(), SyncStatus::Offline);
        assert_eq!(coordinator.next_deadline(), None);
    }
}
