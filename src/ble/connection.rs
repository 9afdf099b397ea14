//! Single-connection state tracker.
//!
//! ```text
//!   NONE ──connect(h, ok)──▶ CONNECTED(h)
//!    ▲  ◀──connect(_, err)──┘     │
//!    └──────── disconnect ────────┘
//! ```
//!
//! The state is one atomic word holding either a connection handle or the
//! `CONN_HANDLE_NONE` sentinel, so the link-layer event context and the
//! sampling task can both touch it without a lock.

use core::sync::atomic::{AtomicU16, Ordering};

/// Sentinel meaning "no connection" (`BLE_CONN_HANDLE_INVALID`).
pub const CONN_HANDLE_NONE: u16 = 0xFFFF;

/// Status the link layer reports with a connection event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectStatus {
    Established,
    /// Connection attempt failed with a stack-specific code.
    Failed(u32),
}

/// What the caller should do after a connect event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectOutcome {
    /// Now tracking the new handle.
    Connected,
    /// A second connection replaced a live one. The stack is configured
    /// for a single peripheral link, so this indicates misconfiguration.
    Replaced { previous: u16 },
    /// The attempt failed; state is NONE and advertising must restart.
    AdvertiseAgain,
}

/// Holds at most one active connection handle.
pub struct ConnectionTracker {
    handle: AtomicU16,
}

impl ConnectionTracker {
    pub const fn new() -> Self {
        Self {
            handle: AtomicU16::new(CONN_HANDLE_NONE),
        }
    }

    /// Apply a connect event from the link layer.
    pub fn on_connect(&self, handle: u16, status: ConnectStatus) -> ConnectOutcome {
        match status {
            ConnectStatus::Failed(_) => ConnectOutcome::AdvertiseAgain,
            ConnectStatus::Established => {
                match self.handle.swap(handle, Ordering::AcqRel) {
                    CONN_HANDLE_NONE => ConnectOutcome::Connected,
                    previous if previous == handle => ConnectOutcome::Connected,
                    previous => ConnectOutcome::Replaced { previous },
                }
            }
        }
    }

    /// Apply an established connect event, running `attach` before the
    /// handle becomes visible to [`current`](Self::current). Whatever
    /// `attach` sets up is ready by the time a publisher sees the link.
    pub fn establish(&self, handle: u16, attach: impl FnOnce()) -> ConnectOutcome {
        attach();
        self.on_connect(handle, ConnectStatus::Established)
    }

    /// Apply a disconnect event, then run `detach`. The handle is gone
    /// from [`current`](Self::current) before `detach` tears anything down.
    pub fn release(&self, detach: impl FnOnce()) -> Option<u16> {
        let previous = self.on_disconnect();
        detach();
        previous
    }

    /// Apply a disconnect event. Returns the handle that was tracked.
    pub fn on_disconnect(&self) -> Option<u16> {
        match self.handle.swap(CONN_HANDLE_NONE, Ordering::AcqRel) {
            CONN_HANDLE_NONE => None,
            previous => Some(previous),
        }
    }

    pub fn current(&self) -> Option<u16> {
        match self.handle.load(Ordering::Acquire) {
            CONN_HANDLE_NONE => None,
            handle => Some(handle),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.current().is_some()
    }

    /// `true` while no client is connected, i.e. the device should be
    /// discoverable.
    pub fn needs_advertising(&self) -> bool {
        !self.is_connected()
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.current(), None);
        assert!(tracker.needs_advertising());
    }

    #[test]
    fn connect_then_disconnect() {
        let tracker = ConnectionTracker::new();
        assert_eq!(
            tracker.on_connect(7, ConnectStatus::Established),
            ConnectOutcome::Connected
        );
        assert_eq!(tracker.current(), Some(7));
        assert!(!tracker.needs_advertising());

        assert_eq!(tracker.on_disconnect(), Some(7));
        assert_eq!(tracker.current(), None);
        assert!(tracker.needs_advertising());
    }

    #[test]
    fn failed_connect_stays_disconnected() {
        let tracker = ConnectionTracker::new();
        assert_eq!(
            tracker.on_connect(3, ConnectStatus::Failed(0x3E)),
            ConnectOutcome::AdvertiseAgain
        );
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn failed_connect_does_not_drop_live_link() {
        let tracker = ConnectionTracker::new();
        tracker.on_connect(1, ConnectStatus::Established);
        tracker.on_connect(2, ConnectStatus::Failed(1));
        assert_eq!(tracker.current(), Some(1));
    }

    #[test]
    fn second_connection_is_flagged() {
        let tracker = ConnectionTracker::new();
        tracker.on_connect(1, ConnectStatus::Established);
        assert_eq!(
            tracker.on_connect(2, ConnectStatus::Established),
            ConnectOutcome::Replaced { previous: 1 }
        );
        assert_eq!(tracker.current(), Some(2));
    }

    #[test]
    fn disconnect_without_connection_is_harmless() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.on_disconnect(), None);
        assert!(tracker.needs_advertising());
    }

    #[test]
    fn establish_attaches_before_the_handle_is_visible() {
        let tracker = ConnectionTracker::new();
        let mut seen = Some(0);
        let outcome = tracker.establish(7, || seen = tracker.current());
        assert_eq!(seen, None);
        assert_eq!(outcome, ConnectOutcome::Connected);
        assert_eq!(tracker.current(), Some(7));
    }

    #[test]
    fn release_clears_the_handle_before_detaching() {
        let tracker = ConnectionTracker::new();
        tracker.establish(7, || {});
        let mut seen = Some(0);
        assert_eq!(tracker.release(|| seen = tracker.current()), Some(7));
        assert_eq!(seen, None);
        assert!(tracker.needs_advertising());
    }
}
