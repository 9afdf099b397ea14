//! Notification publisher.
//!
//! Called once per sampling cycle. The sample cell is always updated, so
//! reads see the newest value even with no client; notifications are
//! lossy (latest wins, no queue, no retry).

use crate::ble::access::encode_millivolts;
use crate::ble::context::SensorContext;
use crate::ble::link::Notifier;
use crate::ble::schema::CharacteristicId;
use crate::error::NotifyError;

/// Result of one [`publish`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishOutcome {
    /// No client connected; the sample was stored only.
    Stored,
    /// Stored and notified on the given connection.
    Notified { conn: u16 },
    /// Stored, but the notification was dropped.
    NotifyFailed { conn: u16, error: NotifyError },
}

/// Store `millivolts` as the latest sample and push it to the connected
/// client, if any.
pub fn publish(ctx: &SensorContext, link: &impl Notifier, millivolts: u16) -> PublishOutcome {
    ctx.store_sample(millivolts);

    let Some(conn) = ctx.connection.current() else {
        return PublishOutcome::Stored;
    };

    let result = match ctx.handles.get(CharacteristicId::SensorValue) {
        Some(handle) => link.notify(conn, handle, &encode_millivolts(millivolts)),
        None => Err(NotifyError::InvalidHandle),
    };

    match result {
        Ok(()) => {
            #[cfg(feature = "defmt")]
            defmt::info!("Notified {} mV to BLE client", millivolts);
            PublishOutcome::Notified { conn }
        }
        // Connected but not subscribed is the normal state until the
        // client writes the CCCD.
        Err(error @ NotifyError::NotSubscribed) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("Notify skipped: {}", error);
            PublishOutcome::NotifyFailed { conn, error }
        }
        Err(error) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Notify failed: {}", error);
            PublishOutcome::NotifyFailed { conn, error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::connection::ConnectStatus;
    use core::cell::RefCell;
    use std::vec::Vec;

    const SENSOR_HANDLE: u16 = 0x0010;

    #[derive(Default)]
    struct RecordingLink {
        calls: RefCell<Vec<(u16, u16, Vec<u8>)>>,
        fail_with: Option<NotifyError>,
    }

    impl Notifier for RecordingLink {
        fn notify(&self, conn: u16, handle: u16, value: &[u8]) -> Result<(), NotifyError> {
            self.calls.borrow_mut().push((conn, handle, value.to_vec()));
            match self.fail_with {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    fn registered_context() -> SensorContext {
        let ctx = SensorContext::new();
        ctx.handles
            .assign(CharacteristicId::SensorValue, SENSOR_HANDLE)
            .unwrap();
        ctx
    }

    #[test]
    fn publish_without_connection_only_stores() {
        let ctx = registered_context();
        let link = RecordingLink::default();

        assert_eq!(publish(&ctx, &link, 1800), PublishOutcome::Stored);
        assert_eq!(ctx.sample_mv(), 1800);
        assert!(link.calls.borrow().is_empty());
    }

    #[test]
    fn publish_with_connection_notifies_once() {
        let ctx = registered_context();
        let link = RecordingLink::default();
        ctx.connection.on_connect(7, ConnectStatus::Established);

        assert_eq!(
            publish(&ctx, &link, 300),
            PublishOutcome::Notified { conn: 7 }
        );
        let calls = link.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (7, SENSOR_HANDLE, std::vec![0x01, 0x2C]));
    }

    #[test]
    fn notify_failure_is_reported_and_sample_kept() {
        let ctx = registered_context();
        let link = RecordingLink {
            fail_with: Some(NotifyError::Congested),
            ..Default::default()
        };
        ctx.connection.on_connect(2, ConnectStatus::Established);

        assert_eq!(
            publish(&ctx, &link, 42),
            PublishOutcome::NotifyFailed {
                conn: 2,
                error: NotifyError::Congested
            }
        );
        assert_eq!(ctx.sample_mv(), 42);
        assert_eq!(link.calls.borrow().len(), 1);
    }

    #[test]
    fn unsubscribed_client_is_reported_and_retried_next_cycle() {
        let ctx = registered_context();
        let unsubscribed = RecordingLink {
            fail_with: Some(NotifyError::NotSubscribed),
            ..Default::default()
        };
        let subscribed = RecordingLink::default();
        ctx.connection.on_connect(4, ConnectStatus::Established);

        assert_eq!(
            publish(&ctx, &unsubscribed, 100),
            PublishOutcome::NotifyFailed {
                conn: 4,
                error: NotifyError::NotSubscribed
            }
        );
        assert_eq!(ctx.sample_mv(), 100);
        assert_eq!(
            publish(&ctx, &subscribed, 101),
            PublishOutcome::Notified { conn: 4 }
        );
    }

    #[test]
    fn next_publish_after_failure_tries_again_with_new_sample() {
        let ctx = registered_context();
        let failing = RecordingLink {
            fail_with: Some(NotifyError::Congested),
            ..Default::default()
        };
        let healthy = RecordingLink::default();
        ctx.connection.on_connect(2, ConnectStatus::Established);

        publish(&ctx, &failing, 10);
        publish(&ctx, &healthy, 11);

        let calls = healthy.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].2, std::vec![0x00, 0x0B]);
    }

    #[test]
    fn connected_publish_before_registration_is_invalid_handle() {
        let ctx = SensorContext::new();
        let link = RecordingLink::default();
        ctx.connection.on_connect(1, ConnectStatus::Established);

        assert_eq!(
            publish(&ctx, &link, 5),
            PublishOutcome::NotifyFailed {
                conn: 1,
                error: NotifyError::InvalidHandle
            }
        );
        assert!(link.calls.borrow().is_empty());
        assert_eq!(ctx.sample_mv(), 5);
    }

    #[test]
    fn publish_after_disconnect_does_not_notify() {
        let ctx = registered_context();
        let link = RecordingLink::default();
        ctx.connection.on_connect(7, ConnectStatus::Established);
        ctx.connection.on_disconnect();

        assert_eq!(publish(&ctx, &link, 1), PublishOutcome::Stored);
        assert!(link.calls.borrow().is_empty());
    }
}
