//! Host-testable library interface for adc-ble-sensor.
//!
//! This module exposes the pure logic modules (GATT table, read dispatch,
//! connection tracking, publishing, advertising payloads, ADC averaging)
//! so they can be tested on the host with no embedded hardware.
//!
//! Usage: `cargo test --lib` or `cargo test`
//!
//! Note: The embedded binary (main.rs, #![no_std] and #![no_main]) links
//! against this library and adds the SoftDevice and SAADC glue on top.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;

pub mod ble {
    pub mod access;
    pub mod adv_payload;
    pub mod connection;
    pub mod context;
    pub mod link;
    pub mod publisher;
    pub mod registration;
    pub mod schema;
    pub mod uuid;
}

pub mod sensor {
    pub mod averaging;
}

pub use ble::context::SensorContext;
pub use ble::publisher::{publish, PublishOutcome};
pub use ble::schema::{CharacteristicId, SCHEMA};
pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - cross-module behaviour
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::ble::access::{self, decode_millivolts, SliceSink};
    use super::ble::connection::ConnectStatus;
    use super::ble::link::Notifier;
    use super::error::{AccessError, NotifyError};
    use super::sensor::averaging::{raw_to_millivolts, Window};
    use super::*;
    use core::cell::Cell;

    struct CountingLink {
        sent: Cell<usize>,
    }

    impl Notifier for CountingLink {
        fn notify(&self, _conn: u16, _handle: u16, _value: &[u8]) -> Result<(), NotifyError> {
            self.sent.set(self.sent.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn averaged_window_reads_back_in_millivolts() {
        let ctx = SensorContext::new();
        let link = CountingLink { sent: Cell::new(0) };

        let mut window = Window::new();
        for _ in 0..100 {
            window.push(2048);
        }
        let mv = raw_to_millivolts(window.mean().unwrap(), 12, 3600);
        publish(&ctx, &link, mv);

        let mut buf = [0u8; 2];
        let mut sink = SliceSink::new(&mut buf);
        access::read(0, CharacteristicId::SensorValue, &ctx, &mut sink).unwrap();
        assert_eq!(decode_millivolts(sink.written()), Some(1800));
        assert_eq!(link.sent.get(), 0);
    }

    #[test]
    fn every_characteristic_is_readable_in_full() {
        let ctx = SensorContext::new();
        for def in SCHEMA.characteristics() {
            let mut buf = [0u8; 32];
            let mut sink = SliceSink::new(&mut buf);
            let n = access::read(0, def.id, &ctx, &mut sink).unwrap();
            assert!(n <= usize::from(def.max_len));
        }
    }

    #[test]
    fn short_buffer_is_insufficient_resources() {
        let ctx = SensorContext::new();
        let mut buf = [0u8; 4];
        let mut sink = SliceSink::new(&mut buf);
        let err = access::read(0, CharacteristicId::ModelNumber, &ctx, &mut sink).unwrap_err();
        assert_eq!(err, AccessError::InsufficientResources);
        assert_eq!(Error::from(err), Error::Access(AccessError::InsufficientResources));
    }

    #[test]
    fn connected_publish_notifies_through_the_link() {
        let ctx = SensorContext::new();
        ctx.handles
            .assign(CharacteristicId::SensorValue, 3)
            .unwrap();
        ctx.connection.on_connect(0, ConnectStatus::Established);
        let link = CountingLink { sent: Cell::new(0) };

        assert_eq!(publish(&ctx, &link, 12), PublishOutcome::Notified { conn: 0 });
        assert_eq!(link.sent.get(), 1);
    }
}
