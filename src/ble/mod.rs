//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Schema / Registration** - the static GATT table (sensor service
//!    plus Device Information) and its registration at startup.
//! 2. **Access** - encodes characteristic values for read requests.
//! 3. **Publisher** - stores each new sample and notifies the connected
//!    client.
//! 4. **Peripheral** - advertising and the connection lifecycle.
//!
//! The pure modules come from the library crate; the SoftDevice
//! specifics are confined to `server` and `peripheral`.

pub use adc_ble_sensor::ble::{
    access, adv_payload, connection, context, link, publisher, registration, schema, uuid,
};

pub mod peripheral;
pub mod server;
