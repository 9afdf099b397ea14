//! Primitives the GATT core consumes from the BLE host stack.
//!
//! The SoftDevice implementation lives in `ble::server`; host tests use
//! recording mocks.

use crate::ble::schema::{Schema, ServiceDef, MAX_CHARACTERISTICS_PER_SERVICE};
use crate::error::NotifyError;

/// Value handles of one service's characteristics, in declaration order.
pub type ValueHandles = heapless::Vec<u16, MAX_CHARACTERISTICS_PER_SERVICE>;

/// Unsolicited value push to a connected client.
///
/// Must return promptly; it is called from the sampling task.
pub trait Notifier {
    fn notify(&self, conn: u16, handle: u16, value: &[u8]) -> Result<(), NotifyError>;
}

/// Attribute registration with the host stack.
pub trait AttributeRegistrar {
    type Error;

    /// Check that the schema fits the stack's attribute table.
    fn count_attributes(&mut self, schema: &Schema) -> Result<(), Self::Error>;

    /// Add a primary service and its characteristics in declaration order,
    /// characteristic `i` starting out with `initial_values[i]`.
    ///
    /// Returns the value handle of every characteristic, in the same order.
    fn add_service(
        &mut self,
        service: &ServiceDef,
        initial_values: &[&[u8]],
    ) -> Result<ValueHandles, Self::Error>;
}
