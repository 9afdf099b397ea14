//! SoftDevice side of the GATT server.
//!
//! - [`SoftdeviceRegistrar`] turns the static table into SoftDevice
//!   services via `ServiceBuilder`.
//! - [`SoftdeviceLink`] pushes sensor values to the connected client.
//! - [`GattServer`] answers reads through the access dispatcher (every
//!   readable value is registered as deferred-read) and logs CCCD writes.

use core::cell::RefCell;

use crate::ble::access::{self, ValueBuf};
use crate::ble::connection::CONN_HANDLE_NONE;
use crate::ble::context::SensorContext;
use crate::ble::link::{AttributeRegistrar, Notifier, ValueHandles};
use crate::ble::schema::{Schema, ServiceDef, MAX_CHARACTERISTICS_PER_SERVICE};
use crate::ble::uuid::Uuid;
use crate::config;
use crate::error::{AccessError, BleError, NotifyError};
use defmt::{debug, info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{
    self, DeferredReadReply, NotifyValueError, RegisterError, WriteOp,
};
use nrf_softdevice::ble::{Connection, GattError, Uuid as SdUuid};
use nrf_softdevice::{RawError, Softdevice};

fn to_gatt_error(e: AccessError) -> GattError {
    GattError::from(u32::from(e.gatt_status()))
}

fn to_sd_uuid(uuid: &Uuid) -> SdUuid {
    match uuid {
        Uuid::Uuid16(short) => SdUuid::new_16(*short),
        Uuid::Uuid128(bytes) => SdUuid::new_128(bytes),
    }
}

fn ble_error(e: RegisterError) -> BleError {
    match e {
        RegisterError::Raw(raw) => BleError::Raw(raw as u32),
    }
}

fn notify_error(e: NotifyValueError) -> NotifyError {
    match e {
        NotifyValueError::Disconnected => NotifyError::Disconnected,
        NotifyValueError::Raw(RawError::Resources | RawError::Busy) => NotifyError::Congested,
        NotifyValueError::Raw(RawError::BleInvalidAttrHandle) => NotifyError::InvalidHandle,
        // CCCD off, or never written on this link.
        NotifyValueError::Raw(RawError::InvalidState | RawError::BleGattsSysAttrMissing) => {
            NotifyError::NotSubscribed
        }
        NotifyValueError::Raw(raw) => NotifyError::Raw(raw as u32),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════════════════════

/// Registers services with the SoftDevice. Only valid before the
/// SoftDevice task starts running.
pub struct SoftdeviceRegistrar<'a> {
    sd: &'a mut Softdevice,
}

impl<'a> SoftdeviceRegistrar<'a> {
    pub fn new(sd: &'a mut Softdevice) -> Self {
        Self { sd }
    }
}

impl AttributeRegistrar for SoftdeviceRegistrar<'_> {
    type Error = BleError;

    fn count_attributes(&mut self, schema: &Schema) -> Result<(), BleError> {
        let count = schema.attribute_count();
        if count > config::BLE_MAX_ATTRIBUTES {
            return Err(BleError::TooManyAttributes {
                count,
                limit: config::BLE_MAX_ATTRIBUTES,
            });
        }
        debug!("GATT table needs {} attributes", count);
        Ok(())
    }

    fn add_service(
        &mut self,
        service: &ServiceDef,
        initial_values: &[&[u8]],
    ) -> Result<ValueHandles, BleError> {
        let width = service.characteristics.len();
        if width > MAX_CHARACTERISTICS_PER_SERVICE || initial_values.len() != width {
            return Err(BleError::TooManyAttributes {
                count: width.max(initial_values.len()),
                limit: MAX_CHARACTERISTICS_PER_SERVICE,
            });
        }

        let mut builder =
            ServiceBuilder::new(self.sd, to_sd_uuid(&service.uuid)).map_err(ble_error)?;
        let mut handles = ValueHandles::new();

        for (characteristic, value) in service.characteristics.iter().zip(initial_values) {
            if value.len() > usize::from(characteristic.max_len) {
                return Err(BleError::ValueTooLong);
            }

            let mut properties = Properties::new();
            if characteristic.capabilities.can_read() {
                properties = properties.read();
            }
            if characteristic.capabilities.can_notify() {
                properties = properties.notify();
            }

            let mut attr = Attribute::new(*value).variable_len(characteristic.max_len);
            if characteristic.capabilities.can_read() {
                attr = attr.deferred_read();
            }
            let created = builder
                .add_characteristic(to_sd_uuid(&characteristic.uuid), attr, Metadata::new(properties))
                .map_err(ble_error)?
                .build();

            debug!(
                "characteristic {} value_handle={} cccd_handle={}",
                characteristic.uuid, created.value_handle, created.cccd_handle
            );
            handles
                .push(created.value_handle)
                .map_err(|_| BleError::TooManyAttributes {
                    count: width,
                    limit: MAX_CHARACTERISTICS_PER_SERVICE,
                })?;
        }

        let _ = builder.build();
        Ok(handles)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Notification link
// ═══════════════════════════════════════════════════════════════════════════

/// Holds the active connection so the sampling task can notify on it.
pub struct SoftdeviceLink {
    conn: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>>,
}

impl SoftdeviceLink {
    pub const fn new() -> Self {
        Self {
            conn: Mutex::new(RefCell::new(None)),
        }
    }

    pub fn attach(&self, conn: &Connection) {
        self.conn.lock(|c| *c.borrow_mut() = Some(conn.clone()));
    }

    pub fn detach(&self) {
        self.conn.lock(|c| *c.borrow_mut() = None);
    }
}

impl Default for SoftdeviceLink {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for SoftdeviceLink {
    fn notify(&self, conn: u16, handle: u16, value: &[u8]) -> Result<(), NotifyError> {
        self.conn.lock(|c| {
            let c = c.borrow();
            match c.as_ref() {
                Some(active) if active.handle() == Some(conn) => {
                    gatt_server::notify_value(active, handle, value).map_err(notify_error)
                }
                _ => Err(NotifyError::Disconnected),
            }
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Event sink
// ═══════════════════════════════════════════════════════════════════════════

/// GATT event handler for the sensor table.
pub struct GattServer {
    ctx: &'static SensorContext,
}

impl GattServer {
    pub fn new(ctx: &'static SensorContext) -> Self {
        Self { ctx }
    }
}

impl gatt_server::Server for GattServer {
    type Event = ();

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        _op: WriteOp,
        _offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        // The CCCD directly follows the value attribute.
        let id = self.ctx.handles.id_for(handle.checked_sub(1)?)?;
        if let Some(flags) = data.first() {
            info!("{} notifications: {}", id, (flags & 0x01) != 0);
        }
        None
    }

    fn on_deferred_read(
        &self,
        handle: u16,
        offset: usize,
        reply: DeferredReadReply,
    ) -> Option<Self::Event> {
        let conn = self.ctx.connection.current().unwrap_or(CONN_HANDLE_NONE);
        let mut value = ValueBuf::new();
        let result = match access::read_handle(conn, handle, self.ctx, &mut value) {
            Ok(_) => match value.get(offset..) {
                Some(rest) => Ok(Some(rest)),
                None => Err(GattError::AtterrInvalidOffset),
            },
            Err(e) => {
                warn!("GATT read of handle {} failed: {}", handle, e);
                Err(to_gatt_error(e))
            }
        };
        if let Err(e) = reply.reply(result) {
            warn!("GATT read reply failed: {:?}", e);
        }
        None
    }
}
