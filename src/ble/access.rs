//! Read access dispatcher.
//!
//! Turns a read of one of the table's characteristics into the bytes the
//! client receives:
//!
//! | Characteristic     | Encoding                                  |
//! |--------------------|-------------------------------------------|
//! | Sensor value       | 2 bytes, big-endian `u16`, millivolts     |
//! | Manufacturer name  | UTF-8 bytes, no length prefix/terminator  |
//! | Model number       | UTF-8 bytes, no length prefix/terminator  |

use crate::ble::context::SensorContext;
use crate::ble::schema::{CharacteristicId, SCHEMA};
use crate::ble::uuid::Uuid;
use crate::config;
use crate::error::AccessError;

/// Encoded size of the sensor value.
pub const SENSOR_VALUE_LEN: usize = 2;

/// Largest value any characteristic of the table encodes to.
pub const MAX_VALUE_LEN: usize = 32;

/// Buffer that holds any encoded characteristic value.
pub type ValueBuf = heapless::Vec<u8, MAX_VALUE_LEN>;

/// The sink is out of space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkFull;

/// Outgoing attribute value buffer.
pub trait AttrSink {
    /// Append all of `bytes` or nothing.
    fn append(&mut self, bytes: &[u8]) -> Result<(), SinkFull>;
}

impl<const N: usize> AttrSink for heapless::Vec<u8, N> {
    fn append(&mut self, bytes: &[u8]) -> Result<(), SinkFull> {
        self.extend_from_slice(bytes).map_err(|_| SinkFull)
    }
}

/// Sink over a caller-provided byte slice.
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl AttrSink for SliceSink<'_> {
    fn append(&mut self, bytes: &[u8]) -> Result<(), SinkFull> {
        let end = self.len + bytes.len();
        if end > self.buf.len() {
            return Err(SinkFull);
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}

/// Wire encoding of a millivolt sample.
pub const fn encode_millivolts(millivolts: u16) -> [u8; SENSOR_VALUE_LEN] {
    millivolts.to_be_bytes()
}

/// Inverse of [`encode_millivolts`]; `None` unless exactly 2 bytes.
pub fn decode_millivolts(data: &[u8]) -> Option<u16> {
    match data {
        [hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

/// Write the current value of `id` into `sink`.
///
/// `conn` identifies the requesting link and is only used for logging.
/// Returns the number of bytes written.
pub fn read(
    conn: u16,
    id: CharacteristicId,
    ctx: &SensorContext,
    sink: &mut impl AttrSink,
) -> Result<usize, AccessError> {
    let _ = conn;
    let written = match id {
        CharacteristicId::SensorValue => {
            let mv = ctx.sample_mv();
            #[cfg(feature = "defmt")]
            defmt::info!("GATT read on conn {}: {} mV", conn, mv);
            append(sink, &encode_millivolts(mv))?
        }
        CharacteristicId::ManufacturerName => append(sink, config::MANUFACTURER_NAME.as_bytes())?,
        CharacteristicId::ModelNumber => append(sink, config::MODEL_NUMBER.as_bytes())?,
    };
    Ok(written)
}

/// UUID-keyed entry point for link layers that address characteristics by
/// UUID.
///
/// # Panics
///
/// If `uuid` is not a characteristic of [`SCHEMA`]. The stack only routes
/// reads for attributes it was given at registration, so an unknown UUID
/// means the table and the dispatcher have diverged.
pub fn read_uuid(
    conn: u16,
    uuid: &Uuid,
    ctx: &SensorContext,
    sink: &mut impl AttrSink,
) -> Result<usize, AccessError> {
    match SCHEMA.find(uuid) {
        Some(id) => read(conn, id, ctx, sink),
        None => panic!("read of characteristic {:?} outside the GATT table", uuid),
    }
}

/// Handle-keyed entry point for stacks that forward reads of registered
/// value handles (deferred reads).
///
/// A handle outside the table is answered with
/// [`AccessError::InvalidHandle`].
pub fn read_handle(
    conn: u16,
    handle: u16,
    ctx: &SensorContext,
    sink: &mut impl AttrSink,
) -> Result<usize, AccessError> {
    let id = ctx.handles.id_for(handle).ok_or(AccessError::InvalidHandle)?;
    read(conn, id, ctx, sink)
}

fn append(sink: &mut impl AttrSink, bytes: &[u8]) -> Result<usize, AccessError> {
    sink.append(bytes)
        .map(|()| bytes.len())
        .map_err(|SinkFull| AccessError::InsufficientResources)
}
