//! Startup registration of the attribute table.
//!
//! 1. Let the stack validate the table's attribute footprint.
//! 2. Add every service and characteristic in table order, recording
//!    each resolved value handle.
//!
//! Any failure aborts registration immediately; there is no partial
//! recovery and the caller treats the error as fatal.

use crate::ble::access::{self, ValueBuf};
use crate::ble::context::SensorContext;
use crate::ble::link::AttributeRegistrar;
use crate::ble::schema::{Schema, ServiceDef, MAX_CHARACTERISTICS_PER_SERVICE};
use crate::error::RegisterError;

/// Register `schema` with `registrar` and fill `ctx.handles`.
///
/// Characteristics start out with the value a read would return at this
/// point.
pub fn register<R: AttributeRegistrar>(
    schema: &Schema,
    registrar: &mut R,
    ctx: &SensorContext,
) -> Result<(), RegisterError<R::Error>> {
    registrar
        .count_attributes(schema)
        .map_err(RegisterError::Count)?;

    for service in schema.services {
        let mut values: heapless::Vec<ValueBuf, MAX_CHARACTERISTICS_PER_SERVICE> =
            heapless::Vec::new();
        for characteristic in service.characteristics {
            let mut value = ValueBuf::new();
            access::read(0, characteristic.id, ctx, &mut value)
                .map_err(|e| RegisterError::InitialValue(characteristic.id, e))?;
            values.push(value).map_err(|_| too_wide(service))?;
        }
        let slices: heapless::Vec<&[u8], MAX_CHARACTERISTICS_PER_SERVICE> =
            values.iter().map(|v| v.as_slice()).collect();

        let handles = registrar
            .add_service(service, &slices)
            .map_err(RegisterError::Add)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("registered service {}", service.uuid);

        for (i, characteristic) in service.characteristics.iter().enumerate() {
            // A stack that skipped a characteristic leaves the reserved handle.
            let value_handle = handles.get(i).copied().unwrap_or(0);
            ctx.handles
                .assign(characteristic.id, value_handle)
                .map_err(|e| RegisterError::Handle(characteristic.id, e))?;

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "registered characteristic {} with val_handle={}",
                characteristic.uuid,
                value_handle
            );
        }
    }

    Ok(())
}

fn too_wide<E>(service: &ServiceDef) -> RegisterError<E> {
    RegisterError::ServiceTooWide {
        characteristics: service.characteristics.len(),
        limit: MAX_CHARACTERISTICS_PER_SERVICE,
    }
}
