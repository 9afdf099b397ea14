//! Unified error types for the sensor firmware.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! With the `defmt` feature every type implements `defmt::Format` for
//! efficient on-target logging.

use crate::ble::schema::CharacteristicId;

/// ATT error code "Invalid Handle".
pub const ATT_ERR_INVALID_HANDLE: u8 = 0x01;

/// ATT error code "Insufficient Resources".
pub const ATT_ERR_INSUFFICIENT_RESOURCES: u8 = 0x11;

/// GATT status codes for ATT errors are the ATT code offset by this base
/// (`BLE_GATT_STATUS_ATTERR_*`).
const GATT_STATUS_ATTERR_BASE: u16 = 0x0100;

/// Failure while answering a read request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessError {
    /// The outgoing buffer cannot hold the encoded value.
    InsufficientResources,
    /// The handle does not belong to any registered characteristic.
    InvalidHandle,
}

impl AccessError {
    /// ATT protocol error code the link layer should answer with.
    pub const fn att_code(self) -> u8 {
        match self {
            AccessError::InsufficientResources => ATT_ERR_INSUFFICIENT_RESOURCES,
            AccessError::InvalidHandle => ATT_ERR_INVALID_HANDLE,
        }
    }

    /// The same error as a stack GATT status code.
    pub const fn gatt_status(self) -> u16 {
        GATT_STATUS_ATTERR_BASE | self.att_code() as u16
    }
}

/// Failure reported by the link-layer notify primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifyError {
    /// The connection handle no longer refers to a live link.
    Disconnected,
    /// The characteristic handle is unassigned or unknown to the stack.
    InvalidHandle,
    /// The stack has no free notification buffers right now.
    Congested,
    /// The client has not enabled notifications in its CCCD.
    NotSubscribed,
    /// Raw error code from the underlying stack.
    Raw(u32),
}

/// Misuse of a set-once handle slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandleError {
    /// The slot already holds a handle.
    AlreadyAssigned { current: u16 },
    /// Handle 0 is reserved by ATT and never addresses an attribute.
    Invalid,
}

/// Failure while registering the attribute table with the host stack.
///
/// `E` is the stack-specific error returned by the registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError<E> {
    /// The stack rejected the attribute footprint.
    Count(E),
    /// A service declares more characteristics than one registration
    /// call can carry.
    ServiceTooWide { characteristics: usize, limit: usize },
    /// Adding a service or characteristic failed.
    Add(E),
    /// The initial value of a characteristic could not be encoded.
    InitialValue(CharacteristicId, AccessError),
    /// The stack resolved a handle that cannot be recorded.
    Handle(CharacteristicId, HandleError),
}

/// Subset of SoftDevice errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// GAP / GATT raw error code from the SoftDevice.
    Raw(u32),
    /// The schema needs more attributes than the stack is configured for.
    TooManyAttributes { count: usize, limit: usize },
    /// A characteristic value exceeds its declared maximum length.
    ValueTooLong,
}

/// Top-level error type used by the firmware startup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// GATT table registration failed (fatal at startup).
    Registration(RegisterError<BleError>),
    /// A read request could not be answered.
    Access(AccessError),
    /// A notification could not be delivered.
    Notify(NotifyError),
}

// Convenience conversions

impl From<RegisterError<BleError>> for Error {
    fn from(e: RegisterError<BleError>) -> Self {
        Error::Registration(e)
    }
}

impl From<AccessError> for Error {
    fn from(e: AccessError) -> Self {
        Error::Access(e)
    }
}

impl From<NotifyError> for Error {
    fn from(e: NotifyError) -> Self {
        Error::Notify(e)
    }
}
