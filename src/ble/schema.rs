//! Static GATT attribute table.
//!
//! Layout:
//! ```text
//! Sensor service (0xFFF0)
//!   └─ Sensor value (0xFFF1)          read, notify   u16 big-endian mV
//! Device Information (0x180A)
//!   ├─ Manufacturer Name (0x2A29)     read           UTF-8
//!   └─ Model Number (0x2A24)          read           UTF-8
//! ```
//!
//! The table is `const` data. The only runtime part is the [`HandleTable`],
//! filled once by registration.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::ble::uuid::Uuid;
use crate::config;
use crate::error::HandleError;

/// ATT handle 0 is reserved; an unassigned slot holds it.
const UNASSIGNED: u16 = 0;

/// Largest number of characteristics a single service may declare.
pub const MAX_CHARACTERISTICS_PER_SERVICE: usize = 4;

/// Operations a characteristic supports. Never empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    read: bool,
    notify: bool,
}

impl Capabilities {
    pub const READ: Self = Self {
        read: true,
        notify: false,
    };
    pub const READ_NOTIFY: Self = Self {
        read: true,
        notify: true,
    };

    pub const fn can_read(self) -> bool {
        self.read
    }

    pub const fn can_notify(self) -> bool {
        self.notify
    }
}

/// Closed set of characteristics this firmware serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CharacteristicId {
    /// Latest ADC reading in millivolts.
    SensorValue = 0,
    /// Device Information: manufacturer name string.
    ManufacturerName = 1,
    /// Device Information: model number string.
    ModelNumber = 2,
}

impl CharacteristicId {
    pub const COUNT: usize = 3;

    pub const ALL: [CharacteristicId; Self::COUNT] = [
        CharacteristicId::SensorValue,
        CharacteristicId::ManufacturerName,
        CharacteristicId::ModelNumber,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// One characteristic declaration.
#[derive(Clone, Copy, Debug)]
pub struct CharacteristicDef {
    pub id: CharacteristicId,
    pub uuid: Uuid,
    pub capabilities: Capabilities,
    /// Largest value the characteristic can hold (bytes).
    pub max_len: u16,
}

/// A primary service and its characteristics.
#[derive(Clone, Copy, Debug)]
pub struct ServiceDef {
    pub uuid: Uuid,
    pub characteristics: &'static [CharacteristicDef],
}

/// The complete attribute table.
#[derive(Clone, Copy, Debug)]
pub struct Schema {
    pub services: &'static [ServiceDef],
}

impl Schema {
    /// Number of ATT attributes the table occupies once registered.
    ///
    /// Each service takes its declaration, each characteristic a
    /// declaration and a value, and each notifiable characteristic one
    /// more for its CCCD.
    pub const fn attribute_count(&self) -> usize {
        let mut count = 0;
        let mut s = 0;
        while s < self.services.len() {
            let chars = self.services[s].characteristics;
            count += 1;
            let mut c = 0;
            while c < chars.len() {
                count += 2;
                if chars[c].capabilities.can_notify() {
                    count += 1;
                }
                c += 1;
            }
            s += 1;
        }
        count
    }

    /// `true` if every [`CharacteristicId`] is declared exactly once.
    pub const fn is_complete(&self) -> bool {
        let mut seen = [0u8; CharacteristicId::COUNT];
        let mut s = 0;
        while s < self.services.len() {
            let chars = self.services[s].characteristics;
            let mut c = 0;
            while c < chars.len() {
                seen[chars[c].id.index()] += 1;
                c += 1;
            }
            s += 1;
        }
        let mut i = 0;
        while i < CharacteristicId::COUNT {
            if seen[i] != 1 {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Characteristic count of the largest service.
    pub const fn widest_service(&self) -> usize {
        let mut widest = 0;
        let mut s = 0;
        while s < self.services.len() {
            let n = self.services[s].characteristics.len();
            if n > widest {
                widest = n;
            }
            s += 1;
        }
        widest
    }

    pub fn characteristics(&self) -> impl Iterator<Item = &'static CharacteristicDef> {
        self.services.iter().flat_map(|s| s.characteristics.iter())
    }

    /// Resolve a characteristic UUID to its identity.
    pub fn find(&self, uuid: &Uuid) -> Option<CharacteristicId> {
        self.characteristics()
            .find(|c| c.uuid.matches(uuid))
            .map(|c| c.id)
    }

    pub fn characteristic(&self, id: CharacteristicId) -> Option<&'static CharacteristicDef> {
        self.characteristics().find(|c| c.id == id)
    }
}

const SENSOR_CHARACTERISTICS: [CharacteristicDef; 1] = [CharacteristicDef {
    id: CharacteristicId::SensorValue,
    uuid: Uuid::new_16(config::SENSOR_VALUE_CHAR_UUID),
    capabilities: Capabilities::READ_NOTIFY,
    max_len: 2,
}];

const DEVICE_INFO_CHARACTERISTICS: [CharacteristicDef; 2] = [
    CharacteristicDef {
        id: CharacteristicId::ManufacturerName,
        uuid: Uuid::new_16(config::MANUFACTURER_NAME_CHAR_UUID),
        capabilities: Capabilities::READ,
        max_len: config::MANUFACTURER_NAME.len() as u16,
    },
    CharacteristicDef {
        id: CharacteristicId::ModelNumber,
        uuid: Uuid::new_16(config::MODEL_NUMBER_CHAR_UUID),
        capabilities: Capabilities::READ,
        max_len: config::MODEL_NUMBER.len() as u16,
    },
];

const SERVICES: [ServiceDef; 2] = [
    ServiceDef {
        uuid: Uuid::new_16(config::SENSOR_SERVICE_UUID),
        characteristics: &SENSOR_CHARACTERISTICS,
    },
    ServiceDef {
        uuid: Uuid::new_16(config::DEVICE_INFO_SERVICE_UUID),
        characteristics: &DEVICE_INFO_CHARACTERISTICS,
    },
];

/// The firmware's GATT table.
pub const SCHEMA: Schema = Schema {
    services: &SERVICES,
};

// The dispatcher matches exhaustively over `CharacteristicId`; the table
// must declare each of them exactly once.
const _: () = assert!(SCHEMA.is_complete());
const _: () = assert!(SCHEMA.widest_service() <= MAX_CHARACTERISTICS_PER_SERVICE);

/// Value handles resolved at registration, one set-once slot per
/// characteristic.
pub struct HandleTable {
    slots: [AtomicU16; CharacteristicId::COUNT],
}

impl HandleTable {
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicU16::new(UNASSIGNED) }; CharacteristicId::COUNT],
        }
    }

    /// Record the value handle of `id`. Fails if the slot is already set.
    pub fn assign(&self, id: CharacteristicId, handle: u16) -> Result<(), HandleError> {
        if handle == UNASSIGNED {
            return Err(HandleError::Invalid);
        }
        self.slots[id.index()]
            .compare_exchange(UNASSIGNED, handle, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|current| HandleError::AlreadyAssigned { current })
    }

    pub fn get(&self, id: CharacteristicId) -> Option<u16> {
        match self.slots[id.index()].load(Ordering::Acquire) {
            UNASSIGNED => None,
            handle => Some(handle),
        }
    }

    /// Reverse lookup used by stack events that only carry a handle.
    pub fn id_for(&self, handle: u16) -> Option<CharacteristicId> {
        CharacteristicId::ALL
            .into_iter()
            .find(|&id| self.get(id) == Some(handle))
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}
