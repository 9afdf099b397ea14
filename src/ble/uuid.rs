//! Bluetooth UUIDs as used in the attribute table.

/// Bluetooth Base UUID `00000000-0000-1000-8000-00805F9B34FB`, little-endian.
const BASE_UUID_LE: [u8; 16] = [
    0xFB, 0x34, 0x9B, 0x5F, 0x80, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// A 16-bit SIG-assigned or a 128-bit custom UUID.
///
/// 128-bit values are stored little-endian, the byte order used on air
/// and by the SoftDevice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Uuid {
    Uuid16(u16),
    Uuid128([u8; 16]),
}

impl Uuid {
    pub const fn new_16(uuid: u16) -> Self {
        Uuid::Uuid16(uuid)
    }

    pub const fn new_128(uuid_le: [u8; 16]) -> Self {
        Uuid::Uuid128(uuid_le)
    }

    /// The 16-bit short form, if this UUID has one.
    ///
    /// A 128-bit UUID built on the Bluetooth Base UUID is reduced to its
    /// 16-bit alias, so both spellings of the same UUID compare equal here.
    pub fn as_u16(&self) -> Option<u16> {
        match *self {
            Uuid::Uuid16(u) => Some(u),
            Uuid::Uuid128(b) => {
                let on_base = b[..12] == BASE_UUID_LE[..12] && b[14..] == BASE_UUID_LE[14..];
                on_base.then(|| u16::from_le_bytes([b[12], b[13]]))
            }
        }
    }

    /// Full 128-bit little-endian form.
    pub fn to_128(&self) -> [u8; 16] {
        match *self {
            Uuid::Uuid16(u) => {
                let mut b = BASE_UUID_LE;
                b[12..14].copy_from_slice(&u.to_le_bytes());
                b
            }
            Uuid::Uuid128(b) => b,
        }
    }

    /// `true` if both UUIDs denote the same attribute type.
    pub fn matches(&self, other: &Uuid) -> bool {
        self.to_128() == other.to_128()
    }
}
