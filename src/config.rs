//! Application-wide constants and compile-time configuration.
//!
//! UUIDs, identity strings, advertising parameters and the sampling
//! cadence live here so they can be tuned in one place.

// GATT

/// Custom sensor service.
pub const SENSOR_SERVICE_UUID: u16 = 0xFFF0;

/// Sensor value characteristic (big-endian u16, millivolts).
pub const SENSOR_VALUE_CHAR_UUID: u16 = 0xFFF1;

/// Device Information Service (Bluetooth SIG assigned).
pub const DEVICE_INFO_SERVICE_UUID: u16 = 0x180A;

/// Manufacturer Name String characteristic.
pub const MANUFACTURER_NAME_CHAR_UUID: u16 = 0x2A29;

/// Model Number String characteristic.
pub const MODEL_NUMBER_CHAR_UUID: u16 = 0x2A24;

/// Value of the Manufacturer Name characteristic.
pub const MANUFACTURER_NAME: &str = "Nordic Semiconductor";

/// Value of the Model Number characteristic.
pub const MODEL_NUMBER: &str = "ADC BLE Sensor";

// BLE

/// Complete local name placed in the advertising payload and the GAP
/// device name attribute.
pub const DEVICE_NAME: &str = "NRF52_ADC";

/// Advertising interval (in 0.625 ms units). 400 = 250 ms.
pub const BLE_ADV_INTERVAL: u32 = 400;

/// Back-off before re-advertising after a failed attempt (ms).
pub const BLE_ADV_RETRY_MS: u64 = 100;

/// ATT MTU requested from the SoftDevice.
pub const BLE_ATT_MTU: u16 = 23;

/// Size of the SoftDevice attribute table (bytes).
pub const BLE_ATTR_TAB_SIZE: u32 = 1408;

/// Upper bound on attributes the SoftDevice table is configured for.
/// Registration refuses a schema whose footprint exceeds it.
pub const BLE_MAX_ATTRIBUTES: usize = 32;

// ADC sampling

/// Raw conversions averaged into a single published sample.
pub const ADC_SAMPLES_PER_WINDOW: u32 = 100;

/// Delay between two raw conversions (ms).
pub const ADC_SAMPLE_INTERVAL_MS: u64 = 10;

/// Pause between the end of one window and the start of the next (ms).
pub const ADC_PUBLISH_PAUSE_MS: u64 = 500;

/// SAADC resolution in bits.
pub const ADC_RESOLUTION_BITS: u8 = 12;

/// Input range with the internal 0.6 V reference and gain 1/6 (mV).
pub const ADC_FULL_SCALE_MV: u32 = 3600;

// Analog input
//
// The potentiometer wiper is on AIN0 (P0.02) of the nRF52840-DK. The
// concrete `embassy_nrf::saadc` channel is selected in `main.rs`.
