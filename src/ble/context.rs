//! Process-wide sensor state shared by the BLE event context and the
//! sampling task.
//!
//! Every field is a single atomic word (or a table of them), initialised
//! in a `const fn` so the context can live in a `static`.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::ble::connection::ConnectionTracker;
use crate::ble::schema::HandleTable;

pub struct SensorContext {
    sample_mv: AtomicU16,
    pub connection: ConnectionTracker,
    pub handles: HandleTable,
}

impl SensorContext {
    pub const fn new() -> Self {
        Self {
            sample_mv: AtomicU16::new(0),
            connection: ConnectionTracker::new(),
            handles: HandleTable::new(),
        }
    }

    /// Latest sample in millivolts (0 until the first publish).
    pub fn sample_mv(&self) -> u16 {
        self.sample_mv.load(Ordering::Relaxed)
    }

    pub(crate) fn store_sample(&self, millivolts: u16) {
        self.sample_mv.store(millivolts, Ordering::Relaxed);
    }
}

impl Default for SensorContext {
    fn default() -> Self {
        Self::new()
    }
}
