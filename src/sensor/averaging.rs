//! ADC window averaging and calibration to millivolts.

/// Accumulates raw conversions of one averaging window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Window {
    sum: u32,
    count: u32,
}

impl Window {
    pub const fn new() -> Self {
        Self { sum: 0, count: 0 }
    }

    /// Add one raw SAADC result. Single-ended inputs can read slightly
    /// below ground; those readings count as 0.
    pub fn push(&mut self, raw: i16) {
        self.sum = self.sum.saturating_add(raw.max(0) as u32);
        self.count += 1;
    }

    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Integer mean of the window, `None` if nothing was pushed.
    pub fn mean(&self) -> Option<u32> {
        (self.count > 0).then(|| self.sum / self.count)
    }
}

/// Convert a raw reading to millivolts.
///
/// `full_scale_mv` is the input voltage that reads as the maximum code of
/// a `resolution_bits` converter. Results saturate at `u16::MAX`.
pub fn raw_to_millivolts(raw: u32, resolution_bits: u8, full_scale_mv: u32) -> u16 {
    let max_code = (1u32 << resolution_bits) - 1;
    let raw = raw.min(max_code);
    let mv = (raw as u64 * full_scale_mv as u64 + max_code as u64 / 2) / max_code as u64;
    mv.min(u16::MAX as u64) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_has_no_mean() {
        let w = Window::new();
        assert!(w.is_empty());
        assert_eq!(w.mean(), None);
    }

    #[test]
    fn mean_of_constant_readings() {
        let mut w = Window::new();
        for _ in 0..100 {
            w.push(2048);
        }
        assert_eq!(w.len(), 100);
        assert_eq!(w.mean(), Some(2048));
    }

    #[test]
    fn mean_truncates() {
        let mut w = Window::new();
        w.push(1);
        w.push(2);
        assert_eq!(w.mean(), Some(1));
    }

    #[test]
    fn negative_readings_clamp_to_zero() {
        let mut w = Window::new();
        w.push(-3);
        w.push(5);
        assert_eq!(w.mean(), Some(2));
    }

    #[test]
    fn calibration_endpoints() {
        assert_eq!(raw_to_millivolts(0, 12, 3600), 0);
        assert_eq!(raw_to_millivolts(4095, 12, 3600), 3600);
    }

    #[test]
    fn calibration_midscale_rounds() {
        // 2048 / 4095 * 3600 = 1800.44
        assert_eq!(raw_to_millivolts(2048, 12, 3600), 1800);
        // 1 / 4095 * 3600 = 0.879
        assert_eq!(raw_to_millivolts(1, 12, 3600), 1);
    }

    #[test]
    fn calibration_clamps_out_of_range_codes() {
        assert_eq!(raw_to_millivolts(10_000, 12, 3600), 3600);
    }

    #[test]
    fn calibration_saturates_at_u16() {
        assert_eq!(raw_to_millivolts(255, 8, 100_000), u16::MAX);
    }
}
