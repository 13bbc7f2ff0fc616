//! Digital to physical value scaling.

use crate::types::SignalParam;

/// Linear mapping between a signal's digital and physical ranges.
///
/// `to_physical(digital_min) == physical_min` and
/// `to_physical(digital_max) == physical_max` hold exactly. Values outside the
/// digital range are extrapolated, never clipped.
///
/// # Examples
///
/// ```rust
/// use edfread::Calibration;
///
/// let cal = Calibration::new(-32768, 32767, -200.0, 200.0);
/// assert_eq!(cal.to_physical(-32768), -200.0);
/// assert_eq!(cal.to_physical(32767), 200.0);
/// assert!(cal.to_physical(0).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    digital_min: f64,
    digital_span: f64,
    physical_min: f64,
    physical_max: f64,
}

impl Calibration {
    /// Builds the mapping from the two calibration endpoints.
    ///
    /// The header parser guarantees `digital_min < digital_max` and
    /// `physical_min != physical_max`; other inputs give non-finite results.
    pub fn new(digital_min: i32, digital_max: i32, physical_min: f64, physical_max: f64) -> Self {
        Calibration {
            digital_min: digital_min as f64,
            digital_span: digital_max as f64 - digital_min as f64,
            physical_min,
            physical_max,
        }
    }

    pub fn from_signal(signal: &SignalParam) -> Self {
        Self::new(
            signal.digital_min,
            signal.digital_max,
            signal.physical_min,
            signal.physical_max,
        )
    }

    /// Physical units per digital step
    pub fn gain(&self) -> f64 {
        (self.physical_max - self.physical_min) / self.digital_span
    }

    /// Digital offset such that `physical = gain * (digital + offset)`
    pub fn offset(&self) -> f64 {
        self.physical_max / self.gain() - (self.digital_min + self.digital_span)
    }

    pub fn to_physical(&self, digital_value: i32) -> f64 {
        // 插值形式保证两个端点精确
        let t = (digital_value as f64 - self.digital_min) / self.digital_span;
        self.physical_min * (1.0 - t) + self.physical_max * t
    }

    /// Nearest digital value for `physical_value`, not clamped to the digital range
    pub fn to_digital(&self, physical_value: f64) -> i32 {
        let digital = (physical_value - self.physical_min) / self.gain() + self.digital_min;
        digital.round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_exact() {
        let cal = Calibration::new(-32768, 32767, -200.0, 200.0);
        assert_eq!(cal.to_physical(-32768), -200.0);
        assert_eq!(cal.to_physical(32767), 200.0);

        let odd = Calibration::new(-2048, 2047, -3.3, 7.1);
        assert_eq!(odd.to_physical(-2048), -3.3);
        assert_eq!(odd.to_physical(2047), 7.1);
    }

    #[test]
    fn test_monotonic_over_full_range() {
        let cal = Calibration::new(-32768, 32767, -200.0, 200.0);
        let mut previous = cal.to_physical(-32768);
        for digital in -32767..=32767 {
            let current = cal.to_physical(digital);
            assert!(current > previous, "not increasing at {}", digital);
            previous = current;
        }
    }

    #[test]
    fn test_inverted_physical_range() {
        let cal = Calibration::new(0, 100, 10.0, -10.0);
        assert_eq!(cal.to_physical(0), 10.0);
        assert_eq!(cal.to_physical(100), -10.0);
        assert!(cal.to_physical(50).abs() < 1e-12);
    }

    #[test]
    fn test_extrapolates_without_clipping() {
        let cal = Calibration::new(0, 100, 0.0, 1.0);
        assert!((cal.to_physical(200) - 2.0).abs() < 1e-12);
        assert!((cal.to_physical(-100) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gain_offset_form_agrees() {
        let cal = Calibration::new(-1000, 1000, -100.0, 100.0);
        assert!((cal.gain() - 0.1).abs() < 1e-12);
        for digital in [-1000, -333, 0, 1, 999] {
            let via_offset = cal.gain() * (digital as f64 + cal.offset());
            assert!((via_offset - cal.to_physical(digital)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_to_digital_inverse() {
        let cal = Calibration::new(-32768, 32767, -100.0, 100.0);
        assert!((cal.to_digital(50.0) - 16384).abs() <= 1);
        assert_eq!(cal.to_digital(-100.0), -32768);
        assert_eq!(cal.to_digital(100.0), 32767);
    }
}
