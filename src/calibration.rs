//! Two-point calibration of raw sensor readings.
//!
//! The calibration model maps the sensor's measured low/high points of water
//! (ice bath and rolling boil) onto reference values for the measurement
//! site, and corrects every reading with the affine transform through those
//! two points. Gathering the points is described in the DS18B20 calibration
//! literature; the reference low point of water barely moves with altitude,
//! so 0.0 is an adequate default for it.

use crate::error::{W1Error, W1Result};

/// Reference measurements for two-point linear correction.
///
/// All four points are degrees Celsius. Invariants are validated eagerly at
/// construction and the data is immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationData {
    measured_high_point: f64,
    measured_low_point: f64,
    reference_high_point: f64,
    reference_low_point: f64,
}

impl CalibrationData {
    /// Builds calibration data, validating that every point is a real number
    /// and that each low point lies below its high point.
    pub fn new(
        measured_high_point: f64,
        measured_low_point: f64,
        reference_high_point: f64,
        reference_low_point: f64,
    ) -> W1Result<Self> {
        let data = Self {
            measured_high_point,
            measured_low_point,
            reference_high_point,
            reference_low_point,
        };

        for (label, value) in [
            ("measured high point", measured_high_point),
            ("measured low point", measured_low_point),
            ("reference high point", reference_high_point),
            ("reference low point", reference_low_point),
        ] {
            if !value.is_finite() {
                return Err(W1Error::InvalidCalibrationData {
                    reason: "every calibration point must be a finite number",
                    data: format!("{label} is {value}"),
                });
            }
        }

        if measured_low_point >= measured_high_point {
            return Err(W1Error::InvalidCalibrationData {
                reason: "measured low point must be less than measured high point; \
                         did you reverse the values?",
                data: format!("{data:?}"),
            });
        }

        if reference_low_point >= reference_high_point {
            return Err(W1Error::InvalidCalibrationData {
                reason: "reference low point must be less than reference high point; \
                         did you reverse the values?",
                data: format!("{data:?}"),
            });
        }

        Ok(data)
    }

    /// Like [`CalibrationData::new`] with the reference low point of water
    /// defaulted to 0.0 °C.
    pub fn with_default_reference_low(
        measured_high_point: f64,
        measured_low_point: f64,
        reference_high_point: f64,
    ) -> W1Result<Self> {
        Self::new(
            measured_high_point,
            measured_low_point,
            reference_high_point,
            0.0,
        )
    }

    /// Corrects a raw Celsius reading against the calibration data.
    ///
    /// Subtracts the measured low point, rescales by the reference-to-measured
    /// range ratio, and re-anchors at the reference low point. The transform
    /// is affine, so it extrapolates linearly beyond the two points as well.
    pub fn correct(&self, raw_temperature: f64) -> f64 {
        let reference_range = self.reference_high_point - self.reference_low_point;
        let measured_range = self.measured_high_point - self.measured_low_point;
        let scaling_factor = reference_range / measured_range;
        (raw_temperature - self.measured_low_point) * scaling_factor + self.reference_low_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_map_exactly_onto_references() {
        let calibration = CalibrationData::new(99.0, -1.0, 100.0, 0.0).unwrap();
        assert_eq!(calibration.correct(-1.0), 0.0);
        assert_eq!(calibration.correct(99.0), 100.0);
    }

    #[test]
    fn test_correction_is_affine_between_and_beyond_the_points() {
        let calibration = CalibrationData::new(99.0, -1.0, 100.0, 0.0).unwrap();
        // scaling factor 100/100 = 1.0, shift +1.0
        assert_eq!(calibration.correct(49.0), 50.0);
        assert_eq!(calibration.correct(-11.0), -10.0);
        assert_eq!(calibration.correct(119.0), 120.0);
    }

    #[test]
    fn test_non_unit_scaling() {
        let calibration = CalibrationData::new(98.0, 2.0, 100.0, 4.0).unwrap();
        // measured range 96, reference range 96: factor 1.0 anchored at 4.0
        assert_eq!(calibration.correct(2.0), 4.0);
        let calibration = CalibrationData::new(102.0, 2.0, 100.0, 0.0).unwrap();
        // measured range 100, reference range 100: pure shift by -2
        assert_eq!(calibration.correct(52.0), 50.0);
    }

    #[test]
    fn test_default_reference_low_point_is_zero() {
        let calibration = CalibrationData::with_default_reference_low(99.5, 0.5, 100.0).unwrap();
        assert_eq!(calibration.correct(0.5), 0.0);
    }

    #[test]
    fn test_reversed_measured_points_are_rejected() {
        let result = CalibrationData::new(-1.0, 99.0, 100.0, 0.0);
        assert!(matches!(
            result,
            Err(W1Error::InvalidCalibrationData { reason, .. })
                if reason.contains("measured low point")
        ));
    }

    #[test]
    fn test_reversed_reference_points_are_rejected() {
        let result = CalibrationData::new(99.0, -1.0, 0.0, 100.0);
        assert!(matches!(
            result,
            Err(W1Error::InvalidCalibrationData { reason, .. })
                if reason.contains("reference low point")
        ));
    }

    #[test]
    fn test_equal_points_are_rejected() {
        assert!(CalibrationData::new(50.0, 50.0, 100.0, 0.0).is_err());
        assert!(CalibrationData::new(99.0, -1.0, 50.0, 50.0).is_err());
    }

    #[test]
    fn test_absent_points_are_rejected() {
        assert!(CalibrationData::new(f64::NAN, -1.0, 100.0, 0.0).is_err());
        assert!(CalibrationData::new(99.0, f64::NEG_INFINITY, 100.0, 0.0).is_err());
    }
}
