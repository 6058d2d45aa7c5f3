//! Finite-difference differentiation of uniformly sampled series.
//!
//! Backward differences are used so that sample `t` only depends on
//! samples `t`, `t-1` and `t-2`:
//!
//! - first order: `(f[t] - f[t-1]) / dt`
//! - second order: `(f[t] - 2 f[t-1] + f[t-2]) / dt²`
//!
//! The first `order` samples have no history and come back as `None`.
//! Consumers must skip them; they are never reported as zero.

use crate::{trial::validate_sample_interval, Error, Result};
use std::ops::{Mul, Sub};

/// Order of the finite-difference derivative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeOrder {
    /// Velocity
    First,
    /// Acceleration
    Second,
}

impl DerivativeOrder {
    /// Number of leading samples left undefined
    #[must_use]
    pub fn undefined_samples(self) -> usize {
        match self {
            DerivativeOrder::First => 1,
            DerivativeOrder::Second => 2,
        }
    }
}

impl TryFrom<u8> for DerivativeOrder {
    type Error = Error;

    fn try_from(order: u8) -> Result<Self> {
        match order {
            1 => Ok(DerivativeOrder::First),
            2 => Ok(DerivativeOrder::Second),
            _ => Err(Error::InvalidInput(format!("Derivative order must be 1 or 2, got {order}"))),
        }
    }
}

/// Differentiate a series sampled every `delta_t` seconds
///
/// Works for any sample type supporting subtraction and scaling, such as
/// `f64`, `Vector3<f64>` or a whole [`SegmentPoints`](crate::trial::SegmentPoints) frame.
///
/// # Errors
///
/// Returns an error if `delta_t` is not a positive finite number
pub fn derivative<T>(series: &[T], delta_t: f64, order: DerivativeOrder) -> Result<Vec<Option<T>>>
where
    T: Copy + Sub<Output = T> + Mul<f64, Output = T>,
{
    validate_sample_interval(delta_t)?;

    let output = match order {
        DerivativeOrder::First => {
            let scale = 1.0 / delta_t;
            (0..series.len())
                .map(|t| (t >= 1).then(|| (series[t] - series[t - 1]) * scale))
                .collect()
        }
        DerivativeOrder::Second => {
            let scale = 1.0 / (delta_t * delta_t);
            (0..series.len())
                .map(|t| {
                    (t >= 2).then(|| ((series[t] - series[t - 1]) - (series[t - 1] - series[t - 2])) * scale)
                })
                .collect()
        }
    };

    Ok(output)
}

/// Number of defined samples in a derivative series
#[must_use]
pub fn defined_count<T>(series: &[Option<T>]) -> usize {
    series.iter().filter(|sample| sample.is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use proptest::prelude::*;

    #[test]
    fn test_constant_series_has_zero_derivative() {
        let series = vec![Vector3::new(1.0, 2.0, 3.0); 10];

        for order in [DerivativeOrder::First, DerivativeOrder::Second] {
            let result = derivative(&series, 0.01, order).unwrap();
            assert_eq!(result.len(), series.len());
            for (t, sample) in result.iter().enumerate() {
                if t < order.undefined_samples() {
                    assert!(sample.is_none());
                } else {
                    assert_eq!(*sample, Some(Vector3::zeros()));
                }
            }
        }
    }

    #[test]
    fn test_linear_series_velocity() {
        let series: Vec<f64> = (0..5).map(|t| 2.0 * f64::from(t) * 0.1).collect();
        let velocity = derivative(&series, 0.1, DerivativeOrder::First).unwrap();
        assert_eq!(velocity[0], None);
        for v in velocity.iter().skip(1) {
            assert!((v.unwrap() - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_quadratic_series_acceleration() {
        // f = 0.5 * a * t^2 with a = 3
        let dt = 0.01;
        let series: Vec<f64> = (0..20)
            .map(|i| {
                let t = f64::from(i) * dt;
                0.5 * 3.0 * t * t
            })
            .collect();
        let accel = derivative(&series, dt, DerivativeOrder::Second).unwrap();
        assert_eq!(defined_count(&accel), 18);
        for a in accel.iter().flatten() {
            assert!((a - 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_short_series() {
        let accel = derivative(&[1.0, 2.0], 0.01, DerivativeOrder::Second).unwrap();
        assert_eq!(accel, vec![None, None]);
        assert!(derivative::<f64>(&[], 0.01, DerivativeOrder::First).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            derivative(&[1.0, 2.0, 3.0], 0.0, DerivativeOrder::First),
            Err(Error::InvalidInput(_))
        ));
        assert!(DerivativeOrder::try_from(3).is_err());
        assert!(DerivativeOrder::try_from(0).is_err());
        assert_eq!(DerivativeOrder::try_from(2).unwrap(), DerivativeOrder::Second);
    }

    proptest! {
        #[test]
        fn prop_constant_derivative_is_zero(value in -1e3f64..1e3, len in 0usize..50, dt in 1e-3f64..1.0) {
            let series = vec![value; len];
            for order in [DerivativeOrder::First, DerivativeOrder::Second] {
                let result = derivative(&series, dt, order).unwrap();
                prop_assert_eq!(result.len(), len);
                prop_assert_eq!(defined_count(&result), len.saturating_sub(order.undefined_samples()));
                for sample in result.iter().flatten() {
                    prop_assert_eq!(*sample, 0.0);
                }
            }
        }
    }
}
