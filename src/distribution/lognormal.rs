//! The three parameter log-normal distribution.

use statrs::distribution::{Continuous, LogNormal};
use statrs::StatsError;

/// A log-normal distribution shifted right by `location`.
///
/// `ln(x - location)` is normally distributed with mean `ln(scale)` and standard deviation
/// `shape`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftedLogNormal {
    location: f64,
    scale: f64,
    shape: f64,
    inner: LogNormal,
}

impl ShiftedLogNormal {
    /// Constructs the distribution.
    ///
    /// # Errors
    /// Returns [`StatsError::BadParams`] if `location` is not finite or `scale` or `shape` are not
    /// finite and positive.
    pub fn new(location: f64, scale: f64, shape: f64) -> Result<Self, StatsError> {
        if !(location.is_finite() && scale.is_finite() && scale > 0.0) {
            return Err(StatsError::BadParams);
        }
        let inner = LogNormal::new(scale.ln(), shape)?;
        Ok(Self {
            location,
            scale,
            shape,
            inner,
        })
    }

    /// The shift of the distribution.
    #[must_use]
    pub fn location(&self) -> f64 {
        self.location
    }

    /// The median of `x - location`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The standard deviation of `ln(x - location)`.
    #[must_use]
    pub fn shape(&self) -> f64 {
        self.shape
    }
}

impl Continuous<f64, f64> for ShiftedLogNormal {
    fn pdf(&self, x: f64) -> f64 {
        self.inner.pdf(x - self.location)
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        self.inner.ln_pdf(x - self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_is_shifted() {
        let shifted = ShiftedLogNormal::new(3.0, 2.0, 0.5).unwrap();
        let plain = LogNormal::new(2.0_f64.ln(), 0.5).unwrap();
        for x in [0.5, 1.0, 2.0, 7.0] {
            assert!((shifted.pdf(x + 3.0) - plain.pdf(x)).abs() < 1e-12);
        }
        assert_eq!(shifted.pdf(2.0), 0.0);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(ShiftedLogNormal::new(0.0, -1.0, 0.5).is_err());
        assert!(ShiftedLogNormal::new(0.0, 1.0, -0.5).is_err());
        assert!(ShiftedLogNormal::new(f64::NAN, 1.0, 0.5).is_err());
    }
}
