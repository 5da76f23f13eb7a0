//! The generalized extreme value distribution.

use statrs::distribution::Continuous;
use statrs::StatsError;

/// A generalized extreme value distribution with the shape `c` bounding the upper tail when
/// positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gev {
    location: f64,
    scale: f64,
    shape: f64,
}

impl Gev {
    /// Constructs the distribution.
    ///
    /// # Errors
    /// Returns [`StatsError::BadParams`] if a parameter is not finite or `scale` is not positive.
    pub fn new(location: f64, scale: f64, shape: f64) -> Result<Self, StatsError> {
        if !(location.is_finite() && shape.is_finite() && scale.is_finite() && scale > 0.0) {
            return Err(StatsError::BadParams);
        }
        Ok(Self {
            location,
            scale,
            shape,
        })
    }

    /// The location parameter.
    #[must_use]
    pub fn location(&self) -> f64 {
        self.location
    }

    /// The scale parameter.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The shape parameter.
    #[must_use]
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Whether `x` lies inside the support.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        1.0 - self.shape * self.standardize(x) > 0.0
    }

    fn standardize(&self, x: f64) -> f64 {
        (x - self.location) / self.scale
    }
}

impl Continuous<f64, f64> for Gev {
    fn pdf(&self, x: f64) -> f64 {
        self.ln_pdf(x).exp()
    }

    fn ln_pdf(&self, x: f64) -> f64 {
        let y = self.standardize(x);
        let cy = self.shape * y;
        if cy >= 1.0 {
            return f64::NEG_INFINITY;
        }
        // ln(t) with t = 1 - c*y, and ln(t) / c which tends to -y as c -> 0.
        let ln_t = (-cy).ln_1p();
        let ln_p = if self.shape == 0.0 { -y } else { ln_t / self.shape };
        let value = -ln_p.exp() + ln_p - ln_t - self.scale.ln();
        if value.is_nan() {
            f64::NEG_INFINITY
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_scale() {
        assert!(Gev::new(0.0, 0.0, 0.1).is_err());
        assert!(Gev::new(0.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn positive_shape_bounds_upper_tail() {
        let gev = Gev::new(0.0, 1.0, 0.5).unwrap();
        assert!(gev.contains(1.9));
        assert!(!gev.contains(2.0));
        assert_eq!(gev.pdf(3.0), 0.0);
        assert!(gev.pdf(1.0) > 0.0);
    }

    #[test]
    fn negative_shape_bounds_lower_tail() {
        let gev = Gev::new(0.0, 1.0, -0.5).unwrap();
        assert!(!gev.contains(-2.5));
        assert_eq!(gev.pdf(-2.5), 0.0);
        assert!(gev.contains(100.0));
    }

    #[test]
    fn small_shape_approaches_gumbel() {
        let gumbel = Gev::new(1.0, 2.0, 0.0).unwrap();
        let near = Gev::new(1.0, 2.0, 1e-9).unwrap();
        for x in [-3.0, 0.0, 1.0, 4.0, 10.0] {
            assert!((gumbel.pdf(x) - near.pdf(x)).abs() < 1e-7);
        }
    }

    #[test]
    fn density_integrates_to_one() {
        let gev = Gev::new(2.0, 1.5, 0.2).unwrap();
        let step = 1e-3;
        let area: f64 = (0..40_000)
            .map(|i| f64::from(i) * step - 10.0)
            .map(|x| gev.pdf(x) * step)
            .sum();
        assert!((area - 1.0).abs() < 1e-3);
    }
}
