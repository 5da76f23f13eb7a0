// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Contains the [`Family`] enum of the fitted distribution families and [`FitResult`], the
//! parameters of a fitted distribution.
//!
//! Every family is described by a location, a scale and, for the three parameter families, a
//! shape:
//!
//! * Normal: the mean and the standard deviation.
//! * Log-Normal: a log-normal distribution shifted right by the location, with `ln(scale)` and
//!   `shape` being the mean and standard deviation of `ln(x - location)`.
//! * Generalized Extreme Value: with `y = (x - location) / scale` the density is
//!   `exp(-t^(1/c)) * t^(1/c - 1) / scale` where `t = 1 - c * y > 0` and `c` is the shape.
//!   A positive shape bounds the upper tail; zero is the Gumbel distribution.
use std::fmt;

use statrs::distribution::{Continuous, Normal};

pub mod gev;
pub mod lognormal;

use gev::Gev;
use lognormal::ShiftedLogNormal;

/// A family of distributions that is fitted to the sample.
///
/// The order of [`Family::ALL`] is the order of the fits everywhere downstream: curve colors,
/// legend entries and report columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// The normal distribution.
    Normal,
    /// The three parameter (shifted) log-normal distribution.
    LogNormal,
    /// The generalized extreme value distribution.
    Gev,
}

impl Family {
    /// All families, in the order in which they are fitted and reported.
    pub const ALL: [Family; 3] = [Family::Normal, Family::LogNormal, Family::Gev];

    /// The human readable name of the family.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Family::Normal => "Normal",
            Family::LogNormal => "Log Normal",
            Family::Gev => "Generalized Extreme Value",
        }
    }

    /// Number of parameters: 2 (location, scale) or 3 (location, scale, shape).
    #[must_use]
    pub fn param_count(self) -> usize {
        match self {
            Family::Normal => 2,
            Family::LogNormal | Family::Gev => 3,
        }
    }

    /// Position of the family in [`Family::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Family::Normal => 0,
            Family::LogNormal => 1,
            Family::Gev => 2,
        }
    }

    /// The density at `x` of the distribution of this family with the parameters of `fit`.
    ///
    /// Returns 0 outside the support and NaN if the parameters do not describe a distribution.
    #[must_use]
    pub fn density(self, x: f64, fit: &FitResult) -> f64 {
        let shape = fit.shape.unwrap_or(f64::NAN);
        match self {
            Family::Normal => Normal::new(fit.location, fit.scale).map_or(f64::NAN, |d| d.pdf(x)),
            Family::LogNormal => ShiftedLogNormal::new(fit.location, fit.scale, shape)
                .map_or(f64::NAN, |d| d.pdf(x)),
            Family::Gev => Gev::new(fit.location, fit.scale, shape).map_or(f64::NAN, |d| d.pdf(x)),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fitted parameters of one family.
///
/// `shape` is present exactly when the family has three parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    family: Family,
    location: f64,
    scale: f64,
    shape: Option<f64>,
}

impl FitResult {
    /// Combines the parameters of a fit.
    ///
    /// Returns `None` if the presence of `shape` does not match [`Family::param_count`].
    #[must_use]
    pub fn new(family: Family, location: f64, scale: f64, shape: Option<f64>) -> Option<Self> {
        let expected_shape = family.param_count() == 3;
        (shape.is_some() == expected_shape).then_some(Self {
            family,
            location,
            scale,
            shape,
        })
    }

    /// The fitted family.
    #[must_use]
    pub fn family(&self) -> Family {
        self.family
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

    /// The shape parameter of the three parameter families.
    #[must_use]
    pub fn shape(&self) -> Option<f64> {
        self.shape
    }

    /// The parameters in report order: location, scale and the shape if present.
    pub fn parameters(&self) -> impl Iterator<Item = f64> {
        [self.location, self.scale].into_iter().chain(self.shape)
    }

    /// The density of the fitted distribution at `x`.
    #[must_use]
    pub fn density(&self, x: f64) -> f64 {
        self.family.density(x, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_are_in_fixed_order() {
        assert_eq!(
            Family::ALL,
            [Family::Normal, Family::LogNormal, Family::Gev]
        );
        for (i, family) in Family::ALL.into_iter().enumerate() {
            assert_eq!(family.index(), i);
        }
        assert_eq!(Family::Gev.to_string(), "Generalized Extreme Value");
    }

    #[test]
    fn shape_presence_follows_param_count() {
        assert!(FitResult::new(Family::Normal, 0.0, 1.0, None).is_some());
        assert!(FitResult::new(Family::Normal, 0.0, 1.0, Some(1.0)).is_none());
        assert!(FitResult::new(Family::Gev, 0.0, 1.0, None).is_none());
        let fit = FitResult::new(Family::LogNormal, 1.0, 2.0, Some(0.5)).unwrap();
        assert_eq!(fit.parameters().collect::<Vec<_>>(), vec![1.0, 2.0, 0.5]);
    }

    #[test]
    fn densities_match_closed_forms() {
        let normal = FitResult::new(Family::Normal, 1.0, 2.0, None).unwrap();
        let expected = (-0.5_f64).exp() / (2.0 * (2.0 * std::f64::consts::PI).sqrt());
        assert!((normal.density(3.0) - expected).abs() < 1e-12);

        // Gumbel: exp(-exp(-y)) * exp(-y) / scale at y = 0.
        let gumbel = FitResult::new(Family::Gev, 0.0, 2.0, Some(0.0)).unwrap();
        assert!((gumbel.density(0.0) - (-1.0_f64).exp() / 2.0).abs() < 1e-12);

        let lognormal = FitResult::new(Family::LogNormal, 5.0, 1.0, Some(1.0)).unwrap();
        assert_eq!(lognormal.density(4.0), 0.0);
        let expected = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
        assert!((lognormal.density(6.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn invalid_parameters_have_no_density() {
        let fit = FitResult::new(Family::Normal, 0.0, -1.0, None).unwrap();
        assert!(fit.density(0.0).is_nan());
    }
}
