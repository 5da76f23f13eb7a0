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

//! Contains [`FittingDistribution`] trait and its implementors for the maximum-likelihood fits of
//! every [`Family`].
//!
//! The iterative fits minimize the negative log-likelihood with a Nelder-Mead simplex. They are
//! seeded with a location guess, normally the center of the modal histogram bin, and fail with a
//! [`FitError`] instead of returning a fit that did not converge.
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::dataset::Dataset;
use crate::distribution::gev::Gev;
use crate::distribution::lognormal::ShiftedLogNormal;
use crate::distribution::{Family, FitResult};
use crate::optimize::NelderMead;

/// Why a fit failed.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum FitFailure {
    /// All samples are equal, so there is no spread to fit a scale to.
    #[error("the sample has no spread")]
    DegenerateSample,
    /// The solver used up its iteration budget.
    #[error("the solver did not converge within {iterations} iterations")]
    NotConverged {
        /// Number of iterations performed.
        iterations: usize,
    },
    /// The solver ended at a point where the likelihood is not finite.
    #[error("the likelihood is not finite at the solver's best point")]
    NonFiniteLikelihood,
    /// The solver ended at parameters under which `count` samples are impossible.
    #[error("{count} samples lie outside the support of the fitted distribution")]
    SampleOutsideSupport {
        /// Number of samples with zero density.
        count: usize,
    },
}

/// Fitting the `family` distribution failed.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("fitting the {family} distribution failed: {cause}")]
pub struct FitError {
    /// The family that could not be fitted.
    pub family: Family,
    /// Why it failed.
    #[source]
    pub cause: FitFailure,
}

#[allow(clippy::module_name_repetitions)]
/// A trait for probability distributions that can be constructed from a dataset by maximum
/// likelihood.
pub trait FittingDistribution: Continuous<f64, f64> + Sized {
    /// The family of the distribution.
    const FAMILY: Family;

    /// Fits the distribution to `samples`, using `initial_location` as the starting guess of the
    /// location.
    ///
    /// # Errors
    /// Returns a [`FitFailure`] if the solver fails or the sample cannot be fitted.
    fn fit(samples: &[f64], initial_location: f64) -> Result<Self, FitFailure>;

    /// The parameters of `self`.
    fn parameters(&self) -> FitResult;
}

/// Penalty added to the negative log-likelihood for every sample outside the support.
fn outside_penalty() -> f64 {
    f64::MAX.ln() * 100.0
}

/// Negative log-likelihood of `samples`, with samples of zero density penalized instead of
/// making the value infinite. Returns the value and the number of penalized samples.
fn penalized_nll(samples: &[f64], ln_pdf: impl Fn(f64) -> f64) -> (f64, usize) {
    let mut total = 0.0;
    let mut outside = 0;
    for &x in samples {
        let value = ln_pdf(x);
        if value.is_finite() {
            total -= value;
        } else {
            outside += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let penalty = outside as f64 * outside_penalty();
    (total + penalty, outside)
}

/// The mean and the population standard deviation.
fn moments(samples: &[f64]) -> (f64, f64) {
    (
        Statistics::mean(samples),
        Statistics::population_std_dev(samples),
    )
}

/// The smallest and the largest sample.
fn extrema(samples: &[f64]) -> (f64, f64) {
    (Statistics::min(samples), Statistics::max(samples))
}

/// Whether the samples are not all equal. The standard deviation of a constant sample is usually
/// a rounding error above zero, so the range is checked instead.
fn has_spread(samples: &[f64]) -> bool {
    let (lo, hi) = extrema(samples);
    hi - lo > 0.0
}

/// Sample skewness: the third central moment over the cubed population standard deviation.
fn skewness(samples: &[f64], mean: f64, std_dev: f64) -> f64 {
    let third = samples.iter().map(|x| (x - mean).powi(3)).mean();
    third / std_dev.powi(3)
}

impl FittingDistribution for Normal {
    const FAMILY: Family = Family::Normal;

    /// Returns a normal distribution with the mean equal to the mean of `samples` and the standard
    /// deviation equal to the population standard deviation of `samples`, which are their
    /// maximum-likelihood estimates. The closed form needs no location guess.
    fn fit(samples: &[f64], _initial_location: f64) -> Result<Self, FitFailure> {
        if !has_spread(samples) {
            return Err(FitFailure::DegenerateSample);
        }
        let (mean, std_dev) = moments(samples);
        Normal::new(mean, std_dev).map_err(|_| FitFailure::NonFiniteLikelihood)
    }

    fn parameters(&self) -> FitResult {
        use statrs::statistics::Distribution;
        FitResult::new(
            Family::Normal,
            self.mean().unwrap_or(f64::NAN),
            self.std_dev().unwrap_or(f64::NAN),
            None,
        )
        .unwrap_or_else(|| unreachable!("the normal distribution has two parameters"))
    }
}

impl FittingDistribution for ShiftedLogNormal {
    const FAMILY: Family = Family::LogNormal;

    /// For a fixed location the maximum-likelihood scale and shape are the exponentiated mean and
    /// the standard deviation of `ln(x - location)`, so only the location is searched for.
    ///
    /// The location is searched as `tau = range / (min - location)`, which is positive for every
    /// location below the smallest sample and tends to zero as the distribution approaches a
    /// normal one. This keeps the search bounded for samples without positive skew, where the
    /// likelihood keeps growing as the location goes to minus infinity.
    fn fit(samples: &[f64], initial_location: f64) -> Result<Self, FitFailure> {
        let (lo, hi) = extrema(samples);
        let range = hi - lo;
        if !(range > 0.0) {
            return Err(FitFailure::DegenerateSample);
        }

        // A seed at or above the minimum is reflected below it.
        let seed = if initial_location < lo {
            initial_location
        } else {
            lo - (initial_location - lo).max(range * 1e-3)
        };
        let start = range / (lo - seed);

        let location_of = |tau: f64| lo - range / tau;
        let log_moments = |location: f64| {
            let logs: Vec<f64> = samples.iter().map(|x| (x - location).ln()).collect();
            let (mu, sigma) = moments(&logs);
            (logs.iter().sum::<f64>(), mu, sigma)
        };
        let objective = |p: &[f64; 1]| {
            let tau = p[0];
            if !(tau > 0.0 && tau.is_finite()) {
                return f64::INFINITY;
            }
            let (log_sum, _, sigma) = log_moments(location_of(tau));
            if !(sigma > 0.0) {
                return f64::INFINITY;
            }
            #[allow(clippy::cast_precision_loss)]
            let n = samples.len() as f64;
            log_sum + n * sigma.ln() + 0.5 * n * (1.0 + (2.0 * std::f64::consts::PI).ln())
        };

        let minimum = NelderMead::for_dimension(1).minimize(objective, [start]);
        log::debug!(
            "log-normal fit: tau {} after {} iterations",
            minimum.point[0],
            minimum.iterations
        );
        if !minimum.converged {
            return Err(FitFailure::NotConverged {
                iterations: minimum.iterations,
            });
        }
        if !minimum.value.is_finite() {
            return Err(FitFailure::NonFiniteLikelihood);
        }
        let location = location_of(minimum.point[0]);
        let (_, mu, sigma) = log_moments(location);
        ShiftedLogNormal::new(location, mu.exp(), sigma).map_err(|_| FitFailure::NonFiniteLikelihood)
    }

    fn parameters(&self) -> FitResult {
        FitResult::new(
            Family::LogNormal,
            self.location(),
            self.scale(),
            Some(self.shape()),
        )
        .unwrap_or_else(|| unreachable!("the log-normal distribution has three parameters"))
    }
}

impl FittingDistribution for Gev {
    const FAMILY: Family = Family::Gev;

    /// Searches location, scale and shape of the standardized sample, starting from the Gumbel
    /// distribution's moment estimate of the scale and a mild shape with the sign of the sample's
    /// skewness.
    fn fit(samples: &[f64], initial_location: f64) -> Result<Self, FitFailure> {
        if !has_spread(samples) {
            return Err(FitFailure::DegenerateSample);
        }
        let (mean, std_dev) = moments(samples);
        let standardized: Vec<f64> = samples.iter().map(|x| (x - mean) / std_dev).collect();

        let shape = if skewness(samples, mean, std_dev) > 0.0 {
            -0.1
        } else {
            0.1
        };
        let start = [
            (initial_location - mean) / std_dev,
            6.0_f64.sqrt() / std::f64::consts::PI,
            shape,
        ];

        let objective = |p: &[f64; 3]| match Gev::new(p[0], p[1], p[2]) {
            Ok(gev) => penalized_nll(&standardized, |x| gev.ln_pdf(x)).0,
            Err(_) => f64::INFINITY,
        };
        let minimum = NelderMead::for_dimension(3).minimize(objective, start);
        log::debug!(
            "GEV fit: {:?} after {} iterations",
            minimum.point,
            minimum.iterations
        );
        if !minimum.converged {
            return Err(FitFailure::NotConverged {
                iterations: minimum.iterations,
            });
        }
        if !minimum.value.is_finite() {
            return Err(FitFailure::NonFiniteLikelihood);
        }

        let [location, scale, shape] = minimum.point;
        let fitted = Gev::new(mean + location * std_dev, scale * std_dev, shape)
            .map_err(|_| FitFailure::NonFiniteLikelihood)?;
        let (_, outside) = penalized_nll(samples, |x| fitted.ln_pdf(x));
        if outside > 0 {
            return Err(FitFailure::SampleOutsideSupport { count: outside });
        }
        Ok(fitted)
    }

    fn parameters(&self) -> FitResult {
        FitResult::new(
            Family::Gev,
            self.location(),
            self.scale(),
            Some(self.shape()),
        )
        .unwrap_or_else(|| unreachable!("the GEV distribution has three parameters"))
    }
}

/// Fits `D` and tags a failure with its family.
fn fit_family<D: FittingDistribution>(
    samples: &[f64],
    initial_location: f64,
) -> Result<FitResult, FitError> {
    D::fit(samples, initial_location)
        .map(|distribution| distribution.parameters())
        .map_err(|cause| FitError {
            family: D::FAMILY,
            cause,
        })
}

impl Family {
    /// Fits this family to `dataset` by maximum likelihood.
    ///
    /// # Errors
    /// Returns [`FitError`] if the solver does not converge or the sample cannot be fitted.
    pub fn fit(self, dataset: &Dataset, initial_location: f64) -> Result<FitResult, FitError> {
        let samples = dataset.samples();
        let fit = match self {
            Family::Normal => fit_family::<Normal>(samples, initial_location),
            Family::LogNormal => fit_family::<ShiftedLogNormal>(samples, initial_location),
            Family::Gev => fit_family::<Gev>(samples, initial_location),
        }?;
        log::info!(
            "fitted {self} distribution: {:?}",
            fit.parameters().collect::<Vec<_>>()
        );
        Ok(fit)
    }
}

/// The fits of all families.
#[derive(Debug, Clone, PartialEq)]
pub struct Fits {
    results: Vec<FitResult>,
    normal: FitResult,
}

impl Fits {
    /// Fits every family of [`Family::ALL`] in order.
    ///
    /// # Errors
    /// Returns the [`FitError`] of the first family that fails; no partial result is produced.
    pub fn new(dataset: &Dataset, initial_location: f64) -> Result<Self, FitError> {
        let results = Family::ALL
            .into_iter()
            .map(|family| family.fit(dataset, initial_location))
            .collect::<Result<Vec<_>, _>>()?;
        let normal = results[Family::Normal.index()];
        Ok(Self { results, normal })
    }

    /// Wraps already computed fits.
    ///
    /// Returns `None` unless `results` holds exactly one fit per family in the order of
    /// [`Family::ALL`].
    #[must_use]
    pub fn from_results(results: Vec<FitResult>) -> Option<Self> {
        let in_order = results.len() == Family::ALL.len()
            && results
                .iter()
                .zip(Family::ALL)
                .all(|(fit, family)| fit.family() == family);
        let normal = *results.first()?;
        in_order.then_some(Self { results, normal })
    }

    /// The fits in the order of [`Family::ALL`].
    #[must_use]
    pub fn results(&self) -> &[FitResult] {
        &self.results
    }

    /// The normal fit, whose mean and standard deviation drive the trimming of the display range.
    #[must_use]
    pub fn normal(&self) -> &FitResult {
        &self.normal
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_distr::{Distribution, LogNormal, Normal as RandNormal, Uniform};

    use super::*;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(0x5eed)
    }

    fn normal_samples(n: usize, mean: f64, std_dev: f64) -> Vec<f64> {
        let distr = RandNormal::new(mean, std_dev).unwrap();
        let mut rng = rng();
        (0..n).map(|_| distr.sample(&mut rng)).collect()
    }

    #[test]
    fn normal_fit_is_mean_and_population_std_dev() {
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let fit = fit_family::<Normal>(&samples, 0.0).unwrap();
        assert!((fit.location() - 5.0).abs() < 1e-12);
        assert!((fit.scale() - 2.0).abs() < 1e-12);
        assert_eq!(fit.shape(), None);
    }

    #[test]
    fn constant_sample_fails_every_family() {
        // The mean of [4.2; 30] and [0.1; 10] is not exactly the sample value, so their computed
        // standard deviation is a tiny positive number.
        for samples in [vec![3.0; 20], vec![4.2; 30], vec![0.1; 10]] {
            let dataset = Dataset::from_samples(samples.clone()).unwrap();
            for family in Family::ALL {
                let err = family.fit(&dataset, samples[0]).unwrap_err();
                assert_eq!(err.family, family, "{samples:?}");
                assert_eq!(err.cause, FitFailure::DegenerateSample, "{samples:?}");
            }
        }
    }

    #[test]
    fn rounding_error_is_no_spread() {
        let samples = [4.2; 30];
        assert!(moments(&samples).1 >= 0.0);
        assert!(!has_spread(&samples));
        assert!(has_spread(&[4.2, 4.2, 4.200_000_000_000_001]));
    }

    #[test]
    fn lognormal_fit_recovers_parameters() {
        let distr = LogNormal::new(0.0, 0.5).unwrap();
        let mut rng = rng();
        let samples: Vec<f64> = (0..5000).map(|_| 2.0 + distr.sample(&mut rng)).collect();

        let fit = fit_family::<ShiftedLogNormal>(&samples, 2.8).unwrap();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(fit.location() < min);
        assert!((fit.location() - 2.0).abs() < 0.3, "{fit:?}");
        assert!((fit.shape().unwrap() - 0.5).abs() < 0.1, "{fit:?}");
    }

    #[test]
    fn lognormal_fit_of_symmetric_sample_approaches_normal() {
        let samples = normal_samples(2000, 10.0, 2.0);
        let fit = fit_family::<ShiftedLogNormal>(&samples, 10.0).unwrap();

        // A nearly normal shifted log-normal: far away location, tiny shape.
        assert!(fit.location() < 0.0, "{fit:?}");
        assert!(fit.shape().unwrap() < 0.2, "{fit:?}");
        let density = fit.density(10.0);
        let normal_density = 1.0 / (2.0 * (2.0 * std::f64::consts::PI).sqrt());
        assert!((density - normal_density).abs() < 0.02, "{density}");
    }

    #[test]
    fn gev_fit_recovers_gumbel_sample() {
        // Gumbel(location 5, scale 2) by inversion.
        let uniform = Uniform::new(f64::EPSILON, 1.0);
        let mut rng = rng();
        let samples: Vec<f64> = (0..10_000)
            .map(|_| 5.0 - 2.0 * (-uniform.sample(&mut rng).ln()).ln())
            .collect();

        let fit = fit_family::<Gev>(&samples, 5.0).unwrap();
        assert!((fit.location() - 5.0).abs() < 0.1, "{fit:?}");
        assert!((fit.scale() - 2.0).abs() < 0.1, "{fit:?}");
        assert!(fit.shape().unwrap().abs() < 0.05, "{fit:?}");
    }

    #[test]
    fn gev_fit_keeps_all_samples_in_support() {
        let samples = normal_samples(3000, -4.0, 0.5);
        let fit = fit_family::<Gev>(&samples, -4.0).unwrap();
        assert!(samples.iter().all(|&x| fit.density(x) > 0.0));
        // Normal samples have a short upper tail.
        assert!(fit.shape().unwrap() > 0.0, "{fit:?}");
    }

    #[test]
    fn fits_are_in_family_order() {
        let dataset = Dataset::from_samples(normal_samples(1000, 1.0, 0.1)).unwrap();
        let fits = Fits::new(&dataset, 1.0).unwrap();

        let families: Vec<Family> = fits.results().iter().map(FitResult::family).collect();
        assert_eq!(families, Family::ALL.to_vec());
        assert_eq!(fits.normal(), &fits.results()[0]);
    }

    #[test]
    fn from_results_checks_order() {
        let normal = FitResult::new(Family::Normal, 0.0, 1.0, None).unwrap();
        let lognormal = FitResult::new(Family::LogNormal, -1.0, 1.0, Some(0.5)).unwrap();
        let gev = FitResult::new(Family::Gev, 0.0, 1.0, Some(0.1)).unwrap();

        assert!(Fits::from_results(vec![normal, lognormal, gev]).is_some());
        assert!(Fits::from_results(vec![lognormal, normal, gev]).is_none());
        assert!(Fits::from_results(vec![normal, lognormal]).is_none());
        assert!(Fits::from_results(Vec::new()).is_none());
    }
}
