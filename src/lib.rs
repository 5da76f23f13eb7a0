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

//! Fitting of parametric distributions to a one-dimensional sample.
//!
//! Histfit bins a sample into a normalized histogram, fits the Normal, Log-Normal and Generalized
//! Extreme Value distributions to it by maximum likelihood and derives the axis ranges of a graph
//! that overlays the fitted densities on the histogram. The fitted parameters are reported as
//! text, either human readable or as a single CSV row.
//!
//! The stages are:
//! 1. [`binning::BinSpec`] derives the bin width and the bin-aligned range of the data, and
//!    [`binning::Histogram`] counts the samples and finds the modal bin.
//! 2. [`fitting::Fits`] fits every [`distribution::Family`] in order, seeding the location with
//!    the center of the modal bin.
//! 3. [`axis::DisplayRange`] computes the visible range.
//! 4. [`report::Report`] formats the parameters and [`plot::PlotModel`] draws the graph.
//!
//! [`analyze`] runs the first three stages.
//!
//! # Examples
//!
//! Let's fit the distributions to a sample drawn from the normal distribution with mean 10 and
//! standard deviation 2.
//! ```
//! use rand::SeedableRng;
//! use rand_distr::{Distribution, Normal};
//! use histfit::config::Config;
//! use histfit::dataset::Dataset;
//! use histfit::distribution::Family;
//!
//! let distr = Normal::new(10.0, 2.0).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let samples: Vec<f64> = (0..5000).map(|_| distr.sample(&mut rng)).collect();
//! let dataset = Dataset::from_samples(samples).unwrap();
//!
//! // By default the range of the data is split into 100 bins.
//! let analysis = histfit::analyze(&dataset, &Config::default()).unwrap();
//!
//! let normal = analysis.fits.normal();
//! assert!((normal.location() - 10.0).abs() < 0.1);
//! assert!((normal.scale() - 2.0).abs() < 0.1);
//!
//! // The fits are always in the same order.
//! let families: Vec<Family> = analysis.fits.results().iter().map(|fit| fit.family()).collect();
//! assert_eq!(families, Family::ALL);
//!
//! // The top of the graph is just above the highest bar.
//! let modal = analysis.histogram.modal_bin();
//! assert_eq!(analysis.display.ymax, 1.15 * modal.height);
//!
//! println!("{}", analysis.report("normal", true));
//! ```
//! The report has a block for each family:
//! ```text
//! - Distribution fitting for file normal
//!   - Estimated parameters for Normal distribution:
//!     -> Location: 10.0...
//!     ->    Scale: 1.9...
//!   - Estimated parameters for Log Normal distribution:
//!   ...
//! ```
#![deny(clippy::pedantic)]
#![deny(missing_docs)]

use thiserror::Error;

pub mod axis;
pub mod binning;
pub mod config;
pub mod dataset;
pub mod distribution;
pub mod fitting;
mod optimize;
pub mod plot;
pub mod report;

use axis::DisplayRange;
use binning::{BinSpec, BinningError, Histogram};
use config::Config;
use dataset::{Dataset, InputError};
use fitting::{FitError, Fits};
use plot::{PlotModel, RenderError};
use report::Report;

/// Any error of the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The samples could not be loaded.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The bin width could not be derived.
    #[error(transparent)]
    Binning(#[from] BinningError),
    /// A distribution could not be fitted.
    #[error(transparent)]
    Fit(#[from] FitError),
    /// The graph could not be exported.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The results of the numeric stages of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// The normalized histogram of the sample.
    pub histogram: Histogram,
    /// The fitted distributions, in the order of [`distribution::Family::ALL`].
    pub fits: Fits,
    /// The visible range of the graph.
    pub display: DisplayRange,
}

impl Analysis {
    /// The report of the fitted parameters, identified by `name`.
    #[must_use]
    pub fn report<'a>(&'a self, name: &'a str, formatted: bool) -> Report<'a> {
        Report::new(name, self.fits.results(), formatted)
    }

    /// The drawing data of the graph.
    #[must_use]
    pub fn plot_model(&self, config: &Config) -> PlotModel {
        PlotModel::new(&self.histogram, &self.fits, self.display, config)
    }
}

/// Bins `dataset`, fits every distribution family to it and computes the display range.
///
/// # Errors
/// Returns [`Error::Binning`] if no bin width can be derived (a constant sample without an
/// explicit `config.bin_width`) and [`Error::Fit`] if any family cannot be fitted.
pub fn analyze(dataset: &Dataset, config: &Config) -> Result<Analysis, Error> {
    let spec = BinSpec::new(dataset, config)?;
    let histogram = Histogram::new(dataset, spec);
    let modal = histogram.modal_bin();
    log::debug!("modal bin {modal:?}");

    let fits = Fits::new(dataset, modal.center)?;
    let display = DisplayRange::new(&histogram, &fits, config);
    Ok(Analysis {
        histogram,
        fits,
        display,
    })
}
