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

//! Contains [`DisplayRange`], the visible part of the histogram plot.

use crate::binning::Histogram;
use crate::config::Config;
use crate::fitting::Fits;
use crate::plot;

/// Headroom above the modal bin.
const Y_HEADROOM: f64 = 1.15;

/// The visible axis ranges of the plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    /// Left end of the x axis.
    pub xmin: f64,
    /// Right end of the x axis.
    pub xmax: f64,
    /// Bottom of the y axis.
    pub ymin: f64,
    /// Top of the y axis.
    pub ymax: f64,
}

impl DisplayRange {
    /// Computes the visible range.
    ///
    /// The x range starts as the binned data range. If `config.trim_factor` is positive it is
    /// narrowed to `trim_factor` standard deviations around the mean of the normal fit, aligned
    /// outwards to the bin width, and `config.positive_only` clamps its left end to zero.
    /// A degenerate range is widened by one on each side.
    ///
    /// The top of the y axis is always 1.15 times the modal bin height, whatever the trimming.
    #[must_use]
    pub fn new(histogram: &Histogram, fits: &Fits, config: &Config) -> Self {
        let spec = histogram.spec();
        let (mut xmin, mut xmax) = (spec.min(), spec.max());

        let normal = fits.normal();
        let (mean, std_dev) = (normal.location(), normal.scale());
        if config.trim_factor > 0.0 && std_dev.abs() > 0.0 {
            let spread = config.trim_factor * std_dev;
            xmin = ((mean - spread).max(spec.min()) / spec.width()).floor() * spec.width();
            xmax = ((mean + spread).min(spec.max()) / spec.width()).ceil() * spec.width();
        }
        if config.positive_only {
            (xmin, xmax) = clamp_to_positive(xmin, xmax);
        }
        let (xmin, xmax) = widen_degenerate(xmin, xmax);

        let (ymin, _) = widen_degenerate(0.0, tight_ymax(histogram, fits));
        // The trimmed x range does not feed into the y range: the top always follows the
        // modal bin.
        let ymax = histogram.modal_bin().height * Y_HEADROOM;

        let range = Self {
            xmin,
            xmax,
            ymin,
            ymax,
        };
        log::debug!("display range {range:?}");
        range
    }
}

/// The highest point of the bars and the fitted curves.
fn tight_ymax(histogram: &Histogram, fits: &Fits) -> f64 {
    let bars = histogram.heights().iter().copied();
    let curves = fits
        .results()
        .iter()
        .flat_map(|fit| plot::curve_points(fit, histogram.spec()))
        .map(|(_, y)| y);
    bars.chain(curves)
        .filter(|y| y.is_finite())
        .fold(0.0, f64::max)
}

/// Raises `xmin` to zero. `xmax` is left alone, even when it is negative.
fn clamp_to_positive(xmin: f64, xmax: f64) -> (f64, f64) {
    let xmin = xmin.max(0.0);
    if xmin > xmax {
        log::warn!("showing only positive values leaves nothing of [.., {xmax}] visible");
    }
    (xmin, xmax)
}

/// Widens an empty or inverted range to one unit on each side of `lo`.
fn widen_degenerate(lo: f64, hi: f64) -> (f64, f64) {
    if lo >= hi {
        (lo - 1.0, lo + 1.0)
    } else {
        (lo, hi)
    }
}
