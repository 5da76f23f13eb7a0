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

//! Contains [`BinSpec`], which describes how a [`Dataset`] is split into histogram bins, and
//! [`Histogram`], the normalized bin heights.

use thiserror::Error;

use crate::config::Config;
use crate::dataset::Dataset;

/// The bin width could not be derived.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("degenerate bin width {width}: the bin width must be finite and positive")]
pub struct BinningError {
    /// The rejected width.
    pub width: f64,
}

/// The layout of the histogram bins.
///
/// `min` and `max` are integer multiples of `width`, and `count` is the number of bins between
/// them (at least 1). A `BinSpec` is only built by [`BinSpec::new`] and [`BinSpec::with_width`],
/// which uphold this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSpec {
    width: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl BinSpec {
    /// Derives the bins for `dataset`.
    ///
    /// The width is `config.bin_width` when it is positive, otherwise the data range divided by
    /// `config.num_bins`. The range is then widened outwards to multiples of the width.
    ///
    /// # Errors
    /// Returns [`BinningError`] when the width is zero, negative or not finite, e.g. for a
    /// constant dataset without an explicit bin width.
    pub fn new(dataset: &Dataset, config: &Config) -> Result<Self, BinningError> {
        #[allow(clippy::cast_precision_loss)]
        let width = if config.bin_width > 0.0 {
            config.bin_width
        } else {
            (dataset.max() - dataset.min()) / config.num_bins as f64
        };
        Self::with_width(dataset.min(), dataset.max(), width)
    }

    /// Aligns `[lo, hi]` to multiples of `width`.
    ///
    /// # Errors
    /// Returns [`BinningError`] when `width` is not finite and positive.
    pub fn with_width(lo: f64, hi: f64, width: f64) -> Result<Self, BinningError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(BinningError { width });
        }
        let min = (lo / width).floor() * width;
        let max = (hi / width).ceil() * width;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = (((max - min) / width).round() as usize).max(1);
        log::debug!("bin width {width}, {count} bins over [{min}, {max}]");
        Ok(Self {
            width,
            count,
            min,
            max,
        })
    }

    /// Width of every bin.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Number of bins, at least 1.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Left edge of the first bin.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Right edge of the last bin.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Left edge of bin `index`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn left_edge(&self, index: usize) -> f64 {
        self.min + index as f64 * self.width
    }

    /// Center of bin `index`.
    #[must_use]
    pub fn center(&self, index: usize) -> f64 {
        self.left_edge(index) + self.width * 0.5
    }

    /// The bin that `x` falls into. Values on the right edge belong to the last bin.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn index_of(&self, x: f64) -> usize {
        let position = ((x - self.min) / self.width).floor().max(0.0) as usize;
        position.min(self.count - 1)
    }
}

/// The bin with the highest normalized height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalBin {
    /// Index of the bin.
    pub index: usize,
    /// Center of the bin, used as the location seed for fitting.
    pub center: f64,
    /// Normalized height of the bin.
    pub height: f64,
}

/// A histogram normalized to a probability density: the bar areas sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    spec: BinSpec,
    heights: Vec<f64>,
    modal: ModalBin,
}

impl Histogram {
    /// Counts the samples of `dataset` into the bins of `spec`.
    #[must_use]
    pub fn new(dataset: &Dataset, spec: BinSpec) -> Self {
        let mut counts = vec![0_usize; spec.count];
        for &x in dataset.samples() {
            counts[spec.index_of(x)] += 1;
        }
        #[allow(clippy::cast_precision_loss)]
        let norm = dataset.len() as f64 * spec.width;
        #[allow(clippy::cast_precision_loss)]
        let heights: Vec<f64> = counts.iter().map(|&c| c as f64 / norm).collect();

        // The first bin wins ties.
        let mut modal = ModalBin {
            index: 0,
            center: spec.center(0),
            height: heights[0],
        };
        for (index, &height) in heights.iter().enumerate().skip(1) {
            if height > modal.height {
                modal = ModalBin {
                    index,
                    center: spec.center(index),
                    height,
                };
            }
        }
        log::debug!(
            "modal bin {} centered at {} with height {}",
            modal.index,
            modal.center,
            modal.height
        );
        Self {
            spec,
            heights,
            modal,
        }
    }

    /// The bin layout.
    #[must_use]
    pub fn spec(&self) -> &BinSpec {
        &self.spec
    }

    /// Normalized height of every bin, in order.
    #[must_use]
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// The highest bin.
    #[must_use]
    pub fn modal_bin(&self) -> ModalBin {
        self.modal
    }
}
