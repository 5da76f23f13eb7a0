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

//! Contains [`Config`], the settings shared by every stage of the pipeline.

use std::path::PathBuf;

/// Settings of a run. Built once and passed by reference to every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The CSV file with the samples.
    pub input_file: PathBuf,
    /// Prefix of the exported graphics; its file name also identifies the run in the report.
    pub output_prefix: PathBuf,
    /// Histogram bin width. Values `<= 0` mean the width is derived from `num_bins`.
    pub bin_width: f64,
    /// Number of bins, used only when `bin_width` is unset.
    pub num_bins: usize,
    /// Line width of the bar outlines and curves.
    pub line_width: f64,
    /// Number of bins between major x ticks. Values `<= 0` leave the ticks to the renderer.
    pub axis_tick_spacing: i32,
    /// Zero-based index of the CSV column holding the samples.
    pub column_index: usize,
    /// Graph title.
    pub title: String,
    /// Label of the x axis.
    pub x_label: String,
    /// Show only values within this many standard deviations of the fitted normal mean.
    /// `0` disables trimming. Only the display is affected, never the fits.
    pub trim_factor: f64,
    /// Clamp the left end of the x axis to zero.
    pub positive_only: bool,
    /// Export the graph.
    pub save: bool,
    /// Export into `<dir>/<ext>/<name>.<ext>` instead of `<prefix>.<ext>`.
    pub subfolder_by_extension: bool,
    /// Show the graph interactively.
    pub show_graph: bool,
    /// Print the report in human readable form instead of a single CSV row.
    pub formatted_output: bool,
}

impl Config {
    /// The default number of histogram bins.
    pub const DEFAULT_NUM_BINS: usize = 100;

    /// The run identifier printed in the report: the file name of `output_prefix`.
    #[must_use]
    pub fn output_name(&self) -> String {
        self.output_prefix
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            output_prefix: PathBuf::from("results"),
            bin_width: -1.0,
            num_bins: Self::DEFAULT_NUM_BINS,
            line_width: 0.25,
            axis_tick_spacing: -1,
            column_index: 1,
            title: "Probability distributions".to_owned(),
            x_label: "Values".to_owned(),
            trim_factor: 0.0,
            positive_only: false,
            save: true,
            subfolder_by_extension: false,
            show_graph: false,
            formatted_output: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_is_the_file_name_of_the_prefix() {
        let config = Config {
            output_prefix: PathBuf::from("out/run-3/errors"),
            ..Config::default()
        };
        assert_eq!(config.output_name(), "errors");
        assert_eq!(Config::default().output_name(), "results");
    }
}
