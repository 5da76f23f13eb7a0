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

//! Command line arguments of the `histfit` binary.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use histfit::config::Config;

/// Fits Normal, Log-Normal and Generalized Extreme Value distributions to a column of a CSV file
/// and plots them over its histogram.
#[derive(Debug, Parser)]
#[command(name = "histfit", version, about)]
pub struct Cli {
    /// CSV input file.
    #[arg(short = 'i', value_name = "INPUT_FILE")]
    pub input_file: PathBuf,

    /// Output file name prefix; also identifies the run in the report.
    #[arg(short = 'o', value_name = "OUTPUT_FILE_NAME", default_value = "results")]
    pub output_prefix: PathBuf,

    /// Histogram bin width. If <= 0, the number of bins given with -n is used.
    #[arg(short = 'b', value_name = "BIN_WIDTH", default_value_t = -1.0, allow_negative_numbers = true)]
    pub bin_width: f64,

    /// Number of bins (only used if -b is <= 0).
    #[arg(short = 'n', value_name = "NUMBER_OF_BINS", default_value_t = Config::DEFAULT_NUM_BINS)]
    pub num_bins: usize,

    /// Plot line width.
    #[arg(short = 'w', value_name = "PLOT_LINE_WIDTH", default_value_t = 0.25)]
    pub line_width: f64,

    /// How many bins fit between major x axis ticks. If <= 0, the ticks are chosen automatically.
    #[arg(short = 'a', value_name = "AXIS_TICKER_WIDTH", default_value_t = -1, allow_negative_numbers = true)]
    pub axis_tick_spacing: i32,

    /// CSV data column to use (zero-based).
    #[arg(short = 'c', value_name = "FILE_COLUMN", default_value_t = 1)]
    pub column_index: usize,

    /// Graph title.
    #[arg(short = 't', value_name = "GRAPH_TITLE", default_value = "Probability distributions")]
    pub title: String,

    /// Graph x axis label.
    #[arg(short = 'x', value_name = "GRAPH_X_AXIS_LABEL", default_value = "Values")]
    pub x_label: String,

    /// Show only values within this many standard deviations of the mean. 0 shows everything.
    #[arg(short = 'g', value_name = "GRAPH_STD_DEV_VALUES", default_value_t = 0.0)]
    pub trim_factor: f64,

    /// Only show positive values on the x axis.
    #[arg(short = 'r', value_name = "DISPLAY_POSITIVE_VALUES_ONLY", default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub positive_only: bool,

    /// Save the graph using the prefix given with -o.
    #[arg(short = 's', value_name = "SAVE_GRAPH", default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    pub save: bool,

    /// Save the graph into a subfolder named after the file extension.
    #[arg(short = 'q', value_name = "ADD_FILE_EXTENSION_TO_PATH", default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub subfolder_by_extension: bool,

    /// Show the graph.
    #[arg(short = 'd', value_name = "DISPLAY_GRAPH", default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub show_graph: bool,

    /// Print the report in readable form, or as a single CSV row if false.
    #[arg(short = 'f', value_name = "FORMATTED_OUTPUT", default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    pub formatted_output: bool,
}

/// `yes`, `true`, `t` and `1` (in any case) are true, everything else is false.
fn parse_flag(value: &str) -> Result<bool, Infallible> {
    Ok(matches!(
        value.to_ascii_lowercase().as_str(),
        "yes" | "true" | "t" | "1"
    ))
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            input_file: cli.input_file,
            output_prefix: cli.output_prefix,
            bin_width: cli.bin_width,
            num_bins: cli.num_bins,
            line_width: cli.line_width,
            axis_tick_spacing: cli.axis_tick_spacing,
            column_index: cli.column_index,
            title: cli.title,
            x_label: cli.x_label,
            trim_factor: cli.trim_factor,
            positive_only: cli.positive_only,
            save: cli.save,
            subfolder_by_extension: cli.subfolder_by_extension,
            show_graph: cli.show_graph,
            formatted_output: cli.formatted_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_config() {
        let cli = Cli::try_parse_from(["histfit", "-i", "data.csv"]).unwrap();
        let config = Config::from(cli);
        assert_eq!(
            config,
            Config {
                input_file: PathBuf::from("data.csv"),
                ..Config::default()
            }
        );
    }

    #[test]
    fn flags_are_parsed_leniently() {
        for (value, expected) in [
            ("yes", true),
            ("True", true),
            ("t", true),
            ("1", true),
            ("no", false),
            ("0", false),
            ("y", false),
        ] {
            let cli = Cli::try_parse_from(["histfit", "-i", "a.csv", "-r", value]).unwrap();
            assert_eq!(cli.positive_only, expected, "{value}");
        }
    }

    #[test]
    fn every_option_is_mapped() {
        let cli = Cli::try_parse_from([
            "histfit", "-i", "in.csv", "-o", "out/errors", "-b", "0.5", "-n", "40", "-w", "1.5",
            "-a", "4", "-c", "0", "-t", "Errors", "-x", "mm", "-g", "3", "-r", "yes", "-s", "no",
            "-q", "1", "-d", "t", "-f", "false",
        ])
        .unwrap();
        let config = Config::from(cli);
        assert_eq!(config.output_prefix, PathBuf::from("out/errors"));
        assert_eq!(config.bin_width, 0.5);
        assert_eq!(config.num_bins, 40);
        assert_eq!(config.line_width, 1.5);
        assert_eq!(config.axis_tick_spacing, 4);
        assert_eq!(config.column_index, 0);
        assert_eq!(config.title, "Errors");
        assert_eq!(config.x_label, "mm");
        assert_eq!(config.trim_factor, 3.0);
        assert!(config.positive_only);
        assert!(!config.save);
        assert!(config.subfolder_by_extension);
        assert!(config.show_graph);
        assert!(!config.formatted_output);
    }

    #[test]
    fn negative_bin_width_is_accepted() {
        let cli = Cli::try_parse_from(["histfit", "-i", "a.csv", "-b", "-1", "-a", "-1"]).unwrap();
        assert_eq!(cli.bin_width, -1.0);
        assert_eq!(cli.axis_tick_spacing, -1);
    }

    #[test]
    fn input_file_is_required() {
        assert!(Cli::try_parse_from(["histfit"]).is_err());
    }
}
