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

//! Fits distributions to a column of a CSV file, prints their parameters and saves the graph.
#![deny(clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use histfit::config::Config;
use histfit::dataset::Dataset;
use histfit::plot::{self, EXPORT_EXTENSION};

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from(Cli::parse());
    let dataset = Dataset::load_csv(&config.input_file, config.column_index)
        .with_context(|| format!("failed to load {}", config.input_file.display()))?;
    log::info!(
        "loaded {} samples in [{}, {}]",
        dataset.len(),
        dataset.min(),
        dataset.max()
    );

    let analysis = histfit::analyze(&dataset, &config).context("failed to fit distributions")?;
    let name = config.output_name();
    println!("{}", analysis.report(&name, config.formatted_output));

    if config.save || config.show_graph {
        let path = plot::export_path(
            &config.output_prefix,
            config.subfolder_by_extension,
            EXPORT_EXTENSION,
        );
        analysis
            .plot_model(&config)
            .render_svg(&path)
            .with_context(|| format!("failed to save the graph to {}", path.display()))?;
        if config.show_graph {
            log::warn!(
                "interactive display is not supported; the graph was saved to {}",
                path.display()
            );
        }
    }
    Ok(())
}
