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

//! Writes a CSV file of random samples, suitable as input of `histfit`.
//!
//! The file has the header `index,value` and the samples in the `value` column, which is the
//! default data column of `histfit`.
#![deny(clippy::pedantic)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Gumbel, LogNormal, Normal};

/// The distribution the samples are drawn from.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Family {
    /// Normal with mean `location` and standard deviation `scale`.
    Normal,
    /// `location + exp(N(ln(scale), shape))`.
    Lognormal,
    /// Gumbel with mode `location` and scale `scale`.
    Gumbel,
}

/// Generates random samples into a CSV file.
#[derive(Debug, Parser)]
#[command(name = "generate_sample", version, about)]
struct Args {
    /// Output CSV file.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Distribution to sample from.
    #[arg(long, value_enum, default_value = "normal")]
    distribution: Family,

    /// Number of samples.
    #[arg(long, default_value_t = 10_000)]
    count: usize,

    /// Location parameter.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    location: f64,

    /// Scale parameter.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Shape parameter of the log-normal distribution.
    #[arg(long, default_value_t = 0.5)]
    shape: f64,

    /// Seed of the random generator; random if not given.
    #[arg(long)]
    seed: Option<u64>,
}

fn sample(args: &Args, rng: &mut StdRng) -> Result<Vec<f64>> {
    let samples = match args.distribution {
        Family::Normal => {
            let distr = Normal::new(args.location, args.scale)
                .context("invalid normal distribution parameters")?;
            distr.sample_iter(rng).take(args.count).collect()
        }
        Family::Lognormal => {
            let distr = LogNormal::new(args.scale.ln(), args.shape)
                .context("invalid log-normal distribution parameters")?;
            distr
                .sample_iter(rng)
                .take(args.count)
                .map(|x| args.location + x)
                .collect()
        }
        Family::Gumbel => {
            let distr = Gumbel::new(args.location, args.scale)
                .context("invalid Gumbel distribution parameters")?;
            distr.sample_iter(rng).take(args.count).collect()
        }
    };
    Ok(samples)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let samples = sample(&args, &mut rng)?;

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    writer.write_record(["index", "value"])?;
    for (index, value) in samples.iter().enumerate() {
        writer.write_record([index.to_string(), value.to_string()])?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!(
        "wrote {} {:?} samples to {}",
        samples.len(),
        args.distribution,
        args.output.display()
    );
    Ok(())
}
