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

//! Contains [`Report`], the textual summary of the fits.

use std::fmt;

use crate::distribution::FitResult;

/// The fitted parameters of a run, formatted by its [`fmt::Display`] implementation.
///
/// In human readable form every family gets a block:
/// ```text
/// - Distribution fitting for file results
///   - Estimated parameters for Normal distribution:
///     -> Location: 10.02
///     ->    Scale: 1.98
/// ```
/// Otherwise the report is a single comma separated row: the name followed by the location, scale
/// and (if present) shape of every fit.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    name: &'a str,
    fits: &'a [FitResult],
    formatted: bool,
}

impl<'a> Report<'a> {
    /// A report of `fits` for the run `name`.
    #[must_use]
    pub fn new(name: &'a str, fits: &'a [FitResult], formatted: bool) -> Self {
        Self {
            name,
            fits,
            formatted,
        }
    }

    fn fmt_formatted(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- Distribution fitting for file {}", self.name)?;
        for fit in self.fits {
            write!(
                f,
                "\n  - Estimated parameters for {} distribution:",
                fit.family()
            )?;
            write!(f, "\n    -> Location: {}", fit.location())?;
            write!(f, "\n    ->    Scale: {}", fit.scale())?;
            if let Some(shape) = fit.shape() {
                write!(f, "\n    ->    Shape: {shape}")?;
            }
        }
        Ok(())
    }

    fn fmt_row(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        for value in self.fits.iter().flat_map(FitResult::parameters) {
            write!(f, ",{value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.formatted {
            self.fmt_formatted(f)
        } else {
            self.fmt_row(f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Family;

    fn fits() -> Vec<FitResult> {
        vec![
            FitResult::new(Family::Normal, 10.012_345_678_9, 1.987_654_321, None).unwrap(),
            FitResult::new(Family::LogNormal, -85.25, 95.125, Some(0.020_833_333_333_333_332))
                .unwrap(),
            FitResult::new(Family::Gev, 9.25, 2.0, Some(0.274_591_234_567_8)).unwrap(),
        ]
    }

    #[test]
    fn formatted_report() {
        let fits = fits();
        let report = Report::new("errors", &fits, true).to_string();
        let expected = "\
- Distribution fitting for file errors
  - Estimated parameters for Normal distribution:
    -> Location: 10.0123456789
    ->    Scale: 1.987654321
  - Estimated parameters for Log Normal distribution:
    -> Location: -85.25
    ->    Scale: 95.125
    ->    Shape: 0.020833333333333332
  - Estimated parameters for Generalized Extreme Value distribution:
    -> Location: 9.25
    ->    Scale: 2
    ->    Shape: 0.2745912345678";
        assert_eq!(report, expected);
    }

    #[test]
    fn row_report() {
        let fits = fits();
        let report = Report::new("errors", &fits, false).to_string();
        assert_eq!(
            report,
            "errors,10.0123456789,1.987654321,-85.25,95.125,0.020833333333333332,9.25,2,0.2745912345678"
        );
    }

    #[test]
    fn row_round_trips_through_formatted_values() {
        let fits = fits();
        let row = Report::new("run", &fits, false).to_string();
        let formatted = Report::new("run", &fits, true).to_string();

        let from_row: Vec<f64> = row
            .split(',')
            .skip(1)
            .map(|v| v.parse().unwrap())
            .collect();
        let from_blocks: Vec<f64> = formatted
            .lines()
            .filter_map(|line| line.split_once("-> "))
            .map(|(_, rest)| rest.split_once(": ").unwrap().1.parse().unwrap())
            .collect();

        assert_eq!(from_row.len(), 2 + 3 + 3);
        assert_eq!(from_row, from_blocks);
        let expected: Vec<f64> = fits.iter().flat_map(FitResult::parameters).collect();
        assert_eq!(from_row, expected);
    }
}
