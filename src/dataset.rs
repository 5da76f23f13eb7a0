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

//! Contains the [`Dataset`] struct and the CSV loader producing it.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced while loading a [`Dataset`].
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be opened or a record could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The offending file.
        path: PathBuf,
        /// The underlying CSV or I/O error.
        #[source]
        source: csv::Error,
    },

    /// A record has fewer fields than the selected column requires.
    #[error("line {line}: column {column} is out of range ({fields} fields)")]
    ColumnOutOfRange {
        /// 1-based line number in the file.
        line: u64,
        /// The selected column.
        column: usize,
        /// Number of fields on the line.
        fields: usize,
    },

    /// A field of the selected column is not a finite number.
    #[error("line {line}: '{value}' is not a finite number")]
    NotANumber {
        /// 1-based line number, or the 1-based position for in-memory samples.
        line: u64,
        /// The text of the field.
        value: String,
    },

    /// No samples were found.
    #[error("the dataset contains no samples")]
    Empty,
}

/// An immutable one-dimensional sample.
///
/// A `Dataset` is never empty and contains only finite values, so its extrema always exist.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Box<[f64]>,
    min: f64,
    max: f64,
}

impl Dataset {
    /// Builds a dataset from in-memory samples.
    ///
    /// # Errors
    /// Returns [`InputError::Empty`] if `samples` is empty and [`InputError::NotANumber`] if any
    /// of them is NaN or infinite.
    pub fn from_samples(samples: Vec<f64>) -> Result<Self, InputError> {
        if let Some(pos) = samples.iter().position(|x| !x.is_finite()) {
            return Err(InputError::NotANumber {
                line: pos as u64 + 1,
                value: samples[pos].to_string(),
            });
        }
        let min = samples.iter().copied().reduce(f64::min).ok_or(InputError::Empty)?;
        let max = samples.iter().copied().reduce(f64::max).ok_or(InputError::Empty)?;
        Ok(Self {
            samples: samples.into_boxed_slice(),
            min,
            max,
        })
    }

    /// Loads column `column` (zero-based) of a comma-separated file. The first row is a header
    /// and is skipped.
    ///
    /// # Errors
    /// Returns an [`InputError`] if the file cannot be read, a record is too short, a field is not
    /// a finite number or there are no data rows.
    pub fn load_csv(path: &Path, column: usize) -> Result<Self, InputError> {
        let read_error = |source| InputError::Read {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(read_error)?;

        let mut samples = Vec::new();
        for record in reader.records() {
            let record = record.map_err(read_error)?;
            let line = record.position().map_or(0, csv::Position::line);
            let field = record.get(column).ok_or(InputError::ColumnOutOfRange {
                line,
                column,
                fields: record.len(),
            })?;
            let value = field
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| InputError::NotANumber {
                    line,
                    value: field.to_owned(),
                })?;
            samples.push(value);
        }
        log::debug!("loaded {} samples from {}", samples.len(), path.display());
        Self::from_samples(samples)
    }

    /// The samples in their original order.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of samples. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; present for symmetry with [`Dataset::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The smallest sample.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// The largest sample.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn loads_selected_column_and_skips_header() {
        let file = create_temp_csv("time,error\n0, 1.5\n1,-2\n2,3e1\n");
        let dataset = Dataset::load_csv(file.path(), 1).unwrap();

        assert_eq!(dataset.samples(), &[1.5, -2.0, 30.0]);
        assert_eq!(dataset.min(), -2.0);
        assert_eq!(dataset.max(), 30.0);
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn short_record_reports_line() {
        let file = create_temp_csv("a,b\n1,2\n3\n");
        let err = Dataset::load_csv(file.path(), 1).unwrap_err();

        assert!(matches!(
            err,
            InputError::ColumnOutOfRange { line: 3, column: 1, fields: 1 }
        ));
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let file = create_temp_csv("a,b\n1,2\n3,abc\n");
        let err = Dataset::load_csv(file.path(), 1).unwrap_err();

        match err {
            InputError::NotANumber { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn header_only_file_is_empty() {
        let file = create_temp_csv("a,b\n");
        assert!(matches!(
            Dataset::load_csv(file.path(), 0),
            Err(InputError::Empty)
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Dataset::load_csv(Path::new("/nonexistent/histfit.csv"), 0).unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }

    #[test]
    fn in_memory_samples_must_be_finite() {
        assert!(matches!(
            Dataset::from_samples(vec![1.0, f64::NAN]),
            Err(InputError::NotANumber { line: 2, .. })
        ));
        assert!(matches!(
            Dataset::from_samples(Vec::new()),
            Err(InputError::Empty)
        ));
    }
}
