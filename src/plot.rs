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

//! Contains [`PlotModel`], everything needed to draw the histogram with the fitted curves, and
//! its SVG renderer.
//!
//! The model is independent of the drawing library: bars, sampled curves, labels and the visible
//! range are plain data. [`PlotModel::render_svg`] draws it with `plotters`.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

use crate::axis::DisplayRange;
use crate::binning::{BinSpec, Histogram};
use crate::config::Config;
use crate::distribution::{Family, FitResult};
use crate::fitting::Fits;

/// Number of points at which every curve is sampled.
pub const CURVE_POINTS: usize = 2000;

/// The extension of the exported graphics.
pub const EXPORT_EXTENSION: &str = "svg";

/// Size of the exported image in pixels.
const IMAGE_SIZE: (u32, u32) = (1920, 1080);

/// Number of major x ticks the renderer aims for when no spacing is set.
const AUTO_X_TICKS: usize = 10;

/// Above this many bins in view the minor grid is left out.
const MAX_MINOR_TICKS: usize = 1000;

const BAR_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Curve colors, in the order of [`Family::ALL`].
const CURVE_COLORS: [RGBColor; 3] = [RED, GREEN, BLUE];

const Y_LABEL: &str = "Histogram bin count percentage [0..1] | Probability distribution function value";

/// The graph could not be exported.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output directory could not be created.
    #[error("failed to create the directory of {path}: {source}")]
    CreateDir {
        /// The file being exported.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Drawing or writing the image failed.
    #[error("failed to draw {path}: {message}")]
    Draw {
        /// The file being exported.
        path: PathBuf,
        /// The error reported by the drawing backend.
        message: String,
    },
}

/// Samples the density of `fit` at [`CURVE_POINTS`] evenly spaced points over the binned range.
#[must_use]
pub fn curve_points(fit: &FitResult, spec: &BinSpec) -> Vec<(f64, f64)> {
    #[allow(clippy::cast_precision_loss)]
    let step = (spec.max() - spec.min()) / (CURVE_POINTS - 1) as f64;
    (0..CURVE_POINTS)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let x = spec.min() + i as f64 * step;
            (x, fit.density(x))
        })
        .collect()
}

/// The legend label of a fitted curve.
#[must_use]
pub fn curve_label(fit: &FitResult) -> String {
    let mut label = format!(
        "{} distribution: location={}, scale={}",
        fit.family(),
        fit.location(),
        fit.scale()
    );
    if let Some(shape) = fit.shape() {
        label.push_str(&format!(", shape={shape}"));
    }
    label
}

/// The path a graph with extension `extension` is exported to.
///
/// Without `subfolder_by_extension` this is `<prefix>.<extension>`; with it the file goes into a
/// subdirectory named after the extension, next to the prefix:
/// `<dir>/<extension>/<name>.<extension>`.
#[must_use]
pub fn export_path(prefix: &Path, subfolder_by_extension: bool, extension: &str) -> PathBuf {
    let mut name: OsString = if subfolder_by_extension {
        prefix.file_name().map(ToOwned::to_owned).unwrap_or_default()
    } else {
        prefix.as_os_str().to_owned()
    };
    name.push(".");
    name.push(extension);

    if subfolder_by_extension {
        let dir = prefix.parent().unwrap_or_else(|| Path::new(""));
        dir.join(extension).join(name)
    } else {
        PathBuf::from(name)
    }
}

/// The multiples of `step` within `[lo, hi]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn multiples(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0 && lo <= hi) {
        return Vec::new();
    }
    let (first, last) = ((lo / step).ceil() as i64, (hi / step).floor() as i64);
    (first..=last).map(|k| k as f64 * step).collect()
}

/// A bar of the histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Left edge.
    pub left: f64,
    /// Right edge.
    pub right: f64,
    /// Normalized height.
    pub height: f64,
}

/// The sampled density of one fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    /// The fitted family.
    pub family: Family,
    /// The legend label.
    pub label: String,
    /// `(x, density)` pairs in increasing `x`.
    pub points: Vec<(f64, f64)>,
}

/// Everything that is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotModel {
    /// Graph title.
    pub title: String,
    /// Label of the x axis.
    pub x_label: String,
    /// Label of the y axis.
    pub y_label: String,
    /// The histogram bars.
    pub bars: Vec<Bar>,
    /// One curve per fit, in the order of [`Family::ALL`].
    pub curves: Vec<Curve>,
    /// The visible range.
    pub range: DisplayRange,
    /// Width of the bins; the y tick labels also show the bar heights times this width.
    pub bin_width: f64,
    /// Line width of the curves and bar outlines.
    pub line_width: f64,
    /// Number of bins between major x ticks, if set.
    pub bins_per_tick: Option<u32>,
}

impl PlotModel {
    /// Collects the drawing data of a run.
    #[must_use]
    pub fn new(histogram: &Histogram, fits: &Fits, range: DisplayRange, config: &Config) -> Self {
        let spec = histogram.spec();
        let bars = histogram
            .heights()
            .iter()
            .enumerate()
            .map(|(i, &height)| Bar {
                left: spec.left_edge(i),
                right: spec.left_edge(i + 1),
                height,
            })
            .collect();
        let curves = fits
            .results()
            .iter()
            .map(|fit| Curve {
                family: fit.family(),
                label: curve_label(fit),
                points: curve_points(fit, spec),
            })
            .collect();
        Self {
            title: config.title.clone(),
            x_label: config.x_label.clone(),
            y_label: Y_LABEL.to_owned(),
            bars,
            curves,
            range,
            bin_width: spec.width(),
            line_width: config.line_width,
            bins_per_tick: u32::try_from(config.axis_tick_spacing)
                .ok()
                .filter(|&n| n > 0),
        }
    }

    /// Positions of the major x ticks: every `bins_per_tick` bin widths if set, otherwise the
    /// renderer's own choice.
    fn x_major_ticks(&self) -> Vec<f64> {
        let DisplayRange { xmin, xmax, .. } = self.range;
        match self.bins_per_tick {
            Some(bins) => multiples(xmin, xmax, self.bin_width * f64::from(bins)),
            None => RangedCoordf64::from(xmin..xmax).key_points(AUTO_X_TICKS),
        }
    }

    /// Positions of the minor x grid lines: one per bin edge, unless there are too many to draw.
    fn x_minor_ticks(&self) -> Vec<f64> {
        let ticks = multiples(self.range.xmin, self.range.xmax, self.bin_width);
        if ticks.len() > MAX_MINOR_TICKS {
            Vec::new()
        } else {
            ticks
        }
    }

    /// Renders the plot into an SVG file at `path`, creating its directory if needed.
    ///
    /// # Errors
    /// Returns [`RenderError`] if the directory cannot be created or the file cannot be written.
    pub fn render_svg(&self, path: &Path) -> Result<(), RenderError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| RenderError::CreateDir {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let root = SVGBackend::new(path, IMAGE_SIZE).into_drawing_area();
        self.draw(&root).map_err(|err| RenderError::Draw {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        log::info!("saved graph to {}", path.display());
        Ok(())
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let DisplayRange {
            xmin,
            xmax,
            ymin,
            ymax,
        } = self.range;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stroke = (self.line_width.ceil() as u32).max(1);

        root.fill(&WHITE)?;
        let x_axis = (xmin..xmax)
            .with_key_points(self.x_major_ticks())
            .with_light_points(self.x_minor_ticks());
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 32))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(110)
            .build_cartesian_2d(x_axis, ymin..ymax)?;

        let bin_width = self.bin_width;
        let y_formatter = |v: &f64| format!("{:4.2} | {:4.2}", v * bin_width, v);
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .y_label_formatter(&y_formatter);
        mesh.draw()?;

        // Only what lies inside the visible range is drawn.
        let visible_bars = self
            .bars
            .iter()
            .filter(|bar| bar.right > xmin && bar.left < xmax)
            .map(|bar| {
                [
                    (bar.left.max(xmin), 0.0_f64.max(ymin)),
                    (bar.right.min(xmax), bar.height.min(ymax)),
                ]
            })
            .collect::<Vec<_>>();
        chart.draw_series(
            visible_bars
                .iter()
                .map(|&corners| Rectangle::new(corners, BAR_COLOR.filled())),
        )?;
        chart.draw_series(
            visible_bars
                .iter()
                .map(|&corners| Rectangle::new(corners, BLACK.stroke_width(stroke))),
        )?;

        for curve in &self.curves {
            let style = CURVE_COLORS[curve.family.index()].stroke_width(stroke);
            let points = curve
                .points
                .iter()
                .filter(|(x, y)| y.is_finite() && (xmin..=xmax).contains(x))
                .map(|&(x, y)| (x, y.min(ymax)));
            chart
                .draw_series(LineSeries::new(points, style))?
                .label(curve.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.75))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn model(config: &Config) -> PlotModel {
        let dataset = Dataset::from_samples(vec![0.2, 0.4, 0.6, 1.1, 1.3, 2.7]).unwrap();
        let spec = BinSpec::with_width(dataset.min(), dataset.max(), 0.5).unwrap();
        let histogram = Histogram::new(&dataset, spec);
        let fits = Fits::from_results(vec![
            FitResult::new(Family::Normal, 1.0, 0.8, None).unwrap(),
            FitResult::new(Family::LogNormal, -2.0, 3.0, Some(0.25)).unwrap(),
            FitResult::new(Family::Gev, 0.8, 0.7, Some(0.1)).unwrap(),
        ])
        .unwrap();
        let range = DisplayRange::new(&histogram, &fits, config);
        PlotModel::new(&histogram, &fits, range, config)
    }

    #[test]
    fn export_path_appends_extension() {
        assert_eq!(
            export_path(Path::new("out/run.v2"), false, "svg"),
            PathBuf::from("out/run.v2.svg")
        );
        assert_eq!(
            export_path(Path::new("results"), false, "svg"),
            PathBuf::from("results.svg")
        );
    }

    #[test]
    fn export_path_uses_extension_subfolder() {
        assert_eq!(
            export_path(Path::new("out/errors"), true, "svg"),
            PathBuf::from("out/svg/errors.svg")
        );
        assert_eq!(
            export_path(Path::new("errors"), true, "pdf"),
            PathBuf::from("pdf/errors.pdf")
        );
    }

    #[test]
    fn curves_cover_the_binned_range() {
        let fit = FitResult::new(Family::Normal, 0.0, 1.0, None).unwrap();
        let spec = BinSpec::with_width(-2.0, 3.0, 0.5).unwrap();
        let points = curve_points(&fit, &spec);

        assert_eq!(points.len(), CURVE_POINTS);
        assert_eq!(points[0].0, -2.0);
        assert!((points[CURVE_POINTS - 1].0 - 3.0).abs() < 1e-12);
    }

    #[test]
    fn labels_list_parameters() {
        let normal = FitResult::new(Family::Normal, 1.5, 0.25, None).unwrap();
        assert_eq!(
            curve_label(&normal),
            "Normal distribution: location=1.5, scale=0.25"
        );
        let gev = FitResult::new(Family::Gev, 1.0, 2.0, Some(-0.5)).unwrap();
        assert_eq!(
            curve_label(&gev),
            "Generalized Extreme Value distribution: location=1, scale=2, shape=-0.5"
        );
    }

    #[test]
    fn model_follows_family_order_and_bins() {
        let config = Config {
            axis_tick_spacing: 2,
            ..Config::default()
        };
        let model = model(&config);

        let families: Vec<Family> = model.curves.iter().map(|c| c.family).collect();
        assert_eq!(families, Family::ALL.to_vec());
        assert_eq!(model.bars.len(), 6);
        assert_eq!(model.bars[0].left, 0.0);
        assert_eq!(model.bars[5].right, 3.0);
        assert_eq!(model.bins_per_tick, Some(2));
        // [0, 3] with a major tick every 2 bins and a minor one at every bin edge.
        assert_eq!(model.x_major_ticks(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(
            model.x_minor_ticks(),
            vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]
        );
    }

    #[test]
    fn automatic_ticks_when_spacing_unset() {
        let model = model(&Config::default());
        assert_eq!(model.bins_per_tick, None);
        let ticks = model.x_major_ticks();
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|x| (0.0..=3.0).contains(x)));
        assert_eq!(model.x_minor_ticks().len(), 7);
    }

    #[test]
    fn major_ticks_are_exact_multiples() {
        assert_eq!(multiples(-1.2, 2.5, 0.75), vec![-0.75, 0.0, 0.75, 1.5, 2.25]);
        assert_eq!(multiples(0.1, 0.2, 0.5), Vec::<f64>::new());
        assert_eq!(multiples(0.0, 1.0, 0.0), Vec::<f64>::new());
    }

    #[test]
    fn renders_svg_into_subfolder() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_path(&dir.path().join("errors"), true, EXPORT_EXTENSION);
        model(&Config::default()).render_svg(&path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Probability distributions"));
        assert!(path.ends_with("svg/errors.svg"));
    }
}
