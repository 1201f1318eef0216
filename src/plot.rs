use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::tuner::classifier::{Stability, StabilityReport};
use crate::tuner::coordinator::StabilityRenderer;

/// Plots the continuous closed-loop eigenvalues on the complex plane,
/// rewriting an SVG file on every report.
pub struct EigenvalueMap {
    path: PathBuf,
    size: (u32, u32),
    frames: usize,
}

impl EigenvalueMap {
    pub fn new(path: impl Into<PathBuf>) -> EigenvalueMap {
        EigenvalueMap {
            path: path.into(),
            size: (800, 600),
            frames: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of reports drawn successfully.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn draw(&self, report: &StabilityReport) -> Result<(), Box<dyn std::error::Error>> {
        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let (re_range, im_range) = plot_bounds(report);
        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Closed-loop eigenvalues: {:?}", report.verdict),
                ("sans-serif", 20),
            )
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(re_range.clone(), im_range.clone())?;

        chart.configure_mesh().x_desc("Re").y_desc("Im").draw()?;

        // Stability boundary
        chart.draw_series(LineSeries::new(
            vec![(0.0, im_range.start), (0.0, im_range.end)],
            &BLACK,
        ))?;

        let color = match report.verdict {
            Stability::Stable => BLUE,
            _ => RED,
        };
        chart.draw_series(
            report
                .eigenvalues
                .iter()
                .map(|lambda| Cross::new((lambda.re, lambda.im), 6, color.stroke_width(2))),
        )?;

        root.present()?;
        Ok(())
    }
}

impl StabilityRenderer for EigenvalueMap {
    fn render(&mut self, report: &StabilityReport) {
        match self.draw(report) {
            Ok(()) => self.frames += 1,
            Err(err) => log::error!("failed to draw {}: {err}", self.path.display()),
        }
    }
}

fn padded(min: f64, max: f64) -> std::ops::Range<f64> {
    let span = (max - min).max(max.abs()).max(min.abs()).max(1.0);
    (min - 0.1 * span)..(max + 0.1 * span)
}

/// Axis ranges that always contain the imaginary axis.
fn plot_bounds(report: &StabilityReport) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let (mut re_min, mut re_max, mut im_min, mut im_max) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for lambda in &report.eigenvalues {
        re_min = re_min.min(lambda.re);
        re_max = re_max.max(lambda.re);
        im_min = im_min.min(lambda.im);
        im_max = im_max.max(lambda.im);
    }
    (padded(re_min, re_max), padded(im_min, im_max))
}

/// Line plot of a sampled response, one point per sample.
pub fn draw_response(
    path: impl AsRef<Path>,
    caption: &str,
    response: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = response.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_y = response.iter().cloned().fold(f64::INFINITY, f64::min);
    let y_range = if response.is_empty() {
        padded(0.0, 0.0)
    } else {
        padded(min_y, max_y)
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0..response.len().max(1) as i32, y_range)?;

    chart.configure_mesh().draw()?;

    let series: Vec<(i32, f64)> = response
        .iter()
        .enumerate()
        .map(|(i, &val)| (i as i32, val))
        .collect();

    chart.draw_series(LineSeries::new(series, &BLUE))?;

    root.present()?;
    Ok(())
}
