//! plotters-based chart renderer

use super::fonts::{ensure_font, FONT_FAMILY};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use vstlog_core::domain::config::PlotConfig;
use vstlog_core::domain::plot::{
    LevelPanel, PlotData, PlotError, Result, Series, Visualizer, AUDIO_LEVELS_FILE,
    CLIPPING_EVENTS_FILE, PARAMETER_CHANGES_FILE,
};

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn render_error<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}

/// Renders the three analysis charts as PNG files
#[derive(Debug, Clone)]
pub struct PlottersVisualizer {
    config: PlotConfig,
}

impl PlottersVisualizer {
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    fn draw_parameter_changes(&self, path: &Path, series: &[Series]) -> Result<()> {
        let root = BitMapBackend::new(path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        draw_time_chart(
            &root,
            "Parameter Changes Over Time",
            "Parameter Value",
            series,
            |chart, index, series| {
                let color = Palette99::pick(index).to_rgba();
                chart
                    .draw_series(LineSeries::new(
                        series.points.iter().copied(),
                        color.stroke_width(2),
                    ))
                    .map_err(render_error)?
                    .label(series.name.as_str())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|&point| Circle::new(point, 3, color.filled())),
                    )
                    .map_err(render_error)?;
                Ok(())
            },
        )?;

        root.present().map_err(render_error)
    }

    fn draw_clipping_events(&self, path: &Path, series: &[Series]) -> Result<()> {
        let root = BitMapBackend::new(path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        draw_time_chart(
            &root,
            "Clipping Events Over Time",
            "Clipping Level",
            series,
            |chart, index, series| {
                let color = Palette99::pick(index).mix(0.7);
                chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|&point| Circle::new(point, 4, color.filled())),
                    )
                    .map_err(render_error)?
                    .label(series.name.as_str())
                    .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
                Ok(())
            },
        )?;

        root.present().map_err(render_error)
    }

    fn draw_audio_levels(&self, path: &Path, panels: &[LevelPanel]) -> Result<()> {
        let height = self.config.panel_height * panels.len() as u32;
        let root = BitMapBackend::new(path, (self.config.width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let areas = root.split_evenly((panels.len(), 1));
        let last = panels.len() - 1;

        for (i, (area, panel)) in areas.iter().zip(panels).enumerate() {
            let (x_range, y_range) = bounds(panel.input.iter().chain(panel.output.iter()));

            let mut chart = ChartBuilder::on(area)
                .caption(format!("{} Audio Levels", panel.component), (FONT_FAMILY, 24))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(70)
                .build_cartesian_2d(x_range, y_range)
                .map_err(render_error)?;

            let mut mesh = chart.configure_mesh();
            mesh.y_desc("Amplitude").x_label_formatter(&format_clock);
            if i == last {
                mesh.x_desc("Time");
            }
            mesh.draw().map_err(render_error)?;

            let sides = [
                ("Input", &panel.input, BLUE.mix(0.7)),
                ("Output", &panel.output, RED.mix(0.7)),
            ];
            for (label, points, color) in sides {
                if points.is_empty() {
                    continue;
                }
                chart
                    .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(1)))
                    .map_err(render_error)?
                    .label(label)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
            }

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(render_error)?;
        }

        root.present().map_err(render_error)
    }
}

/// Single time-axis chart with a legend; `draw` adds one series
fn draw_time_chart<F>(
    root: &Area<'_>,
    title: &str,
    y_desc: &str,
    series: &[Series],
    mut draw: F,
) -> Result<()>
where
    F: FnMut(
        &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        usize,
        &Series,
    ) -> Result<()>,
{
    let (x_range, y_range) = bounds(series.iter().flat_map(|s| s.points.iter()));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT_FAMILY, 32))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc(y_desc)
        .x_label_formatter(&format_clock)
        .draw()
        .map_err(render_error)?;

    for (index, s) in series.iter().enumerate() {
        draw(&mut chart, index, s)?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_error)
}

/// Axis ranges covering all finite points, padded so flat data stays visible
pub fn bounds<'a, I>(points: I) -> (Range<f64>, Range<f64>)
where
    I: Iterator<Item = &'a (f64, f64)>,
{
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);

    for &(px, py) in points {
        if px.is_finite() && py.is_finite() {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
    }

    (pad(x, 0.02), pad(y, 0.05))
}

fn pad((min, max): (f64, f64), ratio: f64) -> Range<f64> {
    if min > max {
        return 0.0..1.0;
    }

    let span = max - min;
    if span == 0.0 {
        return (min - 1.0)..(max + 1.0);
    }

    (min - span * ratio)..(max + span * ratio)
}

/// Seconds since midnight as `HH:MM:SS`
pub fn format_clock(seconds: &f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        (total / 3600) % 24,
        (total / 60) % 60,
        total % 60
    )
}

impl Visualizer for PlottersVisualizer {
    #[instrument(skip(self, data))]
    fn render(&self, data: &PlotData, output_dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)?;

        if data.is_empty() {
            debug!("No plottable data");
            return Ok(Vec::new());
        }

        ensure_font(self.config.font_path.as_deref())?;

        let mut written = Vec::new();

        if !data.parameters.is_empty() {
            let path = output_dir.join(PARAMETER_CHANGES_FILE);
            self.draw_parameter_changes(&path, &data.parameters)?;
            debug!(path = %path.display(), "Chart written");
            written.push(path);
        }

        if !data.clipping.is_empty() {
            let path = output_dir.join(CLIPPING_EVENTS_FILE);
            self.draw_clipping_events(&path, &data.clipping)?;
            debug!(path = %path.display(), "Chart written");
            written.push(path);
        }

        if !data.levels.is_empty() {
            let path = output_dir.join(AUDIO_LEVELS_FILE);
            self.draw_audio_levels(&path, &data.levels)?;
            debug!(path = %path.display(), "Chart written");
            written.push(path);
        }

        info!(count = written.len(), dir = %output_dir.display(), "Plots written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_data() -> PlotData {
        PlotData {
            parameters: vec![Series {
                name: "drive".to_string(),
                points: vec![(36_000.0, 0.2), (36_001.0, 0.8)],
            }],
            clipping: vec![Series {
                name: "Fuzz".to_string(),
                points: vec![(36_002.0, 1.3)],
            }],
            levels: vec![
                LevelPanel {
                    component: "Reverb".to_string(),
                    input: vec![(36_000.0, 0.1), (36_001.0, -0.2)],
                    output: vec![(36_000.0, 0.2), (36_001.0, -0.4)],
                },
                LevelPanel {
                    component: "Delay".to_string(),
                    input: vec![(36_003.0, 0.3)],
                    output: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_bounds() {
        let points = [(10.0, -1.0), (20.0, 1.0)];
        let (x, y) = bounds(points.iter());
        assert!(x.start < 10.0 && x.end > 20.0);
        assert!(y.start < -1.0 && y.end > 1.0);

        // Single point gets a non-empty range
        let (x, y) = bounds([(5.0, 0.5)].iter());
        assert_eq!(x, 4.0..6.0);
        assert_eq!(y, -0.5..1.5);

        // No finite data
        let (x, _) = bounds([(f64::NAN, 1.0)].iter());
        assert_eq!(x, 0.0..1.0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(&0.0), "00:00:00");
        assert_eq!(format_clock(&36_061.4), "10:01:01");
        assert_eq!(format_clock(&86_399.0), "23:59:59");
    }

    #[test]
    fn test_empty_data_only_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested").join("plots");

        let visualizer = PlottersVisualizer::new(PlotConfig::default());
        let written = visualizer.render(&PlotData::default(), &output_dir).unwrap();

        assert!(written.is_empty());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_render_writes_images_or_reports_missing_backend() {
        let temp_dir = TempDir::new().unwrap();
        let config = PlotConfig {
            width: 400,
            height: 300,
            panel_height: 150,
            ..PlotConfig::default()
        };

        let visualizer = PlottersVisualizer::new(config);
        match visualizer.render(&sample_data(), temp_dir.path()) {
            Ok(written) => {
                assert_eq!(written.len(), 3);
                assert!(written.iter().all(|p| p.is_file()));
                assert!(written[0].ends_with(PARAMETER_CHANGES_FILE));
                assert!(written[2].ends_with(AUDIO_LEVELS_FILE));
            }
            // Hosts without any usable font
            Err(PlotError::BackendUnavailable(_)) => {}
            Err(e) => panic!("unexpected plot error: {}", e),
        }
    }

    #[test]
    fn test_failed_chart_keeps_earlier_images() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the clipping image would be saved
        std::fs::create_dir(temp_dir.path().join(CLIPPING_EVENTS_FILE)).unwrap();

        let config = PlotConfig {
            width: 400,
            height: 300,
            panel_height: 150,
            ..PlotConfig::default()
        };

        let visualizer = PlottersVisualizer::new(config);
        match visualizer.render(&sample_data(), temp_dir.path()) {
            Err(PlotError::Render(_)) => {
                assert!(temp_dir.path().join(PARAMETER_CHANGES_FILE).is_file());
                assert!(!temp_dir.path().join(AUDIO_LEVELS_FILE).exists());
            }
            Err(PlotError::BackendUnavailable(_)) => {}
            other => panic!("expected a render error, got {:?}", other),
        }
    }
}
