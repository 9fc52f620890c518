//! Plot data preparation and the renderer abstraction
//!
//! The series are cut from the same record subsets the analyzers use. The
//! actual drawing lives in the `infra` crate behind the `Visualizer` trait.

use super::config::PlotConfig;
use super::record::LogRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

/// File names of the generated images
pub const PARAMETER_CHANGES_FILE: &str = "parameter_changes.png";
pub const CLIPPING_EVENTS_FILE: &str = "clipping_events.png";
pub const AUDIO_LEVELS_FILE: &str = "audio_levels.png";

/// Errors that can occur while rendering plots. None of them are fatal to
/// the analysis run.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The renderer cannot draw on this host (e.g. no usable font)
    #[error("Plotting backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Render error: {0}")]
    Render(String),
}

/// Named sequence of (seconds since midnight, value) points
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            points: Vec::new(),
        }
    }
}

/// Input and output amplitude of one component
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPanel {
    pub component: String,
    pub input: Vec<(f64, f64)>,
    pub output: Vec<(f64, f64)>,
}

/// Everything the three charts need
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlotData {
    /// Parameter values over time, at most `max_parameter_series` parameters
    pub parameters: Vec<Series>,
    /// Clipping values over time, one series per component
    pub clipping: Vec<Series>,
    /// One panel per component with audio samples
    pub levels: Vec<LevelPanel>,
}

impl PlotData {
    pub fn from_records(records: &[LogRecord], config: &PlotConfig) -> Self {
        let parameters = group_series(
            records.iter().filter(|r| r.is_parameter_change()),
            |r| r.parameter.as_str(),
            Some(config.max_parameter_series),
        );

        let clipping = group_series(
            records.iter().filter(|r| r.is_clipping()),
            |r| r.component.as_str(),
            None,
        );

        let mut levels: Vec<LevelPanel> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for record in records.iter().filter(|r| r.is_audio_sample()) {
            let i = *index.entry(record.component.as_str()).or_insert_with(|| {
                levels.push(LevelPanel {
                    component: record.component.clone(),
                    input: Vec::new(),
                    output: Vec::new(),
                });
                levels.len() - 1
            });

            let point = (record.seconds(), record.value);
            if record.is_input_sample() {
                levels[i].input.push(point);
            } else {
                levels[i].output.push(point);
            }
        }

        Self {
            parameters,
            clipping,
            levels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.clipping.is_empty() && self.levels.is_empty()
    }
}

/// Group records into series by key, keys in order of first appearance.
/// Records whose key would exceed `limit` distinct series are dropped.
fn group_series<'a, I, K>(records: I, key: K, limit: Option<usize>) -> Vec<Series>
where
    I: Iterator<Item = &'a LogRecord>,
    K: Fn(&'a LogRecord) -> &'a str,
{
    let mut series: Vec<Series> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let name = key(record);
        let i = match index.get(name) {
            Some(&i) => i,
            None => {
                if limit.is_some_and(|max| series.len() >= max) {
                    continue;
                }
                index.insert(name, series.len());
                series.push(Series::new(name));
                series.len() - 1
            }
        };
        series[i].points.push((record.seconds(), record.value));
    }

    series
}

/// Renders `PlotData` into image files
pub trait Visualizer {
    /// Write the charts into `output_dir`, creating it if needed.
    /// Returns the paths of the images written; a chart without data is
    /// skipped.
    fn render(&self, data: &PlotData, output_dir: &Path) -> Result<Vec<PathBuf>>;
}
