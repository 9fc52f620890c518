//! Metric extraction over a loaded log
//!
//! Four independent read-only passes over the record table:
//! - clipping events per component and the worst offenders
//! - parameter change frequency
//! - RMS, peak and gain of the decimated input/output samples
//! - final bypass state of each effect
//!
//! Every pass works on the filtered subset defined by the matching
//! `LogRecord` predicate, so the visualizer sees exactly the same data.

use super::config::AnalysisConfig;
use super::record::LogRecord;
use chrono::NaiveTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, instrument};

/// Record count and covered time span of a log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSummary {
    pub entries: usize,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl LogSummary {
    /// Earliest and latest timestamp, not the first and last row
    pub fn from_records(records: &[LogRecord]) -> Self {
        Self {
            entries: records.len(),
            start: records.iter().map(|r| r.timestamp).min(),
            end: records.iter().map(|r| r.timestamp).max(),
        }
    }
}

/// Number of events attributed to one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentCount {
    pub component: String,
    pub count: usize,
}

/// A single clipping warning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClippingEvent {
    pub timestamp: NaiveTime,
    pub component: String,
    pub value: f64,
}

impl From<&LogRecord> for ClippingEvent {
    fn from(record: &LogRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            component: record.component.clone(),
            value: record.value,
        }
    }
}

/// Clipping analysis result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClippingReport {
    pub total: usize,
    /// Sorted by component name
    pub by_component: Vec<ComponentCount>,
    /// Highest values first, ties in file order
    pub worst: Vec<ClippingEvent>,
}

impl ClippingReport {
    pub fn analyze(records: &[LogRecord], worst_count: usize) -> Self {
        let events: Vec<&LogRecord> = records.iter().filter(|r| r.is_clipping()).collect();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for event in &events {
            *counts.entry(event.component.as_str()).or_default() += 1;
        }

        let by_component = counts
            .into_iter()
            .map(|(component, count)| ComponentCount {
                component: component.to_string(),
                count,
            })
            .collect();

        Self {
            total: events.len(),
            by_component,
            worst: worst_events(&events, worst_count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// The `count` largest values, descending. The sort is stable so equal
/// values keep their file order.
fn worst_events(events: &[&LogRecord], count: usize) -> Vec<ClippingEvent> {
    let mut ranked = events.to_vec();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.into_iter().take(count).map(ClippingEvent::from).collect()
}

/// How often one parameter was changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterCount {
    pub name: String,
    pub count: usize,
}

/// Parameter change analysis result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterChangeReport {
    pub total: usize,
    /// Descending count, ties by name
    pub most_changed: Vec<ParameterCount>,
}

impl ParameterChangeReport {
    pub fn analyze(records: &[LogRecord], top: usize) -> Self {
        let mut total = 0;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records.iter().filter(|r| r.is_parameter_change()) {
            total += 1;
            *counts.entry(record.parameter.as_str()).or_default() += 1;
        }

        let mut most_changed: Vec<ParameterCount> = counts
            .into_iter()
            .map(|(name, count)| ParameterCount {
                name: name.to_string(),
                count,
            })
            .collect();
        most_changed.sort_by(|a, b| b.count.cmp(&a.count));
        most_changed.truncate(top);

        Self {
            total,
            most_changed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// RMS and peak of one sample set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalStats {
    pub samples: usize,
    pub rms: f64,
    pub peak: f64,
}

impl SignalStats {
    /// `None` for an empty sample set
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut samples = 0usize;
        let mut sum_squares = 0.0;
        let mut peak = 0.0_f64;

        for value in values {
            samples += 1;
            sum_squares += value * value;
            peak = peak.max(value.abs());
        }

        if samples == 0 {
            return None;
        }

        Some(Self {
            samples,
            rms: (sum_squares / samples as f64).sqrt(),
            peak,
        })
    }

    /// Level change from `input` to `self` in dB, undefined for a silent input
    pub fn gain_db_from(&self, input: &SignalStats) -> Option<f64> {
        if input.rms > 0.0 {
            Some(20.0 * (self.rms / input.rms).log10())
        } else {
            None
        }
    }
}

/// Signal levels measured at one processing stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentLevels {
    pub component: String,
    pub input: Option<SignalStats>,
    pub output: Option<SignalStats>,
    pub gain_db: Option<f64>,
}

/// Audio level analysis result, components in order of first appearance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioLevelReport {
    pub components: Vec<ComponentLevels>,
}

#[derive(Default)]
struct SampleSets {
    input: Vec<f64>,
    output: Vec<f64>,
}

impl AudioLevelReport {
    pub fn analyze(records: &[LogRecord]) -> Self {
        let mut order: Vec<&str> = Vec::new();
        let mut sets: HashMap<&str, SampleSets> = HashMap::new();

        for record in records.iter().filter(|r| r.is_audio_sample()) {
            let set = sets.entry(record.component.as_str()).or_insert_with(|| {
                order.push(record.component.as_str());
                SampleSets::default()
            });

            if record.is_input_sample() {
                set.input.push(record.value);
            } else {
                set.output.push(record.value);
            }
        }

        let components = order
            .into_iter()
            .map(|component| {
                let set = &sets[component];
                let input = SignalStats::from_values(set.input.iter().copied());
                let output = SignalStats::from_values(set.output.iter().copied());
                let gain_db = match (&input, &output) {
                    (Some(input), Some(output)) => output.gain_db_from(input),
                    _ => None,
                };

                ComponentLevels {
                    component: component.to_string(),
                    input,
                    output,
                    gain_db,
                }
            })
            .collect();

        Self { components }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Whether an effect processes audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BypassState {
    Active,
    Bypassed,
}

impl BypassState {
    pub fn from_value(value: f64, threshold: f64) -> Self {
        if value > threshold {
            BypassState::Bypassed
        } else {
            BypassState::Active
        }
    }
}

impl fmt::Display for BypassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassState::Active => f.write_str("ACTIVE"),
            BypassState::Bypassed => f.write_str("BYPASSED"),
        }
    }
}

/// Final state of one effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectState {
    pub component: String,
    pub state: BypassState,
    /// Time of the record that decided the state
    pub since: NaiveTime,
    /// Number of state records seen for the component
    pub updates: usize,
}

/// Effect state analysis result, components in order of first appearance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectStateReport {
    pub effects: Vec<EffectState>,
}

impl EffectStateReport {
    pub fn analyze(records: &[LogRecord], threshold: f64) -> Self {
        let mut effects: Vec<EffectState> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for record in records.iter().filter(|r| r.is_bypass_state()) {
            let state = BypassState::from_value(record.value, threshold);

            match index.get(record.component.as_str()) {
                Some(&i) => {
                    // Last record in file order wins
                    let effect = &mut effects[i];
                    effect.state = state;
                    effect.since = record.timestamp;
                    effect.updates += 1;
                }
                None => {
                    index.insert(record.component.as_str(), effects.len());
                    effects.push(EffectState {
                        component: record.component.clone(),
                        state,
                        since: record.timestamp,
                        updates: 1,
                    });
                }
            }
        }

        Self { effects }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Combined result of all analyzers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: LogSummary,
    pub clipping: ClippingReport,
    pub parameter_changes: ParameterChangeReport,
    pub audio_levels: AudioLevelReport,
    pub effect_states: EffectStateReport,
}

impl AnalysisReport {
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build(records: &[LogRecord], config: &AnalysisConfig) -> Self {
        let report = Self {
            summary: LogSummary::from_records(records),
            clipping: ClippingReport::analyze(records, config.worst_clipping_events),
            parameter_changes: ParameterChangeReport::analyze(records, config.top_parameters),
            audio_levels: AudioLevelReport::analyze(records),
            effect_states: EffectStateReport::analyze(records, config.bypass_threshold),
        };

        debug!(
            clipping = report.clipping.total,
            parameter_changes = report.parameter_changes.total,
            audio_components = report.audio_levels.components.len(),
            effects = report.effect_states.effects.len(),
            "Analysis finished"
        );

        report
    }
}
