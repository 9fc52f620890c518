//! Human-readable and JSON rendering of analysis results
//!
//! Text output is a pure function of the report, so rendering the same log
//! twice produces identical bytes.

use super::analysis::{
    AnalysisReport, AudioLevelReport, ClippingReport, ComponentLevels, EffectStateReport,
    LogSummary, ParameterChangeReport, SignalStats,
};
use std::fmt;

/// Millisecond precision, truncated
const EVENT_TIME_FORMAT: &str = "%H:%M:%S%.3f";
const RANGE_TIME_FORMAT: &str = "%H:%M:%S";

impl LogSummary {
    /// `HH:MM:SS to HH:MM:SS`, `None` for an empty log
    pub fn time_range(&self) -> Option<String> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(format!(
                "{} to {}",
                start.format(RANGE_TIME_FORMAT),
                end.format(RANGE_TIME_FORMAT)
            )),
            _ => None,
        }
    }
}

impl fmt::Display for ClippingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== CLIPPING ANALYSIS ===")?;
        if self.is_empty() {
            return writeln!(f, "No clipping events detected!");
        }

        writeln!(f, "Total clipping events: {}", self.total)?;

        writeln!(f)?;
        writeln!(f, "Clipping events by component:")?;
        for entry in &self.by_component {
            writeln!(f, "  {}: {} events", entry.component, entry.count)?;
        }

        writeln!(f)?;
        writeln!(f, "Worst clipping events:")?;
        for event in &self.worst {
            writeln!(
                f,
                "  {} - {}: {:.3}",
                event.timestamp.format(EVENT_TIME_FORMAT),
                event.component,
                event.value
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for ParameterChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PARAMETER CHANGES ===")?;
        if self.is_empty() {
            return writeln!(f, "No parameter changes logged");
        }

        writeln!(f, "Total parameter changes: {}", self.total)?;

        writeln!(f)?;
        writeln!(f, "Most changed parameters:")?;
        for parameter in &self.most_changed {
            writeln!(f, "  {}: {} changes", parameter.name, parameter.count)?;
        }

        Ok(())
    }
}

fn write_stats(f: &mut fmt::Formatter<'_>, label: &str, stats: &SignalStats) -> fmt::Result {
    writeln!(
        f,
        "  {:<6} - RMS: {:.4}, Peak: {:.4}",
        label, stats.rms, stats.peak
    )
}

impl fmt::Display for ComponentLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.component)?;
        if let Some(input) = &self.input {
            write_stats(f, "Input", input)?;
        }
        if let Some(output) = &self.output {
            write_stats(f, "Output", output)?;
        }
        if let Some(gain) = self.gain_db {
            writeln!(f, "  Gain: {:.2} dB", gain)?;
        }
        Ok(())
    }
}

impl fmt::Display for AudioLevelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== AUDIO LEVEL ANALYSIS ===")?;
        if self.is_empty() {
            return writeln!(f, "No audio level samples logged");
        }

        for component in &self.components {
            writeln!(f)?;
            write!(f, "{}", component)?;
        }

        Ok(())
    }
}

impl fmt::Display for EffectStateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EFFECT STATES ===")?;
        if self.is_empty() {
            return writeln!(f, "No effect state changes logged");
        }

        for effect in &self.effects {
            writeln!(f, "  {}: {}", effect.component, effect.state)?;
        }

        Ok(())
    }
}

/// All four sections in fixed order, each preceded by a blank line
impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        write!(f, "{}", self.clipping)?;
        writeln!(f)?;
        write!(f, "{}", self.parameter_changes)?;
        writeln!(f)?;
        write!(f, "{}", self.audio_levels)?;
        writeln!(f)?;
        write!(f, "{}", self.effect_states)
    }
}

impl AnalysisReport {
    /// Pretty-printed JSON of the full report
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
