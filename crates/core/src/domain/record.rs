//! Log record model
//!
//! One `LogRecord` per data line of the plugin log. Records are parsed once
//! by the loader and never mutated afterwards.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known parameter and component names written by the plugin logger
pub mod params {
    /// Parameter of clipping warnings
    pub const CLIPPING: &str = "clipping";
    /// Parameter of pre-processing audio samples
    pub const INPUT: &str = "input";
    /// Parameter of post-processing audio samples
    pub const OUTPUT: &str = "output";
    /// Parameter of effect bypass state records (0 = active, 1 = bypassed)
    pub const BYPASSED: &str = "bypassed";
    /// Component name used for parameter change records
    pub const PARAMETER_COMPONENT: &str = "Parameter";
}

/// Severity tag of a log record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    /// Any tag the logger does not define, kept verbatim
    Other(String),
}

impl LogLevel {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARNING" => LogLevel::Warning,
            "ERROR" => LogLevel::Error,
            other => LogLevel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Other(tag) => tag,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: NaiveTime,
    pub level: LogLevel,
    pub component: String,
    pub parameter: String,
    pub value: f64,
    pub additional_info: String,
}

impl LogRecord {
    /// Clipping warning emitted by a processing stage
    pub fn is_clipping(&self) -> bool {
        self.parameter == params::CLIPPING
    }

    /// User or host initiated parameter change
    pub fn is_parameter_change(&self) -> bool {
        self.level == LogLevel::Info && self.component == params::PARAMETER_COMPONENT
    }

    /// Decimated input or output audio sample
    pub fn is_audio_sample(&self) -> bool {
        self.is_input_sample() || self.is_output_sample()
    }

    pub fn is_input_sample(&self) -> bool {
        self.parameter == params::INPUT
    }

    pub fn is_output_sample(&self) -> bool {
        self.parameter == params::OUTPUT
    }

    /// Effect bypass state record
    pub fn is_bypass_state(&self) -> bool {
        self.parameter == params::BYPASSED
    }

    /// Timestamp as fractional seconds since midnight
    pub fn seconds(&self) -> f64 {
        time_to_seconds(self.timestamp)
    }
}

/// Convert a time of day into fractional seconds since midnight
pub fn time_to_seconds(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) + f64::from(time.nanosecond()) / 1e9
}
