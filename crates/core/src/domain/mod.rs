//! Domain entities and analysis rules

pub mod record;
pub mod loader;
pub mod analysis;
pub mod report;
pub mod config;
pub mod plot;

// Re-export specific items to avoid ambiguous glob imports
pub use analysis::{
    AnalysisReport, AudioLevelReport, BypassState, ClippingEvent, ClippingReport,
    ComponentCount, ComponentLevels, EffectState, EffectStateReport, LogSummary,
    ParameterChangeReport, ParameterCount, SignalStats,
};
pub use config::{AnalysisConfig, AnalyzerConfig, ConfigError, ConfigManager, PlotConfig};
pub use loader::{load_log_file, parse_log, LoadError};
pub use plot::{LevelPanel, PlotData, PlotError, Series, Visualizer};
pub use record::{params, LogLevel, LogRecord};
