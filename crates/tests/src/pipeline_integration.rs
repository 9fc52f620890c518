//! Integration tests for the analysis pipeline
//!
//! These tests run the complete load -> analyze -> render flow on log files
//! shaped like the ones the plugin writes.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vstlog_core::domain::config::{AnalysisConfig, AnalyzerConfig, PlotConfig};
use vstlog_core::domain::plot::{PlotData, PlotError, Visualizer};
use vstlog_core::domain::{load_log_file, AnalysisReport, BypassState, LoadError};
use vstlog_infra::PlottersVisualizer;

/// Build a session log: parameter tweaks, decimated samples, clipping and
/// bypass toggles, framed by the logger's banners
fn session_log() -> String {
    let mut log = String::new();
    log.push_str("=== AMNEZIAGAZE VST Real-Time Log Started ===\n");
    log.push_str("Timestamp,Level,Component,Parameter,Value,Additional_Info\n");

    for i in 0..40u32 {
        let time = format!("21:30:{:02}.{:03}", i / 4, (i % 4) * 250);
        let phase = i as f64 * 0.4;
        writeln!(log, "{},DEBUG,Distortion,input,{:.6},sample_{}", time, 0.5 * phase.sin(), i * 1000).unwrap();
        writeln!(log, "{},DEBUG,Distortion,output,{:.6},sample_{}_drive", time, 0.9 * phase.sin(), i * 1000).unwrap();
        writeln!(log, "{},DEBUG,Reverb,input,{:.6},sample_{}", time, 0.3 * phase.cos(), i * 1000).unwrap();

        if i % 7 == 3 {
            writeln!(log, "{},WARNING,Distortion,clipping,{:.6},clipped_at_threshold_0.950", time, 1.0 + i as f64 / 1000.0).unwrap();
        }
        if i % 9 == 5 {
            writeln!(log, "{},WARNING,Fuzz,clipping,{:.6},clipped_at_threshold_0.950", time, 1.2).unwrap();
        }
        if i % 5 == 0 {
            writeln!(log, "{},INFO,Parameter,drive,{:.6},changed_from_0.500", time, i as f64 / 40.0).unwrap();
        }
        if i % 10 == 1 {
            writeln!(log, "{},INFO,Parameter,mix,0.500000,changed_from_0.250", time).unwrap();
        }
    }

    log.push_str("21:30:10.000,INFO,Chorus,bypassed,1.000000,\n");
    log.push_str("21:30:10.100,INFO,Delay,bypassed,0.000000,\n");
    log.push_str("21:30:10.200,INFO,Delay,bypassed,1.000000,\n");
    log.push_str("21:30:10.300,INFO,Chorus,bypassed,0.000000,\n");
    log.push_str("=== AMNEZIAGAZE VST Log Ended ===\n");
    log
}

fn write_log(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("amneziagaze_realtime_log.txt");
    std::fs::write(&path, contents).unwrap();
    path
}

fn render_text(path: &Path) -> String {
    let records = load_log_file(path).unwrap();
    let report = AnalysisReport::build(&records, &AnalysisConfig::default());

    let mut text = format!("Loaded {} log entries\n", report.summary.entries);
    if let Some(range) = report.summary.time_range() {
        writeln!(text, "Time range: {}", range).unwrap();
    }
    write!(text, "{}", report).unwrap();
    text
}

// ============================================================================
// FULL PIPELINE
// ============================================================================

#[test]
fn test_session_record_count() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), &session_log());

    let records = load_log_file(&path).unwrap();

    // 3 samples per step, 6 + 4 clipping, 8 + 4 parameter changes, 4 bypass
    assert_eq!(records.len(), 40 * 3 + 6 + 4 + 8 + 4 + 4);
}

#[test]
fn test_session_report() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), &session_log());

    let records = load_log_file(&path).unwrap();
    let report = AnalysisReport::build(&records, &AnalysisConfig::default());

    assert_eq!(report.summary.time_range().as_deref(), Some("21:30:00 to 21:30:10"));

    // Clipping
    assert_eq!(report.clipping.total, 10);
    assert_eq!(report.clipping.by_component[0].component, "Distortion");
    assert_eq!(report.clipping.by_component[1].count, 4);
    assert_eq!(report.clipping.worst.len(), 5);
    assert_eq!(report.clipping.worst[0].value, 1.2);
    assert_eq!(report.clipping.worst[0].component, "Fuzz");
    assert_eq!(report.clipping.worst[4].component, "Distortion");
    assert_eq!(report.clipping.worst[4].value, 1.038);
    for pair in report.clipping.worst.windows(2) {
        assert!(pair[0].value >= pair[1].value);
    }

    // Parameters
    assert_eq!(report.parameter_changes.total, 12);
    assert_eq!(report.parameter_changes.most_changed[0].name, "drive");
    assert_eq!(report.parameter_changes.most_changed[1].name, "mix");

    // Levels
    let distortion = &report.audio_levels.components[0];
    assert_eq!(distortion.component, "Distortion");
    let gain = distortion.gain_db.unwrap();
    assert!((gain - 20.0 * (0.9f64 / 0.5).log10()).abs() < 0.01);
    let reverb = &report.audio_levels.components[1];
    assert!(reverb.output.is_none());
    assert!(reverb.gain_db.is_none());

    // Effects
    let states: Vec<(&str, BypassState)> = report
        .effect_states
        .effects
        .iter()
        .map(|e| (e.component.as_str(), e.state))
        .collect();
    assert_eq!(
        states,
        vec![("Chorus", BypassState::Active), ("Delay", BypassState::Bypassed)]
    );
}

#[test]
fn test_report_sections_in_fixed_order() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), &session_log());

    let text = render_text(&path);
    let positions: Vec<usize> = [
        "=== CLIPPING ANALYSIS ===",
        "=== PARAMETER CHANGES ===",
        "=== AUDIO LEVEL ANALYSIS ===",
        "=== EFFECT STATES ===",
    ]
    .iter()
    .map(|header| text.find(header).unwrap())
    .collect();

    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_pipeline_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), &session_log());

    let first = render_text(&path);
    let second = render_text(&path);
    assert_eq!(first, second);

    let records = load_log_file(&path).unwrap();
    let config = AnalysisConfig::default();
    let json_a = AnalysisReport::build(&records, &config).to_json().unwrap();
    let json_b = AnalysisReport::build(&records, &config).to_json().unwrap();
    assert_eq!(json_a, json_b);
}

#[test]
fn test_json_report_shape() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), &session_log());

    let records = load_log_file(&path).unwrap();
    let json = AnalysisReport::build(&records, &AnalysisConfig::default())
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["summary"]["entries"], records.len());
    assert_eq!(value["clipping"]["total"], 10);
    assert_eq!(value["clipping"]["worst"][0]["component"], "Fuzz");
    assert_eq!(value["parameter_changes"]["most_changed"][0]["name"], "drive");
    assert_eq!(value["audio_levels"]["components"][1]["gain_db"], serde_json::Value::Null);
    assert_eq!(value["effect_states"]["effects"][1]["state"], "BYPASSED");
    assert_eq!(value["effect_states"]["effects"][1]["since"], "21:30:10.200");
}

#[test]
fn test_quiet_session_reports_none_found() {
    let dir = TempDir::new().unwrap();
    let path = write_log(
        dir.path(),
        "=== AMNEZIAGAZE VST Real-Time Log Started ===\n\
         Timestamp,Level,Component,Parameter,Value,Additional_Info\n\
         08:00:00.000,DEBUG,Reverb,rms,0.120000,frequency_analysis\n\
         08:00:00.000,DEBUG,Reverb,peak,0.410000,frequency_analysis\n",
    );

    let text = render_text(&path);
    assert!(text.contains("No clipping events detected!"));
    assert!(text.contains("No parameter changes logged"));
    assert!(text.contains("No audio level samples logged"));
    assert!(text.contains("No effect state changes logged"));
}

// ============================================================================
// LOAD FAILURES
// ============================================================================

#[test]
fn test_corrupt_timestamp_rejects_whole_file() {
    let dir = TempDir::new().unwrap();
    let mut log = session_log();
    log.push_str("21:30:1x.000,INFO,Parameter,drive,0.1,\n");
    let path = write_log(dir.path(), &log);

    assert!(matches!(
        load_log_file(&path),
        Err(LoadError::InvalidTimestamp { .. })
    ));
}

#[test]
fn test_empty_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), "");

    assert!(matches!(load_log_file(&path), Err(LoadError::Empty)));
}

// ============================================================================
// PLOTTING
// ============================================================================

#[test]
fn test_plots_from_session() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), &session_log());
    let records = load_log_file(&path).unwrap();

    let config = AnalyzerConfig {
        plots: PlotConfig {
            width: 600,
            height: 300,
            panel_height: 200,
            ..PlotConfig::default()
        },
        ..AnalyzerConfig::default()
    };
    let data = PlotData::from_records(&records, &config.plots);
    assert_eq!(data.parameters.len(), 2);
    assert_eq!(data.clipping.len(), 2);
    assert_eq!(data.levels.len(), 2);

    let output_dir = dir.path().join("vst_analysis_plots");
    let visualizer = PlottersVisualizer::new(config.plots.clone());

    // Plotting is best-effort: either all three images or a backend note
    match visualizer.render(&data, &output_dir) {
        Ok(written) => {
            assert_eq!(written.len(), 3);
            for name in ["parameter_changes.png", "clipping_events.png", "audio_levels.png"] {
                assert!(output_dir.join(name).is_file());
            }
        }
        Err(PlotError::BackendUnavailable(_)) => assert!(output_dir.is_dir()),
        Err(e) => panic!("unexpected plot error: {}", e),
    }
}
