//! End-to-end harness tests over real files.
//!
//! Builds ground-truth and raw-data fixtures in a temp directory, runs the
//! harness with registered recognizers, and checks the combined report.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use segeval::{
    report, EventCode, FixedRecognizer, Harness, Interval, Recognizer, RecognizerRegistry,
};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn iv(t1: i64, t2: i64, label: &str) -> Interval {
    Interval::new(ts(t1), ts(t2), label)
}

/// Truth file: one walking event over the first minute of 1970, with the
/// evaluation range covering the first two minutes.
fn write_truth(dir: &std::path::Path, data_pattern: &str) -> PathBuf {
    let truth = serde_json::json!({
        "title": "fixture",
        "labels": [
            {"t1": "1970-01-01T00:00:00Z", "t2": "1970-01-01T00:01:00Z", "label": "WALKING"},
            {"t1": "1970-01-01T00:01:30Z", "t2": "1970-01-01T00:02:00Z", "label": "RUNNING"}
        ],
        "data_path": data_pattern,
        "t1": "1970-01-01T00:00:00Z",
        "t2": "1970-01-01T00:02:00Z"
    });
    let path = dir.join("truth.json");
    fs::write(&path, serde_json::to_string(&truth).unwrap()).unwrap();
    path
}

#[test]
fn test_replay_recognizer_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let data_pattern = dir.path().join("data-*.json");

    // Raw data: stored detections the replay recognizer will ingest.
    let detections = vec![iv(0, 60, "WALKING"), iv(90, 120, "RUNNING")];
    fs::write(
        dir.path().join("data-001.json"),
        serde_json::to_string(&detections).unwrap(),
    )
    .unwrap();

    let truth_file = write_truth(dir.path(), data_pattern.to_str().unwrap());

    let registry = RecognizerRegistry::with_builtins();
    let harness = Harness::new(registry);
    let scored = harness
        .run(&[truth_file], &["replay".to_string()])
        .unwrap();

    assert_eq!(scored.recognizers, vec!["replay".to_string()]);
    assert_eq!(scored.results.len(), 1);
    let run = &scored.results[0];
    assert_eq!(run.recognizer, "replay");
    assert_eq!(run.labels.len(), 2);
    assert_eq!(run.detected.len(), 2);

    // Both events match exactly: perfect frame accuracy, all correct.
    assert_eq!(run.scores.frame_score.acc, Some(1.0));
    for event in run.scores.events.truths.iter() {
        assert_eq!(event.event_score, EventCode::Correct);
    }
    assert_eq!(scored.stats.truth_count, 2);
    assert_eq!(scored.stats.detected_count, 2);
    assert_eq!(scored.scores.frame_scores.acc, Some(1.0));
}

#[test]
fn test_unknown_recognizer_fails_before_reading_files() {
    let registry = RecognizerRegistry::with_builtins();
    let harness = Harness::new(registry);
    let missing = PathBuf::from("/nonexistent/truth.json");
    let err = harness.run(&[missing], &["nope".to_string()]);
    assert!(matches!(err, Err(segeval::Error::UnknownRecognizer(_))));
}

#[test]
fn test_truth_labels_filtered_to_supported() {
    // A recognizer that only knows WALKING never gets scored against the
    // RUNNING truth event.
    let dir = tempfile::tempdir().unwrap();
    let truth_file = write_truth(dir.path(), dir.path().join("*.none").to_str().unwrap());

    let mut registry = RecognizerRegistry::new();
    registry.register("walking-only", || {
        Box::new(
            FixedRecognizer::new(vec!["WALKING".into()])
                .with_results(vec![Interval::new(ts(0), ts(60), "WALKING")]),
        ) as Box<dyn Recognizer>
    });

    let scored = Harness::new(registry)
        .run(&[truth_file], &["walking-only".to_string()])
        .unwrap();
    let run = &scored.results[0];
    assert_eq!(run.labels.len(), 1);
    assert_eq!(run.labels[0].label, "WALKING");
    assert_eq!(run.scores.frame_score.acc, Some(1.0));
}

#[test]
fn test_gzipped_data_files_are_decompressed() {
    let dir = tempfile::tempdir().unwrap();
    let data_pattern = dir.path().join("data-*.json.gz");

    let detections = vec![iv(0, 60, "WALKING")];
    let file = fs::File::create(dir.path().join("data-001.json.gz")).unwrap();
    let mut gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    gz.write_all(serde_json::to_string(&detections).unwrap().as_bytes())
        .unwrap();
    gz.finish().unwrap();

    let truth_file = write_truth(dir.path(), data_pattern.to_str().unwrap());
    let scored = Harness::new(RecognizerRegistry::with_builtins())
        .run(&[truth_file], &["replay".to_string()])
        .unwrap();

    let run = &scored.results[0];
    assert_eq!(run.detected.len(), 1);
    // Only the WALKING truth survives label filtering; it matches exactly.
    assert_eq!(run.labels.len(), 1);
    assert_eq!(run.scores.frame_score.acc, Some(1.0));
}

#[test]
fn test_report_written_and_history_rotated() {
    let dir = tempfile::tempdir().unwrap();
    let truth_file = write_truth(dir.path(), dir.path().join("*.none").to_str().unwrap());

    let scored = Harness::new(RecognizerRegistry::with_builtins())
        .run(&[truth_file], &["replay".to_string()])
        .unwrap();

    let out1 = dir.path().join("2023-01-01.json");
    let out2 = dir.path().join("2023-02-01.json");
    let list = dir.path().join("list.json");
    report::write_report(&scored, &out1).unwrap();
    report::update_history(&list, &out1).unwrap();
    report::write_report(&scored, &out2).unwrap();
    let names = report::update_history(&list, &out2).unwrap();
    assert_eq!(names[0], "2023-02-01.json");

    // The written report round-trips as JSON with the expected top keys.
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out1).unwrap()).unwrap();
    for key in ["scores", "stats", "results", "recognizers", "t"] {
        assert!(value.get(key).is_some(), "missing report key {key}");
    }
    assert!(value["scores"].get("frame_scores").is_some());
    assert!(value["scores"].get("event_scores").is_some());
}
