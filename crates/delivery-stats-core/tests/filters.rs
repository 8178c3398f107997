use chrono::{Duration, NaiveDate, NaiveDateTime};
use delivery_stats_core::error::PipelineError;
use delivery_stats_core::filters::{apply_pattern_filters, apply_window_cutoff, RecordFilters};
use delivery_stats_core::EventRecord;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 12, 26)
        .and_then(|d| d.and_hms_opt(18, 0, 0))
        .expect("valid base time")
}

fn record(minute: i64, client: &str, source: &str, target: &str) -> EventRecord {
    EventRecord {
        timestamp: base() + Duration::minutes(minute),
        duration: Some(minute as f64),
        client_name: Some(client.to_string()),
        source_language: Some(source.to_string()),
        target_language: Some(target.to_string()),
    }
}

fn at_minutes(minutes: &[i64]) -> Vec<EventRecord> {
    minutes
        .iter()
        .map(|m| record(*m, "easyjet", "en", "fr"))
        .collect()
}

fn minutes_of(records: &[EventRecord]) -> Vec<i64> {
    records
        .iter()
        .map(|r| (r.timestamp - base()).num_minutes())
        .collect()
}

#[test]
fn default_filters_match_arbitrary_records() {
    let records = vec![
        record(0, "easyjet", "en", "fr"),
        record(1, "", "", ""),
        record(2, "ünïcødé client", "zh-Hant", "pt_BR"),
        record(3, "line\nbreak", "?", "*"),
    ];

    let kept = apply_pattern_filters(&records, &RecordFilters::default());
    assert_eq!(kept, records);
}

#[test]
fn pattern_filters_are_conjunctive() {
    let records = vec![
        record(0, "easyjet", "en", "fr"),
        record(1, "easyjet", "en", "de"),
        record(2, "booking", "en", "fr"),
        record(3, "easyjet", "es", "fr"),
        record(4, "easyjet-uk", "en-gb", "fr"),
    ];
    let filters = RecordFilters::new("easyjet", "en", "fr").expect("valid patterns");

    let kept = apply_pattern_filters(&records, &filters);
    assert_eq!(minutes_of(&kept), vec![0, 4]);

    for r in &records {
        let expected = filters.client.is_match(r.client_name.as_deref().unwrap_or_default())
            && filters.source.is_match(r.source_language.as_deref().unwrap_or_default())
            && filters.target.is_match(r.target_language.as_deref().unwrap_or_default());
        assert_eq!(filters.matches(r), expected);
    }
}

#[test]
fn pattern_filters_accept_regular_expressions() {
    let records = vec![
        record(0, "easyjet", "en", "fr"),
        record(1, "easyjet", "en", "de"),
        record(2, "easyjet", "en", "it"),
    ];
    let filters = RecordFilters::new(".*", "en", "^(fr|de)$").expect("valid patterns");

    let kept = apply_pattern_filters(&records, &filters);
    assert_eq!(minutes_of(&kept), vec![0, 1]);
}

#[test]
fn records_missing_a_text_field_never_match() {
    let mut without_client = record(0, "easyjet", "en", "fr");
    without_client.client_name = None;

    let kept = apply_pattern_filters(&[without_client], &RecordFilters::default());
    assert!(kept.is_empty());
}

#[test]
fn invalid_patterns_are_reported() {
    let err = RecordFilters::new("easyjet", "(", ".*").expect_err("unbalanced group");
    assert!(matches!(err, PipelineError::InvalidPattern { filter: "source", .. }));
}

#[test]
fn window_cutoff_retains_carry_in_record() {
    let records = at_minutes(&[-12, -9, -5, -1, 0]);

    let kept = apply_window_cutoff(&records, 10);

    // -12 precedes the cutoff at -10 but is followed by -9, so it is carried in.
    assert_eq!(minutes_of(&kept), vec![-12, -9, -5, -1, 0]);

    let naive: Vec<i64> = minutes_of(&records)
        .into_iter()
        .filter(|m| *m > -10)
        .collect();
    assert_eq!(naive, vec![-9, -5, -1, 0]);
}

#[test]
fn window_cutoff_drops_everything_before_the_carry_in() {
    let records = at_minutes(&[-30, -20, -15, -12, -9, -1, 0]);

    let kept = apply_window_cutoff(&records, 10);
    assert_eq!(minutes_of(&kept), vec![-12, -9, -1, 0]);
}

#[test]
fn window_cutoff_is_strict_at_the_boundary() {
    // -15 is followed by -10, which equals the cutoff and is not strictly after it.
    let records = at_minutes(&[-15, -10, -4, 0]);

    let kept = apply_window_cutoff(&records, 10);
    assert_eq!(minutes_of(&kept), vec![-10, -4, 0]);
}

#[test]
fn window_cutoff_never_drops_the_last_record() {
    let single = at_minutes(&[0]);
    assert_eq!(minutes_of(&apply_window_cutoff(&single, 1)), vec![0]);

    let records = at_minutes(&[-500, -400, 0]);
    let kept = apply_window_cutoff(&records, 1);
    assert_eq!(minutes_of(&kept), vec![-400, 0]);
}

#[test]
fn window_cutoff_handles_empty_input() {
    assert!(apply_window_cutoff(&[], 10).is_empty());
}
