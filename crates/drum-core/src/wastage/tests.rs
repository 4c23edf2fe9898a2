use super::*;
use chrono::{DateTime, TimeZone, Utc};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 9, 0, 0).unwrap()
}

fn pull(id: &str, start: f64, end: f64, d: u32) -> UsageRecord {
    UsageRecord::new(id, start, end, day(d))
}

fn drum(capacity: f64, method: CalculationMethod, manual: Option<f64>) -> Drum {
    Drum {
        id: "drum-1".to_string(),
        initial_quantity: capacity,
        current_quantity: capacity,
        manual_wastage_override: manual,
        calculation_method: method,
    }
}

fn seg(start: f64, end: f64) -> Segment {
    Segment {
        start,
        end,
        length: end - start,
    }
}

#[test]
fn test_disjoint_pulls_partition_the_drum() {
    let records = vec![pull("a", 0.0, 300.0, 1), pull("b", 500.0, 800.0, 2)];
    let drum = drum(2000.0, CalculationMethod::SmartSegments, None);

    let result = calculate_wastage(&records, &drum).unwrap();

    assert_eq!(result.total_used, 600.0);
    assert_eq!(result.usage_segments, vec![seg(0.0, 300.0), seg(500.0, 800.0)]);
    assert_eq!(
        result.wasted_segments,
        vec![seg(300.0, 500.0), seg(800.0, 2000.0)]
    );
    assert_eq!(result.total_wastage, 1400.0);
    assert_eq!(result.calculated_current_quantity, 0.0);
    assert_eq!(result.calculation_method, CalculationMethod::SmartSegments);
    assert_eq!(result.record_count, 2);
}

#[test]
fn test_overlapping_pulls_are_not_double_counted() {
    let records = vec![pull("a", 0.0, 500.0, 1), pull("b", 300.0, 700.0, 2)];
    let drum = drum(2000.0, CalculationMethod::SmartSegments, None);

    let result = calculate_wastage(&records, &drum).unwrap();

    assert_eq!(result.usage_segments, vec![seg(0.0, 700.0)]);
    assert_eq!(result.total_used, 700.0);
    assert_eq!(result.wasted_segments, vec![seg(700.0, 2000.0)]);
    assert_eq!(result.total_wastage, 1300.0);
}

#[test]
fn test_touching_intervals_merge_without_gap() {
    let intervals = vec![
        NormalizedInterval {
            low: 100.0,
            high: 200.0,
        },
        NormalizedInterval {
            low: 0.0,
            high: 100.0,
        },
    ];

    let merged = merge_intervals(&intervals);
    assert_eq!(merged, vec![seg(0.0, 200.0)]);
    assert!(complement_segments(&merged, 200.0).is_empty());
}

#[test]
fn test_zero_length_intervals_are_absorbed() {
    let intervals = vec![
        NormalizedInterval {
            low: 50.0,
            high: 50.0,
        },
        NormalizedInterval {
            low: 10.0,
            high: 40.0,
        },
        NormalizedInterval {
            low: 20.0,
            high: 20.0,
        },
    ];

    assert_eq!(merge_intervals(&intervals), vec![seg(10.0, 40.0)]);
}

#[test]
fn test_nested_interval_does_not_shrink_segment() {
    let intervals = vec![
        NormalizedInterval {
            low: 0.0,
            high: 900.0,
        },
        NormalizedInterval {
            low: 100.0,
            high: 200.0,
        },
        NormalizedInterval {
            low: 950.0,
            high: 1000.0,
        },
    ];

    assert_eq!(
        merge_intervals(&intervals),
        vec![seg(0.0, 900.0), seg(950.0, 1000.0)]
    );
}

#[test]
fn test_reversed_pull_normalizes_like_forward_pull() {
    let forward = pull("fwd", 10.0, 200.0, 1);
    let backward = pull("bwd", 200.0, 10.0, 1);

    assert_eq!(
        normalize_record(&forward, 1000.0),
        normalize_record(&backward, 1000.0)
    );

    let drum = drum(1000.0, CalculationMethod::SmartSegments, None);
    let a = calculate_wastage(&[forward], &drum).unwrap();
    let b = calculate_wastage(&[backward], &drum).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_malformed_record_counts_as_zero_length() {
    let mut broken = pull("broken", 0.0, 0.0, 2);
    broken.start_point = None;
    let mut infinite = pull("infinite", 0.0, 0.0, 3);
    infinite.end_point = Some(f64::INFINITY);

    let records = vec![pull("ok", 0.0, 250.0, 1), broken, infinite];
    let drum = drum(500.0, CalculationMethod::SmartSegments, None);

    let result = calculate_wastage(&records, &drum).unwrap();

    assert_eq!(result.total_used, 250.0);
    assert_eq!(result.total_wastage, 250.0);
    assert_eq!(result.record_count, 3);
    assert_eq!(result.skipped_records, vec!["broken", "infinite"]);
    assert_eq!(
        normalize_record(&records[1], 500.0),
        NormalizedInterval {
            low: 0.0,
            high: 0.0
        }
    );
}

#[test]
fn test_marks_outside_drum_are_clamped() {
    let record = pull("over", -20.0, 1200.0, 1);
    let interval = normalize_record(&record, 1000.0);

    assert_eq!(interval.low, 0.0);
    assert_eq!(interval.high, 1000.0);
}

#[test]
fn test_footage_is_rounded_to_centimetres() {
    let records = vec![
        pull("a", 0.1, 0.2, 1),
        pull("b", 0.2, 100.333, 2),
    ];
    let drum = drum(100.5, CalculationMethod::SmartSegments, None);

    let result = calculate_wastage(&records, &drum).unwrap();

    assert_eq!(result.total_used, 100.23);
    assert_eq!(result.total_wastage, 0.27);
    assert_eq!(result.calculated_current_quantity, 0.0);
}

#[test]
fn test_empty_drum_is_all_waste() {
    let drum = drum(750.0, CalculationMethod::SmartSegments, None);
    let result = calculate_wastage(&[], &drum).unwrap();

    assert_eq!(result.total_used, 0.0);
    assert!(result.usage_segments.is_empty());
    assert_eq!(result.wasted_segments, vec![seg(0.0, 750.0)]);
    assert_eq!(result.total_wastage, 750.0);
}

#[test]
fn test_validate_manual_wastage_rules() {
    let negative = validate_manual_wastage(-5.0, 100.0, 500.0);
    assert!(!negative.is_valid);
    assert_eq!(negative.error.as_deref(), Some("Wastage cannot be negative"));

    let too_large = validate_manual_wastage(450.0, 100.0, 500.0);
    assert!(!too_large.is_valid);
    assert!(too_large.error.unwrap().contains("exceeds drum capacity of 500.00 m"));

    let ok = validate_manual_wastage(300.0, 100.0, 500.0);
    assert!(ok.is_valid);
    assert!(ok.error.is_none());

    assert!(validate_manual_wastage(400.0, 100.0, 500.0).is_valid);
    assert!(!validate_manual_wastage(f64::NAN, 100.0, 500.0).is_valid);
}

#[test]
fn test_infinite_wastage_follows_rule_order() {
    let negative = validate_manual_wastage(f64::NEG_INFINITY, 100.0, 500.0);
    assert_eq!(negative.error.as_deref(), Some("Wastage cannot be negative"));

    let positive = validate_manual_wastage(f64::INFINITY, 100.0, 500.0);
    assert!(!positive.is_valid);
    assert!(positive.error.unwrap().contains("exceeds drum capacity"));
}

#[test]
fn test_manual_override_replaces_wastage_only() {
    let records = vec![pull("a", 0.0, 300.0, 1), pull("b", 500.0, 800.0, 2)];
    let drum = drum(2000.0, CalculationMethod::ManualOverride, Some(150.0));

    let result = calculate_wastage(&records, &drum).unwrap();

    assert_eq!(result.calculation_method, CalculationMethod::ManualOverride);
    assert_eq!(result.total_used, 600.0);
    assert_eq!(result.usage_segments.len(), 2);
    assert_eq!(result.total_wastage, 150.0);
    assert!(result.wasted_segments.is_empty());
    assert_eq!(result.calculated_current_quantity, 1250.0);
}

#[test]
fn test_manual_override_over_capacity_is_rejected() {
    let records = vec![pull("a", 0.0, 100.0, 1)];
    let drum = drum(500.0, CalculationMethod::ManualOverride, Some(450.0));

    let err = calculate_wastage(&records, &drum).unwrap_err();
    assert!(matches!(err, WastageError::InvalidOverride(_)));
}

#[test]
fn test_manual_method_without_value_uses_smart_segments() {
    let records = vec![pull("a", 0.0, 100.0, 1)];
    let drum = drum(500.0, CalculationMethod::ManualOverride, None);

    let result = calculate_wastage(&records, &drum).unwrap();
    assert_eq!(result.calculation_method, CalculationMethod::SmartSegments);
    assert_eq!(result.total_wastage, 400.0);
}

#[test]
fn test_legacy_sums_forward_gaps() {
    let records = vec![
        pull("a", 0.0, 300.0, 1),
        pull("b", 350.0, 600.0, 2),
        pull("c", 600.0, 900.0, 3),
    ];
    let drum = drum(1000.0, CalculationMethod::LegacyGaps, None);

    let result = calculate_wastage(&records, &drum).unwrap();

    assert_eq!(result.calculation_method, CalculationMethod::LegacyGaps);
    assert_eq!(result.total_used, 850.0);
    assert_eq!(result.wasted_segments, vec![seg(300.0, 350.0)]);
    assert_eq!(result.total_wastage, 50.0);
    assert_eq!(result.calculated_current_quantity, 100.0);
}

#[test]
fn test_legacy_orders_by_date_then_insertion() {
    let records = vec![
        pull("late", 400.0, 500.0, 5),
        pull("first", 0.0, 100.0, 1),
        pull("second", 150.0, 300.0, 1),
    ];
    let drum = drum(1000.0, CalculationMethod::LegacyGaps, None);

    let result = calculate_wastage(&records, &drum).unwrap();

    assert_eq!(
        result.usage_segments,
        vec![seg(0.0, 100.0), seg(150.0, 300.0), seg(400.0, 500.0)]
    );
    assert_eq!(
        result.wasted_segments,
        vec![seg(100.0, 150.0), seg(300.0, 400.0)]
    );
}

#[test]
fn test_legacy_skips_malformed_records_in_chain() {
    let mut broken = pull("broken", 0.0, 0.0, 2);
    broken.end_point = Some(f64::NAN);
    let records = vec![pull("a", 0.0, 100.0, 1), broken, pull("c", 100.0, 200.0, 3)];
    let drum = drum(500.0, CalculationMethod::LegacyGaps, None);

    let result = calculate_wastage(&records, &drum).unwrap();

    assert_eq!(result.total_used, 200.0);
    assert_eq!(result.total_wastage, 0.0);
    assert_eq!(result.skipped_records, vec!["broken"]);
}

#[test]
fn test_legacy_diverges_from_smart_on_bidirectional_pulls() {
    let records = vec![pull("out", 10.0, 200.0, 1), pull("back", 200.0, 10.0, 2)];

    let smart = calculate_wastage(&records, &drum(1000.0, CalculationMethod::SmartSegments, None))
        .unwrap();
    let legacy =
        calculate_wastage(&records, &drum(1000.0, CalculationMethod::LegacyGaps, None)).unwrap();

    assert_eq!(smart.total_used, 190.0);
    assert_eq!(legacy.total_used, 380.0);
    assert_eq!(legacy.total_wastage, 190.0);
    assert_ne!(smart.total_wastage, legacy.total_wastage);
}

#[test]
fn test_legacy_overestimate_surfaces_negative_remainder() {
    let records = vec![pull("out", 10.0, 200.0, 1), pull("back", 200.0, 10.0, 2)];

    let smart =
        calculate_wastage(&records, &drum(200.0, CalculationMethod::SmartSegments, None)).unwrap();
    assert_eq!(smart.total_wastage, 10.0);
    assert_eq!(smart.calculated_current_quantity, 0.0);

    let err = calculate_wastage(&records, &drum(200.0, CalculationMethod::LegacyGaps, None))
        .unwrap_err();
    match err {
        WastageError::NegativeRemainder {
            method,
            remainder,
            result,
        } => {
            assert_eq!(method, CalculationMethod::LegacyGaps);
            assert_eq!(remainder, -370.0);
            assert!(result.total_wastage > smart.total_wastage);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_capacity_is_rejected() {
    assert!(matches!(
        WastageCalculator::new(-1.0),
        Err(WastageError::InvalidInput(_))
    ));
    assert!(matches!(
        WastageCalculator::new(f64::NAN),
        Err(WastageError::InvalidInput(_))
    ));
}

#[test]
fn test_dispatcher_follows_drum_preference() {
    let records = vec![pull("a", 0.0, 100.0, 1), pull("b", 50.0, 150.0, 2)];
    let mut drum = drum(1000.0, CalculationMethod::SmartSegments, None);

    assert_eq!(
        calculate_wastage(&records, &drum).unwrap().total_used,
        100.0 + 50.0
    );

    drum.apply_settings(DrumSettings {
        calculation_method: CalculationMethod::LegacyGaps,
        manual_wastage_override: None,
    });
    assert_eq!(calculate_wastage(&records, &drum).unwrap().total_used, 200.0);

    drum.apply_settings(DrumSettings {
        calculation_method: CalculationMethod::ManualOverride,
        manual_wastage_override: Some(25.0),
    });
    let result = calculate_wastage(&records, &drum).unwrap();
    assert_eq!(result.total_wastage, 25.0);
    assert_eq!(result.calculated_current_quantity, 825.0);
}

#[test]
fn test_validate_settings_checks_against_merged_usage() {
    let records = vec![pull("a", 0.0, 300.0, 1), pull("b", 200.0, 400.0, 2)];
    let calculator = WastageCalculator::new(500.0).unwrap();

    let fits = DrumSettings {
        calculation_method: CalculationMethod::ManualOverride,
        manual_wastage_override: Some(100.0),
    };
    assert!(calculator.validate_settings(&fits, &records).is_valid);

    let overflows = DrumSettings {
        calculation_method: CalculationMethod::ManualOverride,
        manual_wastage_override: Some(100.01),
    };
    assert!(!calculator.validate_settings(&overflows, &records).is_valid);

    let missing = DrumSettings {
        calculation_method: CalculationMethod::ManualOverride,
        manual_wastage_override: None,
    };
    assert!(!calculator.validate_settings(&missing, &records).is_valid);

    let smart = DrumSettings {
        calculation_method: CalculationMethod::SmartSegments,
        manual_wastage_override: None,
    };
    assert!(calculator.validate_settings(&smart, &records).is_valid);
}

#[test]
fn test_method_names_serialize_in_snake_case() {
    let json = serde_json::to_string(&CalculationMethod::ManualOverride).unwrap();
    assert_eq!(json, "\"manual_override\"");

    let drum: Drum =
        serde_json::from_str(r#"{"id":"d","initial_quantity":1000.0}"#).unwrap();
    assert_eq!(drum.calculation_method, CalculationMethod::SmartSegments);
    assert_eq!(drum.manual_wastage_override, None);
}
