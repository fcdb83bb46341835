//! Integration tests for the feature transformer

use chrono::Duration;
use stockvol::features::{FeatureConfig, FeatureTransformer};
use stockvol::frame::{TimeIndex, TimeSeriesFrame};
use stockvol::synthetic::SyntheticOhlcv;
use stockvol::StockVolError;

fn hourly(rows: usize, seed: u64) -> TimeSeriesFrame {
    SyntheticOhlcv::new(rows).with_seed(seed).generate().unwrap()
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_two_hundred_hourly_rows() {
    let frame = hourly(200, 42);
    let (features, spec) = FeatureTransformer::default().transform(&frame, 1).unwrap();

    assert!(features.height() < 200);
    assert!(features.height() > 150);
    assert_eq!(features.frame().null_count(), 0);
    assert!(features.frame().has_column("target_volatility"));

    let rsi = features.column("rsi").unwrap();
    assert!(rsi.iter().all(|v| (0.0..=100.0).contains(v)));

    let matrix = features.design_matrix(&spec).unwrap();
    assert_eq!(matrix.shape(), &[features.height(), spec.len()]);
    assert!(matrix.iter().all(|v| v.is_finite()));
}

#[test]
fn test_no_undefined_values_for_small_inputs() {
    for rows in [50, 64, 100] {
        let (features, _) = FeatureTransformer::default()
            .transform(&hourly(rows, rows as u64), 1)
            .unwrap();
        assert!(features.height() > 0);
        for (name, column) in features.frame().columns() {
            let values = column.as_numeric().unwrap();
            assert!(values.iter().all(|v| v.is_finite()), "column {} has gaps", name);
        }
    }
}

#[test]
fn test_spec_excludes_raw_and_target_columns() {
    let frame = SyntheticOhlcv::new(120)
        .with_seed(7)
        .with_symbol("TEST")
        .generate()
        .unwrap();
    let (features, spec) = FeatureTransformer::default().transform(&frame, 1).unwrap();

    for raw in ["open", "high", "low", "close", "volume", "symbol"] {
        assert!(!spec.contains(raw), "{} leaked into spec", raw);
        assert!(features.frame().has_column(raw));
    }
    for target in ["future_returns", "target_volatility", "target_realized_vol"] {
        assert!(!spec.contains(target));
        assert!(features.frame().has_column(target));
    }

    // spec order follows frame order
    let frame_order: Vec<&str> = features
        .frame()
        .column_names()
        .into_iter()
        .filter(|name| spec.contains(name))
        .collect();
    let spec_order: Vec<&str> = spec.names().iter().map(String::as_str).collect();
    assert_eq!(frame_order, spec_order);
}

#[test]
fn test_default_feature_list() {
    let (_, spec) = FeatureTransformer::default()
        .transform(&hourly(120, 3), 1)
        .unwrap();

    let expected_prefix = [
        "returns",
        "log_returns",
        "volatility_3",
        "volatility_5",
        "volatility_10",
        "close_lag_1",
        "close_lag_2",
        "close_lag_3",
        "returns_lag_1",
        "returns_lag_2",
        "returns_lag_3",
        "volume_lag_1",
        "volume_lag_2",
        "volume_lag_3",
        "close_ma_3",
        "close_std_3",
        "close_min_3",
        "close_max_3",
        "bb_upper_3",
        "bb_lower_3",
    ];
    assert_eq!(&spec.names()[..expected_prefix.len()], &expected_prefix.map(String::from)[..]);
    assert!(spec.contains("volume_ratio"));
    assert!(spec.contains("hour_sin"));
    // 2 returns + 3 vol + 9 lags + 18 rolling + 9 indicators + 9 calendar
    assert_eq!(spec.len(), 50);
}

#[test]
fn test_same_input_same_output() {
    let frame = hourly(150, 11);
    let transformer = FeatureTransformer::default();
    let (a_features, a_spec) = transformer.transform(&frame, 1).unwrap();
    let (b_features, b_spec) = transformer.transform(&frame, 1).unwrap();

    assert_eq!(a_spec, b_spec);
    assert_eq!(a_features, b_features);
}

// ============================================================================
// Leakage
// ============================================================================

#[test]
fn test_features_do_not_look_ahead() {
    let cutoff = 140;
    let original = hourly(200, 21);

    let mut perturbed = original.clone();
    for col in ["open", "high", "low", "close", "volume"] {
        let values = perturbed.numeric_mut(col).unwrap();
        for i in cutoff..values.len() {
            values[i] *= 1.5;
        }
    }

    let transformer = FeatureTransformer::default();
    let (a, spec) = transformer.transform(&original, 1).unwrap();
    let (b, _) = transformer.transform(&perturbed, 1).unwrap();

    let a_ts = a.frame().index().timestamps().unwrap();
    let b_ts = b.frame().index().timestamps().unwrap();
    let cutoff_ts = original.index().timestamps().unwrap()[cutoff];

    let mut compared = 0;
    for (i, ts) in a_ts.iter().enumerate() {
        if *ts >= cutoff_ts {
            break;
        }
        assert_eq!(b_ts[i], *ts);
        for name in spec.names() {
            let left = a.frame().numeric(name).unwrap()[i];
            let right = b.frame().numeric(name).unwrap()[i];
            assert_eq!(left, right, "{} differs at {}", name, ts);
        }
        compared += 1;
    }
    assert!(compared > 100);

    // the last pre-cutoff row sees the perturbed return as its target
    let last = compared - 1;
    assert_ne!(
        a.frame().numeric("future_returns").unwrap()[last],
        b.frame().numeric("future_returns").unwrap()[last]
    );
}

// ============================================================================
// Targets and calendar
// ============================================================================

#[test]
fn test_target_matches_next_return() {
    let (features, _) = FeatureTransformer::default()
        .transform(&hourly(100, 8), 1)
        .unwrap();

    let returns = features.column("returns").unwrap();
    let future = features.column("future_returns").unwrap();
    let target = features.column("target_volatility").unwrap();
    let realized = features.column("target_realized_vol").unwrap();

    // consecutive surviving rows are consecutive bars
    for i in 0..features.height() - 1 {
        assert_eq!(future[i], returns[i + 1]);
        assert_eq!(target[i], future[i].abs());
        assert_eq!(realized[i], target[i]);
    }
}

#[test]
fn test_longer_horizon_drops_more_rows() {
    let frame = hourly(120, 13);
    let transformer = FeatureTransformer::default();
    let (h1, _) = transformer.transform(&frame, 1).unwrap();
    let (h5, _) = transformer.transform(&frame, 5).unwrap();

    assert_eq!(h1.height() - h5.height(), 4);
    assert!(h5.column("target_realized_vol").unwrap().iter().all(|v| *v >= 0.0));
}

#[test]
fn test_daily_bars_get_neutral_hour() {
    let frame = SyntheticOhlcv::new(80)
        .with_seed(4)
        .with_step(Duration::days(1))
        .generate()
        .unwrap();
    let (features, _) = FeatureTransformer::default().transform(&frame, 1).unwrap();

    assert!(features.column("hour").unwrap().iter().all(|v| *v == 0.0));
    assert!(features.column("hour_cos").unwrap().iter().all(|v| *v == 1.0));
    let dow = features.column("day_of_week").unwrap();
    assert!(dow.iter().all(|v| (0.0..=6.0).contains(v)));
}

// ============================================================================
// Errors and configuration
// ============================================================================

#[test]
fn test_label_index_is_rejected() {
    let frame = hourly(60, 1);
    let labels: Vec<String> = (0..60).map(|i| format!("row{}", i)).collect();
    let relabeled = TimeSeriesFrame::new(
        TimeIndex::Labels(labels),
        frame
            .columns()
            .map(|(name, column)| (name.to_string(), column.clone()))
            .collect(),
    )
    .unwrap();

    assert!(matches!(
        FeatureTransformer::default().transform(&relabeled, 1),
        Err(StockVolError::NonTemporalIndex)
    ));
}

#[test]
fn test_custom_config() {
    let config = FeatureConfig::new()
        .with_volatility_windows(vec![4])
        .with_rolling_windows(vec![6])
        .with_lags(vec![2])
        .with_lag_columns(["close"])
        .with_momentum_periods(vec![2])
        .with_volume_windows(vec![3, 8]);
    let (features, spec) = FeatureTransformer::new(config)
        .transform(&hourly(80, 6), 1)
        .unwrap();

    assert!(spec.contains("volatility_4"));
    assert!(spec.contains("close_lag_2"));
    assert!(!spec.contains("volume_lag_2"));
    assert!(spec.contains("bb_upper_6"));
    assert!(spec.contains("momentum_2"));
    assert!(spec.contains("volume_ma_8"));

    // volume_ratio divides by the longest volume window
    let frame = features.frame();
    let ratio = frame.numeric("volume_ratio").unwrap();
    let volume = frame.numeric("volume").unwrap();
    let base = frame.numeric("volume_ma_8").unwrap();
    assert!((ratio[0] - volume[0] / base[0]).abs() < 1e-12);
}
