use candela_core::indicators::{self, IndicatorKind, IndicatorValue};
use candela_core::{CandelaError, compute};

#[test]
fn rsi_boundaries_via_dispatch() {
    let up: Vec<f64> = (0..15).map(|i| 10.0 + f64::from(i)).collect();
    let res = compute(IndicatorKind::Rsi, &up, 1_000).unwrap();
    assert_eq!(res.value, IndicatorValue::Single(100.0));
    assert_eq!(res.window, 14);
    assert_eq!(res.as_of_ms, 1_000);

    let down: Vec<f64> = (0..15).map(|i| 100.0 - f64::from(i)).collect();
    let res = compute(IndicatorKind::Rsi, &down, 1_000).unwrap();
    match res.value {
        IndicatorValue::Single(v) => assert!(v.abs() < 1e-12),
        IndicatorValue::Bands { .. } => panic!("rsi is scalar"),
    }
}

#[test]
fn ema_seed_for_any_period() {
    for period in [1, 5, 14, 50, 500] {
        let res = compute(IndicatorKind::Ema(period), &[3.25], 0).unwrap();
        assert_eq!(res.value, IndicatorValue::Single(3.25));
    }
}

#[test]
fn bollinger_flat_collapses() {
    let closes = [99.5; 20];
    let res = compute(IndicatorKind::Bollinger, &closes, 42).unwrap();
    assert_eq!(
        res.value,
        IndicatorValue::Bands {
            upper: 99.5,
            middle: 99.5,
            lower: 99.5
        }
    );
    assert_eq!(res.window, 20);
}

#[test]
fn insufficient_data_is_an_error_not_a_placeholder() {
    let closes = [1.0; 14];
    let err = compute(IndicatorKind::Bollinger, &closes, 0).unwrap_err();
    match err {
        CandelaError::InsufficientData {
            indicator,
            required,
            got,
        } => {
            assert_eq!(indicator, "bollinger");
            assert_eq!(required, 20);
            assert_eq!(got, 14);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[test]
fn macd_uses_full_series_recursion() {
    // Hand-rolled: macd == ema12 - ema26 over the whole series, not over
    // trailing windows.
    let closes: Vec<f64> = (0..50).map(|i| 20.0 + (f64::from(i) * 0.3).cos()).collect();
    let expect = indicators::ema(&closes, 12).unwrap() - indicators::ema(&closes, 26).unwrap();
    let res = compute(IndicatorKind::Macd, &closes, 7).unwrap();
    assert_eq!(res.value, IndicatorValue::Single(expect));
    assert_eq!(res.window, 26);
}

#[test]
fn sma_window_zero_is_invalid_arg() {
    let err = compute(IndicatorKind::Sma(0), &[1.0, 2.0], 0).unwrap_err();
    assert!(matches!(err, CandelaError::InvalidArg(_)));
}
