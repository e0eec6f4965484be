use float_cmp::assert_approx_eq;
use rstest::rstest;

use plotaxis::autorange::{do_auto_range, expand, get_auto_range, ExpandOptions, Extreme, Pad};
use plotaxis::axis::{AutoRange, PlotSize};
use plotaxis::classify::{classify, AxisType, ClassifyOptions};
use plotaxis::constants::{MAX_TICKS, ONEAVGYEAR, ONEDAY};
use plotaxis::dates::{date_time_to_ms, increment_month, Calendar, MAX_MS, MIN_MS};
use plotaxis::registry::{AxisId, AxisLetter};
use plotaxis::ticks::{auto_ticks, calc_ticks, tick_increment, Dtick, TickMode};
use plotaxis::{Axis, CalcAxis, Datum};

fn plot(w: f64, h: f64) -> PlotSize {
    PlotSize { l: 0.0, t: 0.0, w, h }
}

fn scaled(letter: AxisLetter, axis_type: AxisType, range: [f64; 2], length: f64) -> Axis {
    let mut axis = Axis::new(AxisId::new(letter, 1), axis_type);
    axis.range = range;
    axis.set_scale(&plot(length, length)).unwrap();
    axis
}

#[rstest]
#[case(AxisLetter::X, AxisType::Linear, [0.0, 10.0], &[0.0, 0.3, 2.5, 7.77, 10.0])]
#[case(AxisLetter::Y, AxisType::Linear, [-50.0, 50.0], &[-50.0, -12.3, 0.0, 49.0])]
#[case(AxisLetter::X, AxisType::Log, [0.0, 3.0], &[1.0, 2.0, 50.0, 999.0])]
fn test_pixel_round_trip(
    #[case] letter: AxisLetter,
    #[case] axis_type: AxisType,
    #[case] range: [f64; 2],
    #[case] values: &[f64],
) {
    let axis = scaled(letter, axis_type, range, 400.0);
    for &v in values {
        let px = axis.c2p(v, false).unwrap();
        let back = axis.p2c(px);
        // pixels are rounded to 2 decimals
        let tolerance = match axis_type {
            AxisType::Log => v * (10f64.powf(0.005 / axis.scale.m.abs()) - 1.0),
            _ => 0.005 / axis.scale.m.abs(),
        };
        assert!(
            (back - v).abs() <= tolerance + 1e-12,
            "{v} came back as {back}"
        );
    }
}

#[test]
fn test_conversions_are_idempotent() {
    let mut axis = scaled(AxisLetter::X, AxisType::Linear, [2.0, 8.0], 300.0);
    let first = (axis.scale, axis.c2p(5.0, false), axis.p2c(120.0));
    axis.set_scale(&plot(300.0, 300.0)).unwrap();
    let second = (axis.scale, axis.c2p(5.0, false), axis.p2c(120.0));
    assert_eq!(first, second);
}

#[test]
fn test_c2p_is_monotonic() {
    let x = scaled(AxisLetter::X, AxisType::Linear, [0.0, 100.0], 500.0);
    let y = scaled(AxisLetter::Y, AxisType::Linear, [0.0, 100.0], 500.0);
    let reversed = scaled(AxisLetter::X, AxisType::Linear, [100.0, 0.0], 500.0);

    let values: Vec<f64> = (0..=20).map(|i| i as f64 * 5.0).collect();
    for w in values.windows(2) {
        assert!(x.c2p(w[0], false) < x.c2p(w[1], false));
        // pixels grow downwards on y axes
        assert!(y.c2p(w[0], false) > y.c2p(w[1], false));
        assert!(reversed.c2p(w[0], false) > reversed.c2p(w[1], false));
    }
}

#[rstest]
#[case(serde_json::json!(["2020-01-01", "2021-06-15", "2019-12-31", 5]), AxisType::Date)]
#[case(serde_json::json!([1, 2, 3, "a", "b"]), AxisType::Linear)]
#[case(serde_json::json!([]), AxisType::Undetermined)]
fn test_classifier(#[case] data: serde_json::Value, #[case] expected: AxisType) {
    let data: Vec<Datum> = serde_json::from_value(data).unwrap();
    assert_eq!(classify(&data, &ClassifyOptions::default()), expected);
}

#[test]
fn test_categories_keep_first_seen_order() {
    let mut axis = Axis::new(AxisId::new(AxisLetter::X, 1), AxisType::Category);
    let data: Vec<Datum> = vec!["b".into(), "a".into(), "c".into(), "b".into()];
    assert_eq!(
        axis.make_calcdata(&data),
        vec![Some(0.0), Some(1.0), Some(2.0), Some(0.0)]
    );
    assert_eq!(axis.register_category(&"a".into()), Some(1.0));
    assert_eq!(axis.lookup_category(&"d".into()), None);
    assert_eq!(axis.categories.len(), 3);
}

#[test]
fn test_autorange_maps_data_inside_pads() {
    let mut axis = scaled(AxisLetter::X, AxisType::Linear, [0.0, 1.0], 110.0);
    axis.min = vec![Extreme::new(0.0, 5.0)];
    axis.max = vec![Extreme::new(10.0, 5.0)];
    do_auto_range(&mut axis, None);
    axis.set_scale(&plot(110.0, 110.0)).unwrap();

    assert_approx_eq!(f64, axis.scale.m * 10.0, 100.0, epsilon = 1e-9);
    assert_approx_eq!(f64, axis.l2p(0.0), 5.0);
    assert_approx_eq!(f64, axis.l2p(10.0), 105.0);
}

#[rstest]
#[case(AutoRange::On, [4.0, 6.0])]
#[case(AutoRange::Reversed, [6.0, 4.0])]
fn test_autorange_single_value(#[case] autorange: AutoRange, #[case] expected: [f64; 2]) {
    let mut axis = scaled(AxisLetter::X, AxisType::Linear, [0.0, 1.0], 200.0);
    axis.autorange = autorange;
    let data = vec![Some(5.0); 4];
    expand(
        &mut axis,
        &data,
        &ExpandOptions {
            padded: true,
            ppad: Some(Pad::Uniform(3.0)),
            ..Default::default()
        },
    );
    assert_eq!(get_auto_range(&mut axis), expected);
}

#[test]
fn test_auto_ticks_rounds_up_the_ladder() {
    let mut axis = scaled(AxisLetter::X, AxisType::Linear, [0.0, 200.0], 400.0);
    auto_ticks(&mut axis, 27.0);
    assert_eq!(axis.ticks.dtick, Dtick::Linear(50.0));
    assert_eq!(axis.ticks.tick0, 0.0);
}

#[rstest]
#[case(AxisType::Linear, [0.0, 1e9], Dtick::Linear(1e-3))]
#[case(AxisType::Log, [-300.0, 300.0], Dtick::LogDigits(plotaxis::ticks::DigitSet::All))]
#[case(AxisType::Date, [0.0, 1e12], Dtick::Linear(0.1))]
#[case(AxisType::Date, [0.0, 1e12], Dtick::Months(2_147_480_000))]
#[case(AxisType::Date, [0.0, 1e12], Dtick::Months(u32::MAX))]
#[case(AxisType::Date, [0.0, 1e12], Dtick::Linear(1e300))]
fn test_tick_walk_is_capped(
    #[case] axis_type: AxisType,
    #[case] range: [f64; 2],
    #[case] dtick: Dtick,
) {
    let mut axis = scaled(AxisLetter::X, axis_type, range, 500.0);
    axis.tick_config.mode = TickMode::Linear;
    axis.tick_config.dtick = Some(dtick);
    let ticks = calc_ticks(&mut axis).unwrap();
    assert!(ticks.len() <= MAX_TICKS);
}

#[rstest]
#[case(true, Dtick::Months(12))]
#[case(true, Dtick::Linear(ONEDAY * 100.0))]
#[case(false, Dtick::Months(6))]
#[case(false, Dtick::Linear(ONEDAY * 100.0))]
fn test_date_ticks_stay_in_supported_range(#[case] upper: bool, #[case] dtick: Dtick) {
    let limit = if upper { *MAX_MS } else { *MIN_MS };
    let span = 3.0 * ONEAVGYEAR;
    let mut axis = scaled(AxisLetter::X, AxisType::Date, [limit - span, limit + span], 500.0);
    axis.tick_config.mode = TickMode::Linear;
    axis.tick_config.dtick = Some(dtick);

    let ticks = calc_ticks(&mut axis).unwrap();
    assert!(!ticks.is_empty());
    assert!(ticks.len() <= MAX_TICKS);
    assert!(ticks.iter().all(|t| t.x >= *MIN_MS && t.x <= *MAX_MS));
}

#[rstest]
#[case("2020-01-15")]
#[case("2019-11-15 10:30")]
#[case("2023-12-01")]
fn test_month_ticks_follow_the_calendar(#[case] start: &str) {
    let x0 = date_time_to_ms(&start.into(), Calendar::Gregorian).unwrap();
    let mut x = x0;
    let mut steps = vec![];
    for _ in 0..4 {
        let next = tick_increment(x, Dtick::Months(3), false);
        steps.push(next - x);
        x = next;
    }
    assert_eq!(x, increment_month(x0, 12));
    let year_later = format!("{}{}", start[..4].parse::<i32>().unwrap() + 1, &start[4..]);
    assert_eq!(
        x,
        date_time_to_ms(&year_later.as_str().into(), Calendar::Gregorian).unwrap()
    );
    // quarters differ in length, the walk does not use a fixed step
    assert!(steps.iter().any(|s| *s != steps[0]));
    assert_eq!(tick_increment(x, Dtick::Months(12), true), x0);
}

#[test]
fn test_end_to_end_linear_axis() {
    let axis = Axis::new(AxisId::new(AxisLetter::X, 1), AxisType::Linear);
    let mut calc = CalcAxis::new(axis, &plot(300.0, 300.0)).unwrap();
    let data: Vec<Datum> = (1..=5).map(|v| Datum::Number(v as f64)).collect();
    let calcdata = calc.make_calcdata(&data);
    calc.expand(
        &calcdata,
        &ExpandOptions {
            padded: true,
            ppad: Some(Pad::Uniform(3.0)),
            ..Default::default()
        },
    );

    let ranged = calc.auto_range(None).unwrap();
    assert!(ranged.range[0] < 1.0 && ranged.range[1] > 5.0);
    let left = ranged.l2p(1.0);
    let right = ranged.scale.length - ranged.l2p(5.0);
    assert_approx_eq!(f64, left, right, epsilon = 0.011);
    assert_approx_eq!(f64, left, 18.0, epsilon = 0.011);

    let ticked = ranged.calc_ticks().unwrap();
    assert_eq!(ticked.ticks.dtick, Dtick::Linear(1.0));
    let values: Vec<f64> = ticked.labels().iter().map(|t| t.x).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let texts: Vec<&str> = ticked.labels().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["1", "2", "3", "4", "5"]);
}
