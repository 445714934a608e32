use std::sync::Arc;

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use num_complex::Complex64;

use filterdesign::config::{DesignOptions, OutputFormat};
use filterdesign::design::{self, DesignedFilter, FilterSpec, design_iir};
use filterdesign::lti::{
    FilterRepresentation, FilterValue, FrequencyAxis, LtiHandle, SampledSeries,
    normalize_filter_input, parse_digital_lti,
};
use filterdesign::synthesis::{IirFamily, zpk2tf};
use filterdesign::{FilterError, Zpk, concatenate_zpks, is_zpk};

fn zpk_value(zpk: &Zpk) -> FilterValue {
    FilterValue::Tuple(vec![
        FilterValue::Array(zpk.zeros.clone()),
        FilterValue::Array(zpk.poles.clone()),
        FilterValue::Real(zpk.gain),
    ])
}

#[test]
fn test_designed_zpk_round_trips_through_parser() {
    let filter = design::lowpass(1000.0, 4096.0, None, &DesignOptions::default()).unwrap();
    let zpk = filter.as_zpk().unwrap();
    let value = zpk_value(zpk);

    assert!(is_zpk(&value));
    assert_eq!(&parse_digital_lti(&value, false, None).unwrap(), zpk);
}

#[test]
fn test_transfer_function_matches_zpk_response() {
    let filter = design::highpass(100.0, 4096.0, None, &DesignOptions::default()).unwrap();
    let zpk = filter.as_zpk().unwrap();
    let tf = zpk2tf(zpk).unwrap();

    let value = FilterValue::Tuple(vec![
        FilterValue::real_array(&tf.numerator),
        FilterValue::real_array(&tf.denominator),
    ]);
    let parsed = parse_digital_lti(&value, false, None).unwrap();
    assert_eq!(parsed.poles.len(), zpk.poles.len());
    for f in [200.0, 500.0, 1500.0] {
        assert_relative_eq!(
            parsed.magnitude_db(f, 4096.0),
            zpk.magnitude_db(f, 4096.0),
            epsilon = 1e-4
        );
    }
}

#[test]
fn test_analog_design_discretizes_close_to_prototype() {
    let spec = FilterSpec::new(vec![10.0], vec![50.0], 1000.0).with_analog(true);
    let analog = design_iir(&spec, IirFamily::Butter, OutputFormat::Zpk).unwrap();
    let analog = analog.as_zpk().unwrap();

    let digital = parse_digital_lti(&zpk_value(analog), true, Some(1000.0)).unwrap();
    assert!(digital.is_stable());
    assert_eq!(digital.zeros.len(), digital.poles.len());
    assert_relative_eq!(digital.magnitude_db(0.0, 1000.0), 0.0, epsilon = 1e-9);
    assert_relative_eq!(digital.magnitude_db(10.0, 1000.0), -2.0, epsilon = 0.05);
    assert!(digital.magnitude_db(50.0, 1000.0) < -30.0);
}

#[test]
fn test_analog_requires_sample_rate() {
    let value = zpk_value(&Zpk::from_real(&[], &[1.0], 1.0));
    assert!(matches!(
        parse_digital_lti(&value, true, None),
        Err(FilterError::MissingSampleRate)
    ));
    assert!(matches!(
        parse_digital_lti(&value, true, Some(0.0)),
        Err(FilterError::MissingSampleRate)
    ));
}

#[test]
fn test_provider_supplies_sample_rate() {
    let zpk = Zpk::from_real(&[], &[1.0], 1.0);
    let series = SampledSeries { sample_rate: 256.0 };
    let axis = FrequencyAxis {
        f0: 0.0,
        df: 0.125,
        len: 1025,
    };

    let from_series = normalize_filter_input(
        FilterRepresentation::Zpk(zpk.clone()),
        true,
        None,
        Some(&series),
    )
    .unwrap();
    let from_axis =
        normalize_filter_input(FilterRepresentation::Zpk(zpk.clone()), true, None, Some(&axis))
            .unwrap();
    let explicit = parse_digital_lti(&zpk_value(&zpk), true, Some(256.0)).unwrap();

    assert_eq!(from_series, explicit);
    assert_eq!(from_axis, explicit);
}

#[test]
fn test_fir_taps_normalize_to_zeros_only() {
    let filter = design::lowpass(100.0, 1024.0, None, &DesignOptions::default().fir()).unwrap();
    let taps = filter.taps().unwrap();

    let zpk = parse_digital_lti(&FilterValue::real_array(taps), false, None).unwrap();
    assert_eq!(zpk.zeros.len(), taps.len() - 1);
    assert!(zpk.poles.is_empty());
    for f in [20.0, 100.0, 300.0] {
        assert_relative_eq!(
            zpk.magnitude_db(f, 1024.0),
            filter.magnitude_db(f, 1024.0),
            epsilon = 1e-4
        );
    }

    assert!(matches!(
        parse_digital_lti(&FilterValue::real_array(taps), true, Some(1024.0)),
        Err(FilterError::UnsupportedFilter(_))
    ));
}

#[test]
fn test_state_space_input() {
    // x' = -a·x + u, y = a·x: a first-order lowpass with pole at -a
    let a = 2.0;
    let value = FilterValue::Tuple(vec![
        FilterValue::Matrix(DMatrix::from_element(1, 1, -a)),
        FilterValue::Matrix(DMatrix::from_element(1, 1, 1.0)),
        FilterValue::Matrix(DMatrix::from_element(1, 1, a)),
        FilterValue::Matrix(DMatrix::from_element(1, 1, 0.0)),
    ]);
    let zpk = parse_digital_lti(&value, false, None).unwrap();
    assert!(zpk.zeros.is_empty());
    assert_eq!(zpk.poles.len(), 1);
    assert_relative_eq!(zpk.poles[0].re, -a, epsilon = 1e-12);
    assert_relative_eq!(zpk.gain, a, epsilon = 1e-12);
}

#[test]
fn test_lti_object_input() {
    let zpk = Zpk::new(
        vec![Complex64::new(-1.0, 0.0)],
        vec![Complex64::new(0.25, 0.0)],
        0.5,
    );
    let handle: LtiHandle = Arc::new(zpk.clone());
    let parsed = parse_digital_lti(&FilterValue::Lti(handle), false, None).unwrap();
    assert_eq!(parsed, zpk);
}

#[test]
fn test_concatenated_notches_reject_both_lines() {
    let opts = Default::default();
    let first = design::notch(60.0, 4096.0, &opts).unwrap();
    let second = design::notch(120.0, 4096.0, &opts).unwrap();
    let both = concatenate_zpks(&[first.clone(), second.clone()]).unwrap();

    assert_eq!(both.poles.len(), first.poles.len() + second.poles.len());
    assert_relative_eq!(both.gain, first.gain * second.gain);
    assert!(both.magnitude_db(60.0, 4096.0) < -10.0);
    assert!(both.magnitude_db(120.0, 4096.0) < -10.0);
    assert!(both.magnitude_db(500.0, 4096.0).abs() < 1.0);
}

#[test]
fn test_designed_filter_serializes_to_json() {
    let filter = design::lowpass(
        1000.0,
        4096.0,
        None,
        &DesignOptions {
            output: OutputFormat::Sos,
            ..DesignOptions::default()
        },
    )
    .unwrap();
    let json = serde_json::to_value(&filter).unwrap();
    assert_eq!(json["form"], "sos");
    assert_eq!(json["filter"]["sections"].as_array().unwrap().len(), 2);
    assert!(matches!(filter, DesignedFilter::Sos(_)));
}
