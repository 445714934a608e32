//! Normalization of arbitrary filter definitions to digital ZPK form.
//!
//! A filter can arrive as raw FIR taps, a `(zeros, poles, gain)` triple, a
//! `(numerator, denominator)` pair, an `(A, B, C, D)` state-space quadruple,
//! or an opaque [`LinearTimeInvariant`] object. [`FilterValue`] models the
//! loosely shaped input; [`FilterRepresentation`] is the typed result of
//! interpreting it. Either way the end product is a digital [`Zpk`].

use crate::bilinear::bilinear_zpk;
use crate::error::{FilterError, Result};
use crate::synthesis::{ss2zpk, tf2zpk};
use crate::units::Unit;
use crate::zpk::{StateSpace, TransferFunction, Zpk};
use log::debug;
use nalgebra::DMatrix;
use num_complex::Complex64;
use std::fmt;
use std::sync::Arc;

/// An LTI system exposing its zeros, poles and gain
pub trait LinearTimeInvariant: fmt::Debug {
    fn zeros(&self) -> Vec<Complex64>;
    fn poles(&self) -> Vec<Complex64>;
    fn gain(&self) -> f64;

    /// Canonical ZPK form, if the system provides one
    ///
    /// When `None`, the raw zeros, poles and gain are used as-is.
    fn to_zpk(&self) -> Option<Zpk> {
        None
    }
}

impl LinearTimeInvariant for Zpk {
    fn zeros(&self) -> Vec<Complex64> {
        self.zeros.clone()
    }

    fn poles(&self) -> Vec<Complex64> {
        self.poles.clone()
    }

    fn gain(&self) -> f64 {
        self.gain
    }

    fn to_zpk(&self) -> Option<Zpk> {
        Some(self.clone())
    }
}

pub type LtiHandle = Arc<dyn LinearTimeInvariant + Send + Sync>;

/// A dynamically shaped filter argument
#[derive(Debug, Clone)]
pub enum FilterValue {
    Real(f64),
    Int(i64),
    Array(Vec<Complex64>),
    Matrix(DMatrix<f64>),
    Tuple(Vec<FilterValue>),
    Lti(LtiHandle),
}

impl FilterValue {
    pub fn real_array(values: &[f64]) -> Self {
        FilterValue::Array(values.iter().map(|&v| Complex64::new(v, 0.0)).collect())
    }

    fn kind(&self) -> &'static str {
        match self {
            FilterValue::Real(_) => "real",
            FilterValue::Int(_) => "integer",
            FilterValue::Array(_) => "array",
            FilterValue::Matrix(_) => "matrix",
            FilterValue::Tuple(_) => "tuple",
            FilterValue::Lti(_) => "LTI object",
        }
    }

    fn as_scalar(&self) -> Option<f64> {
        match self {
            FilterValue::Real(v) => Some(*v),
            FilterValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn as_complex_vec(&self, what: &str) -> Result<Vec<Complex64>> {
        match self {
            FilterValue::Array(v) => Ok(v.clone()),
            other => other
                .as_scalar()
                .map(|s| vec![Complex64::new(s, 0.0)])
                .ok_or_else(|| {
                    FilterError::InvalidArgument(format!(
                        "{} must be an array, not {}",
                        what,
                        other.kind()
                    ))
                }),
        }
    }

    fn as_real_vec(&self, what: &str) -> Result<Vec<f64>> {
        let values = self.as_complex_vec(what)?;
        if values.iter().any(|v| v.im != 0.0) {
            return Err(FilterError::InvalidArgument(format!(
                "{} must be real-valued",
                what
            )));
        }
        Ok(values.iter().map(|v| v.re).collect())
    }

    fn as_matrix(&self, what: &str) -> Result<DMatrix<f64>> {
        match self {
            FilterValue::Matrix(m) => Ok(m.clone()),
            other => other
                .as_scalar()
                .map(|s| DMatrix::from_element(1, 1, s))
                .ok_or_else(|| {
                    FilterError::InvalidArgument(format!(
                        "state-space {} must be a matrix, not {}",
                        what,
                        other.kind()
                    ))
                }),
        }
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Real(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<Vec<f64>> for FilterValue {
    fn from(v: Vec<f64>) -> Self {
        FilterValue::real_array(&v)
    }
}

impl From<Vec<Complex64>> for FilterValue {
    fn from(v: Vec<Complex64>) -> Self {
        FilterValue::Array(v)
    }
}

impl From<DMatrix<f64>> for FilterValue {
    fn from(m: DMatrix<f64>) -> Self {
        FilterValue::Matrix(m)
    }
}

impl From<Zpk> for FilterValue {
    fn from(zpk: Zpk) -> Self {
        FilterValue::Tuple(vec![
            FilterValue::Array(zpk.zeros),
            FilterValue::Array(zpk.poles),
            FilterValue::Real(zpk.gain),
        ])
    }
}

impl From<TransferFunction> for FilterValue {
    fn from(tf: TransferFunction) -> Self {
        FilterValue::Tuple(vec![tf.numerator.into(), tf.denominator.into()])
    }
}

impl From<LtiHandle> for FilterValue {
    fn from(lti: LtiHandle) -> Self {
        FilterValue::Lti(lti)
    }
}

/// True if `value` is shaped like `(zeros, poles, gain)` with a real gain
///
/// An integer gain does not qualify.
pub fn is_zpk(value: &FilterValue) -> bool {
    matches!(
        value,
        FilterValue::Tuple(items)
            if items.len() == 3
                && matches!(items[0], FilterValue::Array(_))
                && matches!(items[1], FilterValue::Array(_))
                && matches!(items[2], FilterValue::Real(_))
    )
}

/// A filter definition in one of the supported forms
#[derive(Debug, Clone)]
pub enum FilterRepresentation {
    FirTaps(Vec<f64>),
    Zpk(Zpk),
    TransferFunction(TransferFunction),
    StateSpace(StateSpace),
    Lti(LtiHandle),
}

impl FilterRepresentation {
    /// Interpret a loosely shaped value by its structure
    ///
    /// A one-element tuple is unwrapped first. A flat array is FIR taps;
    /// tuples of two, three and four elements are transfer-function, ZPK
    /// and state-space definitions.
    pub fn from_value(value: &FilterValue) -> Result<Self> {
        let value = match value {
            FilterValue::Tuple(items) if items.len() == 1 => &items[0],
            other => other,
        };

        match value {
            FilterValue::Array(_) => Ok(FilterRepresentation::FirTaps(
                value.as_real_vec("FIR taps")?,
            )),
            FilterValue::Lti(lti) => Ok(FilterRepresentation::Lti(Arc::clone(lti))),
            FilterValue::Tuple(items) => match items.as_slice() {
                [b, a] => Ok(FilterRepresentation::TransferFunction(TransferFunction::new(
                    b.as_real_vec("numerator")?,
                    a.as_real_vec("denominator")?,
                ))),
                [z, p, k] => {
                    let gain = k.as_scalar().ok_or_else(|| {
                        FilterError::InvalidArgument(format!(
                            "gain must be a number, not {}",
                            k.kind()
                        ))
                    })?;
                    Ok(FilterRepresentation::Zpk(Zpk::new(
                        z.as_complex_vec("zeros")?,
                        p.as_complex_vec("poles")?,
                        gain,
                    )))
                }
                [a, b, c, d] => Ok(FilterRepresentation::StateSpace(StateSpace::new(
                    a.as_matrix("A")?,
                    b.as_matrix("B")?,
                    c.as_matrix("C")?,
                    d.as_matrix("D")?,
                ))),
                other => Err(FilterError::InvalidArgument(format!(
                    "cannot interpret a tuple of {} elements as a filter",
                    other.len()
                ))),
            },
            other => Err(FilterError::InvalidArgument(format!(
                "cannot interpret a {} as a filter",
                other.kind()
            ))),
        }
    }

    /// Zeros, poles and gain in the representation's own domain
    fn zpk(&self) -> Result<Zpk> {
        match self {
            FilterRepresentation::FirTaps(taps) => tf2zpk(taps, &[1.0]),
            FilterRepresentation::Zpk(zpk) => Ok(zpk.clone()),
            FilterRepresentation::TransferFunction(tf) => tf2zpk(&tf.numerator, &tf.denominator),
            FilterRepresentation::StateSpace(ss) => ss2zpk(ss),
            FilterRepresentation::Lti(lti) => Ok(lti
                .to_zpk()
                .unwrap_or_else(|| Zpk::new(lti.zeros(), lti.poles(), lti.gain()))),
        }
    }
}

/// Something that knows the sampling rate of the data a filter will be
/// applied to
pub trait SampleRateProvider {
    fn sample_rate(&self) -> f64;
}

/// A regularly sampled time series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledSeries {
    pub sample_rate: f64,
}

impl SampleRateProvider for SampledSeries {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

/// A frequency axis `f0, f0 + df, ...` of `len` bins
///
/// The implied sample rate is twice the highest frequency on the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyAxis {
    pub f0: f64,
    pub df: f64,
    pub len: usize,
}

impl SampleRateProvider for FrequencyAxis {
    fn sample_rate(&self) -> f64 {
        2.0 * (self.f0 + self.len.saturating_sub(1) as f64 * self.df)
    }
}

/// Reduce a filter to digital ZPK form
///
/// With `analog`, the sample rate is `sample_rate` if given (and nonzero),
/// otherwise the `provider`'s; the analog roots (in Hz) are then mapped to
/// the z-plane with [`bilinear_zpk`].
///
/// # Errors
/// - `MissingSampleRate` for an analog filter with no rate available
/// - `UnsupportedFilter` for analog FIR taps
/// - whatever the underlying conversion reports
pub fn normalize_filter_input(
    repr: FilterRepresentation,
    analog: bool,
    sample_rate: Option<f64>,
    provider: Option<&dyn SampleRateProvider>,
) -> Result<Zpk> {
    if !analog {
        return repr.zpk();
    }

    let rate = sample_rate
        .filter(|r| *r != 0.0)
        .or_else(|| provider.map(|p| p.sample_rate()))
        .filter(|r| *r != 0.0)
        .ok_or(FilterError::MissingSampleRate)?;

    if matches!(repr, FilterRepresentation::FirTaps(_)) {
        return Err(FilterError::UnsupportedFilter(
            "analog FIR filters are not representable".to_string(),
        ));
    }

    let zpk = repr.zpk()?;
    debug!(
        "converting analog filter ({} zeros, {} poles) to digital at {} Hz",
        zpk.zeros.len(),
        zpk.poles.len(),
        rate
    );
    bilinear_zpk(&zpk.zeros, &zpk.poles, zpk.gain, rate, Unit::Hertz)
}

/// Interpret `args` as a filter definition and reduce it to digital ZPK form
///
/// # Errors
/// - `MissingSampleRate` if `analog` and no (nonzero) `sample_rate`
/// - `UnsupportedFilter` for analog FIR taps
/// - `InvalidArgument` for shapes that are not a filter definition
pub fn parse_digital_lti(args: &FilterValue, analog: bool, sample_rate: Option<f64>) -> Result<Zpk> {
    if analog && sample_rate.is_none_or(|r| r == 0.0) {
        return Err(FilterError::MissingSampleRate);
    }
    let repr = FilterRepresentation::from_value(args)?;
    normalize_filter_input(repr, analog, sample_rate, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn sample_zpk() -> Zpk {
        Zpk::new(
            vec![c(-1.0), c(-1.0)],
            vec![Complex64::new(0.5, 0.3), Complex64::new(0.5, -0.3)],
            0.1,
        )
    }

    #[derive(Debug)]
    struct RawLti;

    impl LinearTimeInvariant for RawLti {
        fn zeros(&self) -> Vec<Complex64> {
            vec![c(0.25)]
        }
        fn poles(&self) -> Vec<Complex64> {
            vec![c(0.5)]
        }
        fn gain(&self) -> f64 {
            3.0
        }
    }

    #[test]
    fn test_is_zpk_structure() {
        assert!(is_zpk(&sample_zpk().into()));

        let int_gain = FilterValue::Tuple(vec![
            FilterValue::real_array(&[1.0]),
            FilterValue::real_array(&[0.5]),
            FilterValue::Int(2),
        ]);
        assert!(!is_zpk(&int_gain));

        let two = FilterValue::Tuple(vec![
            FilterValue::real_array(&[1.0]),
            FilterValue::real_array(&[1.0, 0.5]),
        ]);
        assert!(!is_zpk(&two));
        assert!(!is_zpk(&FilterValue::real_array(&[1.0, 2.0, 3.0])));
        assert!(!is_zpk(&FilterValue::Tuple(vec![
            FilterValue::Real(1.0),
            FilterValue::real_array(&[0.5]),
            FilterValue::Real(1.0),
        ])));
    }

    #[test]
    fn test_digital_zpk_passes_through() {
        let zpk = sample_zpk();
        let out = parse_digital_lti(&zpk.clone().into(), false, None).unwrap();
        assert_eq!(out, zpk);
    }

    #[test]
    fn test_single_element_tuple_is_unwrapped() {
        let zpk = sample_zpk();
        let wrapped = FilterValue::Tuple(vec![zpk.clone().into()]);
        assert_eq!(parse_digital_lti(&wrapped, false, None).unwrap(), zpk);
    }

    #[test]
    fn test_integer_gain_accepted_by_parser() {
        let value = FilterValue::Tuple(vec![
            FilterValue::real_array(&[]),
            FilterValue::real_array(&[0.5]),
            FilterValue::Int(2),
        ]);
        let zpk = parse_digital_lti(&value, false, None).unwrap();
        assert_eq!(zpk.gain, 2.0);
    }

    #[test]
    fn test_fir_taps() {
        let zpk = parse_digital_lti(&vec![1.0, -0.5].into(), false, None).unwrap();
        assert!(zpk.poles.is_empty());
        assert_eq!(zpk.zeros.len(), 1);
        assert_relative_eq!(zpk.zeros[0].re, 0.5, epsilon = 1e-12);
        assert_relative_eq!(zpk.gain, 1.0);
    }

    #[test]
    fn test_analog_fir_is_rejected() {
        let err = parse_digital_lti(&vec![1.0, 2.0].into(), true, Some(100.0)).unwrap_err();
        assert!(matches!(err, FilterError::UnsupportedFilter(_)));
    }

    #[test]
    fn test_analog_without_rate_is_rejected() {
        let err = parse_digital_lti(&sample_zpk().into(), true, None).unwrap_err();
        assert_eq!(err, FilterError::MissingSampleRate);
        let err = parse_digital_lti(&sample_zpk().into(), true, Some(0.0)).unwrap_err();
        assert_eq!(err, FilterError::MissingSampleRate);
    }

    #[test]
    fn test_complex_taps_are_rejected() {
        let taps = FilterValue::Array(vec![Complex64::new(1.0, 1.0)]);
        assert!(matches!(
            parse_digital_lti(&taps, false, None),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_transfer_function_pair() {
        let tf = TransferFunction::new(vec![1.0, 1.0], vec![1.0, -0.5]);
        let zpk = parse_digital_lti(&tf.into(), false, None).unwrap();
        assert_relative_eq!(zpk.zeros[0].re, -1.0, epsilon = 1e-12);
        assert_relative_eq!(zpk.poles[0].re, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_state_space_quadruple() {
        let value = FilterValue::Tuple(vec![
            FilterValue::Real(0.5),
            FilterValue::Real(1.0),
            FilterValue::Real(1.0),
            FilterValue::Real(0.0),
        ]);
        let zpk = parse_digital_lti(&value, false, None).unwrap();
        assert!(zpk.zeros.is_empty());
        assert_relative_eq!(zpk.poles[0].re, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_shapes_are_rejected() {
        let five = FilterValue::Tuple(vec![FilterValue::Real(1.0); 5]);
        assert!(matches!(
            parse_digital_lti(&five, false, None),
            Err(FilterError::InvalidArgument(_))
        ));
        assert!(parse_digital_lti(&FilterValue::Real(1.0), false, None).is_err());
    }

    #[test]
    fn test_lti_without_canonical_form_uses_raw_roots() {
        let lti: LtiHandle = Arc::new(RawLti);
        let zpk = parse_digital_lti(&lti.into(), false, None).unwrap();
        assert_eq!(zpk, Zpk::new(vec![c(0.25)], vec![c(0.5)], 3.0));
    }

    #[test]
    fn test_provider_supplies_rate() {
        let repr = FilterRepresentation::Zpk(Zpk::new(vec![], vec![c(1.0)], 1.0));
        let series = SampledSeries { sample_rate: 100.0 };
        let out = normalize_filter_input(repr.clone(), true, None, Some(&series)).unwrap();
        let direct = bilinear_zpk(&[], &[c(1.0)], 1.0, 100.0, Unit::Hertz).unwrap();
        assert_eq!(out, direct);

        let err = normalize_filter_input(repr, true, None, None).unwrap_err();
        assert_eq!(err, FilterError::MissingSampleRate);
    }

    #[test]
    fn test_frequency_axis_rate() {
        let axis = FrequencyAxis {
            f0: 0.0,
            df: 0.5,
            len: 2049,
        };
        assert_eq!(axis.sample_rate(), 2048.0);
    }
}
