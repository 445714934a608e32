//! High-level filter designers working in Hz.
//!
//! [`lowpass`], [`highpass`] and [`bandpass`] turn a cutoff (and optional
//! stopband edge) into a full design through [`design_iir`] or
//! [`design_fir`]; [`notch`] builds a narrow band-stop IIR filter.

mod bands;
mod fir;
mod iir;
mod notch;
mod taps;

pub use bands::{bandpass, highpass, lowpass};
pub use fir::design_fir;
pub use iir::design_iir;
pub use notch::{notch, notch_edges};
pub use taps::num_taps;

use crate::error::{FilterError, Result};
use crate::synthesis::Window;
use crate::zpk::{Sos, TransferFunction, Zpk};
use num_complex::Complex64;
use serde::Serialize;
use std::f64::consts::PI;

/// Window used when a caller asks for a windowed design without naming one
///
/// The FIR path of the designers picks Hamming on its own; this default
/// applies to callers that build a [`crate::synthesis::FirWindowSpec`]
/// from scratch.
pub const DEFAULT_WINDOW: Window = Window::Hann;

/// Band edges and tolerances of one design, in Hz
///
/// The sample rate is needed for every digital design and for FIR taps;
/// analog IIR designs can leave it unset.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// One edge (lowpass, highpass) or two (bandpass, bandstop)
    pub passband: Vec<f64>,
    /// Same length as `passband`
    pub stopband: Vec<f64>,
    /// Maximum passband loss (dB)
    pub gpass: f64,
    /// Minimum stopband attenuation (dB)
    pub gstop: f64,
    pub analog: bool,
    pub sample_rate: Option<f64>,
}

impl FilterSpec {
    pub fn new(passband: Vec<f64>, stopband: Vec<f64>, sample_rate: impl Into<Option<f64>>) -> Self {
        Self {
            passband,
            stopband,
            gpass: 2.0,
            gstop: 30.0,
            analog: false,
            sample_rate: sample_rate.into(),
        }
    }

    pub fn with_tolerances(mut self, gpass: f64, gstop: f64) -> Self {
        self.gpass = gpass;
        self.gstop = gstop;
        self
    }

    pub fn with_analog(mut self, analog: bool) -> Self {
        self.analog = analog;
        self
    }

    /// Sample rate, or `MissingSampleRate` if none was given
    pub fn sample_rate(&self) -> Result<f64> {
        self.sample_rate.ok_or(FilterError::MissingSampleRate)
    }

    pub fn nyquist(&self) -> Result<f64> {
        Ok(self.sample_rate()? / 2.0)
    }

    fn validate(&self) -> Result<()> {
        if let Some(rate) = self.sample_rate
            && !(rate > 0.0 && rate.is_finite())
        {
            return Err(FilterError::InvalidArgument(format!(
                "sample rate must be positive and finite (got {})",
                rate
            )));
        }
        if self.passband.is_empty() || self.passband.len() > 2 {
            return Err(FilterError::InvalidArgument(format!(
                "expected one or two passband edges, got {}",
                self.passband.len()
            )));
        }
        if self.passband.len() != self.stopband.len() {
            return Err(FilterError::InvalidArgument(
                "passband and stopband must have the same number of edges".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a design, in the form the options asked for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "form", content = "filter", rename_all = "lowercase")]
pub enum DesignedFilter {
    Zpk(Zpk),
    #[serde(rename = "ba")]
    TransferFunction(TransferFunction),
    Sos(Sos),
    /// FIR taps
    Fir(Vec<f64>),
}

impl DesignedFilter {
    pub fn as_zpk(&self) -> Option<&Zpk> {
        match self {
            DesignedFilter::Zpk(zpk) => Some(zpk),
            _ => None,
        }
    }

    pub fn taps(&self) -> Option<&[f64]> {
        match self {
            DesignedFilter::Fir(taps) => Some(taps),
            _ => None,
        }
    }

    /// Digital frequency response at `frequency` Hz
    ///
    /// Only meaningful for digital designs; analog ZPK roots are in the
    /// s-plane.
    pub fn response(&self, frequency: f64, sample_rate: f64) -> Complex64 {
        let z = Complex64::from_polar(1.0, 2.0 * PI * frequency / sample_rate);
        match self {
            DesignedFilter::Zpk(zpk) => zpk.evaluate(z),
            DesignedFilter::Sos(sos) => sos.evaluate(z),
            DesignedFilter::TransferFunction(tf) => {
                let zinv = z.inv();
                power_series(&tf.numerator, zinv) / power_series(&tf.denominator, zinv)
            }
            DesignedFilter::Fir(taps) => power_series(taps, z.inv()),
        }
    }

    pub fn magnitude_db(&self, frequency: f64, sample_rate: f64) -> f64 {
        20.0 * self.response(frequency, sample_rate).norm().log10()
    }
}

/// `Σ c[k]·x^k`
fn power_series(coeffs: &[f64], x: Complex64) -> Complex64 {
    coeffs
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fir_response_is_sum_at_dc() {
        let fir = DesignedFilter::Fir(vec![0.25, 0.5, 0.25]);
        assert_relative_eq!(fir.response(0.0, 100.0).re, 1.0, epsilon = 1e-12);
        assert!(fir.response(50.0, 100.0).norm() < 1e-12);
    }

    #[test]
    fn test_forms_agree_on_response() {
        let zpk = Zpk::from_real(&[-1.0], &[0.5], 0.25);
        let tf = TransferFunction::new(vec![0.25, 0.25], vec![1.0, -0.5]);
        let sos = Sos::new(vec![[0.25, 0.25, 0.0, 1.0, -0.5, 0.0]]);
        for f in [0.0, 10.0, 33.0] {
            let reference = DesignedFilter::Zpk(zpk.clone()).response(f, 100.0);
            let ba = DesignedFilter::TransferFunction(tf.clone()).response(f, 100.0);
            let biquads = DesignedFilter::Sos(sos.clone()).response(f, 100.0);
            assert_relative_eq!(ba.re, reference.re, epsilon = 1e-12);
            assert_relative_eq!(ba.im, reference.im, epsilon = 1e-12);
            assert_relative_eq!(biquads.re, reference.re, epsilon = 1e-12);
            assert_relative_eq!(biquads.im, reference.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_serialized_form_tag() {
        let json = serde_json::to_value(DesignedFilter::Fir(vec![1.0])).unwrap();
        assert_eq!(json["form"], "fir");
        let json = serde_json::to_value(DesignedFilter::TransferFunction(
            TransferFunction::new(vec![1.0], vec![1.0]),
        ))
        .unwrap();
        assert_eq!(json["form"], "ba");
    }

    #[test]
    fn test_spec_validation() {
        assert!(FilterSpec::new(vec![10.0], vec![20.0], 100.0).validate().is_ok());
        assert!(FilterSpec::new(vec![10.0], vec![20.0], 0.0).validate().is_err());
        assert!(FilterSpec::new(vec![10.0], vec![20.0, 30.0], 100.0).validate().is_err());
        assert!(FilterSpec::new(vec![], vec![], 100.0).validate().is_err());
        assert!(FilterSpec::new(vec![10.0], vec![20.0], None).validate().is_ok());
    }

    #[test]
    fn test_missing_sample_rate() {
        let spec = FilterSpec::new(vec![10.0], vec![20.0], None);
        assert!(matches!(spec.nyquist(), Err(FilterError::MissingSampleRate)));
        assert_eq!(FilterSpec::new(vec![10.0], vec![20.0], 100.0).nyquist().unwrap(), 50.0);
    }
}
