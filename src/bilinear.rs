//! Analog-to-digital conversion of zero-pole-gain filters.

use crate::constants::TWO_PI;
use crate::error::{FilterError, Result};
use crate::units::{Scalar, Unit};
use crate::zpk::Zpk;
use log::{trace, warn};
use num_complex::Complex64;

/// Unit of the analog roots handed to [`bilinear_zpk`], either as a typed
/// [`Unit`] or as a symbol to be parsed
#[derive(Debug, Clone, PartialEq)]
pub enum UnitArg {
    Unit(Unit),
    Symbol(String),
}

impl UnitArg {
    fn resolve(self) -> Result<Unit> {
        match self {
            UnitArg::Unit(u) => Ok(u),
            UnitArg::Symbol(s) => s.parse(),
        }
    }
}

impl From<Unit> for UnitArg {
    fn from(u: Unit) -> Self {
        UnitArg::Unit(u)
    }
}

impl From<&str> for UnitArg {
    fn from(s: &str) -> Self {
        UnitArg::Symbol(s.to_string())
    }
}

impl From<String> for UnitArg {
    fn from(s: String) -> Self {
        UnitArg::Symbol(s)
    }
}

/// Convert an analog ZPK filter to digital with the bilinear transform
///
/// Roots given in Hz are the frequencies of s-plane roots with the sign
/// convention `s = -2π·f`; roots in rad/s are used unchanged. Zeros at
/// infinity (non-finite values) are dropped, and the digital zeros are
/// padded with `-1` (Nyquist) until there are as many as there are poles.
///
/// # Errors
/// `InvalidUnit` if `unit` is neither Hz nor rad/s, or if `sample_rate`
/// carries a unit that cannot be expressed in Hz
///
/// # Example
/// ```
/// use filterdesign::bilinear::bilinear_zpk;
/// use filterdesign::units::Unit;
/// use num_complex::Complex64;
///
/// let pole = Complex64::new(1.0, 0.0);
/// let zpk = bilinear_zpk(&[], &[pole], 1.0, 100.0, Unit::Hertz).unwrap();
/// assert_eq!(zpk.zeros.len(), 1);
/// ```
pub fn bilinear_zpk(
    zeros: &[Complex64],
    poles: &[Complex64],
    gain: f64,
    sample_rate: impl Into<Scalar>,
    unit: impl Into<UnitArg>,
) -> Result<Zpk> {
    let finite: Vec<Complex64> = zeros.iter().copied().filter(|z| z.is_finite()).collect();
    if finite.len() != zeros.len() {
        warn!(
            "bilinear_zpk: dropped {} non-finite zero(s)",
            zeros.len() - finite.len()
        );
    }

    let scale = match unit.into().resolve()? {
        Unit::Hertz => -TWO_PI,
        Unit::RadiansPerSecond => 1.0,
        other => {
            return Err(FilterError::InvalidUnit(format!(
                "zpk can only be given with unit 'Hz' or 'rad/s', not '{}'",
                other
            )));
        }
    };
    let zeros: Vec<Complex64> = finite.iter().map(|z| z * scale).collect();
    let poles: Vec<Complex64> = poles.iter().map(|p| p * scale).collect();

    let fs2 = 2.0 * sample_rate.into().as_hz()?;
    trace!("bilinear_zpk: fs2={} for {} zeros, {} poles", fs2, zeros.len(), poles.len());

    let to_z = |s: &Complex64| (1.0 + s / fs2) / (1.0 - s / fs2);
    let mut dzeros: Vec<Complex64> = zeros.iter().map(to_z).collect();
    let dpoles: Vec<Complex64> = poles.iter().map(to_z).collect();
    if dzeros.len() < dpoles.len() {
        dzeros.resize(dpoles.len(), Complex64::new(-1.0, 0.0));
    }

    let num: Complex64 = zeros.iter().map(|z| fs2 - z).product();
    let den: Complex64 = poles.iter().map(|p| fs2 - p).product();
    let dgain = gain * (num / den).re;

    Ok(Zpk::new(dzeros, dpoles, dgain))
}

/// [`bilinear_zpk`] at a sample rate of 1 Hz with roots in Hz
pub fn bilinear_zpk_default(zeros: &[Complex64], poles: &[Complex64], gain: f64) -> Result<Zpk> {
    bilinear_zpk(zeros, poles, gain, 1.0, Unit::Hertz)
}
