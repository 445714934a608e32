//! Filter representations and ZPK composition.

use crate::error::{FilterError, Result};
use nalgebra::DMatrix;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Zero-pole-gain filter
///
/// Whether the roots live in the s-plane (analog) or z-plane (digital) is a
/// property of the context the filter is used in, not of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Zpk {
    pub fn new(zeros: Vec<Complex64>, poles: Vec<Complex64>, gain: f64) -> Self {
        Self { zeros, poles, gain }
    }

    /// Build from purely real roots
    pub fn from_real(zeros: &[f64], poles: &[f64], gain: f64) -> Self {
        Self {
            zeros: zeros.iter().map(|&z| Complex64::new(z, 0.0)).collect(),
            poles: poles.iter().map(|&p| Complex64::new(p, 0.0)).collect(),
            gain,
        }
    }

    /// Number of poles minus number of zeros
    pub fn relative_degree(&self) -> isize {
        self.poles.len() as isize - self.zeros.len() as isize
    }

    /// Evaluate `H(x) = k · Π(x − z) / Π(x − p)` at an arbitrary complex point
    pub fn evaluate(&self, x: Complex64) -> Complex64 {
        let num: Complex64 = self.zeros.iter().map(|z| x - z).product();
        let den: Complex64 = self.poles.iter().map(|p| x - p).product();
        self.gain * num / den
    }

    /// Digital frequency response at `frequency` Hz for data sampled at `sample_rate`
    pub fn response(&self, frequency: f64, sample_rate: f64) -> Complex64 {
        let w = 2.0 * PI * frequency / sample_rate;
        self.evaluate(Complex64::from_polar(1.0, w))
    }

    /// Digital magnitude response in dB
    pub fn magnitude_db(&self, frequency: f64, sample_rate: f64) -> f64 {
        20.0 * self.response(frequency, sample_rate).norm().log10()
    }

    /// True if every pole lies strictly inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.norm() < 1.0)
    }
}

/// Polynomial (numerator / denominator) form, highest power first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    pub numerator: Vec<f64>,
    pub denominator: Vec<f64>,
}

impl TransferFunction {
    pub fn new(numerator: Vec<f64>, denominator: Vec<f64>) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Evaluate `B(x) / A(x)`
    pub fn evaluate(&self, x: Complex64) -> Complex64 {
        horner(&self.numerator, x) / horner(&self.denominator, x)
    }
}

/// Cascade of biquads, each row `[b0, b1, b2, a0, a1, a2]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sos {
    pub sections: Vec<[f64; 6]>,
}

impl Sos {
    pub fn new(sections: Vec<[f64; 6]>) -> Self {
        Self { sections }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Evaluate the cascade at `x`, treating each row as a polynomial pair
    /// in descending powers of `x`
    pub fn evaluate(&self, x: Complex64) -> Complex64 {
        self.sections
            .iter()
            .map(|s| horner(&s[..3], x) / horner(&s[3..], x))
            .product()
    }
}

/// Single-input, single-output state-space system
///
/// `x' = A·x + B·u`, `y = C·x + D·u`
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    pub a: DMatrix<f64>,
    pub b: DMatrix<f64>,
    pub c: DMatrix<f64>,
    pub d: DMatrix<f64>,
}

impl StateSpace {
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>, c: DMatrix<f64>, d: DMatrix<f64>) -> Self {
        Self { a, b, c, d }
    }
}

pub(crate) fn horner(coeffs: &[f64], x: Complex64) -> Complex64 {
    coeffs
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * x + c)
}

/// Combine several ZPK filters into one
///
/// Zeros and poles are concatenated in input order; the gain is the product
/// of all gains.
///
/// # Errors
/// Returns `FilterError::InvalidArgument` if `filters` is empty
///
/// # Example
/// ```
/// use filterdesign::{Zpk, concatenate_zpks};
///
/// let a = Zpk::from_real(&[1.0], &[0.5], 2.0);
/// let b = Zpk::from_real(&[], &[0.1, 0.2], 3.0);
/// let c = concatenate_zpks(&[a, b]).unwrap();
/// assert_eq!(c.gain, 6.0);
/// assert_eq!(c.poles.len(), 3);
/// ```
pub fn concatenate_zpks(filters: &[Zpk]) -> Result<Zpk> {
    if filters.is_empty() {
        return Err(FilterError::InvalidArgument(
            "concatenate_zpks requires at least one filter".to_string(),
        ));
    }

    let zeros = filters.iter().flat_map(|f| f.zeros.iter().copied()).collect();
    let poles = filters.iter().flat_map(|f| f.poles.iter().copied()).collect();
    let gain = filters.iter().fold(1.0, |acc, f| acc * f.gain);

    Ok(Zpk { zeros, poles, gain })
}
