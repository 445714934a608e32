//! Conversions between zero-pole-gain, polynomial, state-space and
//! second-order-section forms.

use crate::constants::CONJUGATE_TOLERANCE;
use crate::error::{FilterError, Result};
use crate::zpk::{Sos, StateSpace, TransferFunction, Zpk};
use log::{trace, warn};
use nalgebra::DMatrix;
use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Monic polynomial with the given roots, highest power first
pub fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for r in roots {
        coeffs.push(ZERO);
        for i in (1..coeffs.len()).rev() {
            coeffs[i] = coeffs[i] - r * coeffs[i - 1];
        }
    }
    coeffs
}

/// Real monic polynomial with the given roots
///
/// # Errors
/// `InvalidArgument` if the roots are not closed under conjugation
pub fn real_poly(roots: &[Complex64]) -> Result<Vec<f64>> {
    let (complex, real) = cplxreal(roots, CONJUGATE_TOLERANCE)?;
    let paired: Vec<Complex64> = complex
        .iter()
        .flat_map(|z| [*z, z.conj()])
        .chain(real.iter().map(|&r| Complex64::new(r, 0.0)))
        .collect();
    Ok(poly(&paired).iter().map(|c| c.re).collect())
}

/// Roots of a real polynomial (highest power first), as eigenvalues of its
/// companion matrix
pub fn roots(coeffs: &[f64]) -> Vec<Complex64> {
    let Some(first) = coeffs.iter().position(|&c| c != 0.0) else {
        return Vec::new();
    };
    let last = coeffs.iter().rposition(|&c| c != 0.0).unwrap_or(first);
    let trailing = coeffs.len() - 1 - last;
    let coeffs = &coeffs[first..=last];

    let n = coeffs.len() - 1;
    let mut out = Vec::with_capacity(n + trailing);
    if n > 0 {
        let companion = DMatrix::from_fn(n, n, |i, j| {
            if i == 0 {
                -coeffs[j + 1] / coeffs[0]
            } else if i == j + 1 {
                1.0
            } else {
                0.0
            }
        });
        out.extend(companion.complex_eigenvalues().iter().copied());
    }
    out.extend(std::iter::repeat_n(ZERO, trailing));
    out
}

/// Split roots into complex-conjugate pairs and purely real roots
///
/// Each pair is returned once, as the member with positive imaginary part,
/// with both halves averaged. Pairs are sorted by real part, then by
/// imaginary magnitude; real roots are sorted ascending.
///
/// # Errors
/// `InvalidArgument` if a complex root has no matching conjugate
pub fn cplxreal(z: &[Complex64], tol: f64) -> Result<(Vec<Complex64>, Vec<f64>)> {
    let mut real = Vec::new();
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    for &r in z {
        if r.im.abs() <= tol * r.norm() {
            real.push(r.re);
        } else if r.im > 0.0 {
            positive.push(r);
        } else {
            negative.push(r);
        }
    }

    if positive.len() != negative.len() {
        return Err(FilterError::InvalidArgument(
            "array contains complex value with no matching conjugate".to_string(),
        ));
    }

    let mut complex = Vec::with_capacity(positive.len());
    for zp in positive {
        let (idx, dist) = negative
            .iter()
            .enumerate()
            .map(|(i, zn)| (i, (zp - zn.conj()).norm()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| {
                FilterError::InvalidArgument("unpaired complex root".to_string())
            })?;
        if dist > tol * zp.norm() {
            return Err(FilterError::InvalidArgument(format!(
                "complex root {} has no matching conjugate",
                zp
            )));
        }
        let zn = negative.swap_remove(idx);
        complex.push((zp + zn.conj()) / 2.0);
    }

    complex.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.abs().total_cmp(&b.im.abs())));
    real.sort_by(f64::total_cmp);
    Ok((complex, real))
}

pub fn zpk2tf(zpk: &Zpk) -> Result<TransferFunction> {
    let numerator = real_poly(&zpk.zeros)?
        .into_iter()
        .map(|c| c * zpk.gain)
        .collect();
    let denominator = real_poly(&zpk.poles)?;
    Ok(TransferFunction::new(numerator, denominator))
}

/// Zeros, poles and gain of `b(x) / a(x)`
///
/// Leading zeros of either polynomial are stripped first.
pub fn tf2zpk(b: &[f64], a: &[f64]) -> Result<Zpk> {
    let Some(a_start) = a.iter().position(|&c| c != 0.0) else {
        return Err(FilterError::InvalidArgument(
            "denominator must have at least one nonzero element".to_string(),
        ));
    };
    let a = &a[a_start..];

    let Some(b_start) = b.iter().position(|&c| c != 0.0) else {
        warn!("numerator is identically zero");
        return Ok(Zpk::new(Vec::new(), roots(a), 0.0));
    };
    if b_start > 0 {
        warn!(
            "badly conditioned filter coefficients: stripped {} leading zero(s) from numerator",
            b_start
        );
    }
    let b = &b[b_start..];

    let gain = b[0] / a[0];
    let zpk = Zpk::new(roots(b), roots(a), gain);
    trace!(
        "tf2zpk: {} zeros, {} poles, gain {}",
        zpk.zeros.len(),
        zpk.poles.len(),
        gain
    );
    Ok(zpk)
}

/// Zero-pole-gain form of a single-input, single-output state-space system
pub fn ss2zpk(ss: &StateSpace) -> Result<Zpk> {
    let n = ss.a.nrows();
    if ss.a.ncols() != n
        || ss.b.shape() != (n, 1)
        || ss.c.shape() != (1, n)
        || ss.d.shape() != (1, 1)
    {
        return Err(FilterError::InvalidArgument(format!(
            "state-space matrices must be SISO with A {n}x{n}, B {n}x1, C 1x{n}, D 1x1; got A {:?}, B {:?}, C {:?}, D {:?}",
            ss.a.shape(),
            ss.b.shape(),
            ss.c.shape(),
            ss.d.shape()
        )));
    }

    let d = ss.d[(0, 0)];
    if n == 0 {
        return tf2zpk(&[d], &[1.0]);
    }

    let den: Vec<f64> = poly(ss.a.complex_eigenvalues().as_slice())
        .iter()
        .map(|c| c.re)
        .collect();
    let feedback = &ss.a - &ss.b * &ss.c;
    let num: Vec<f64> = poly(feedback.complex_eigenvalues().as_slice())
        .iter()
        .zip(&den)
        .map(|(p, q)| p.re + (d - 1.0) * q)
        .collect();

    // With D = 0 the leading coefficients cancel; clear the rounding residue.
    let scale = num.iter().fold(0.0f64, |m, c| m.max(c.abs()));
    let start = num
        .iter()
        .position(|c| c.abs() > 1e-14 * scale)
        .unwrap_or(num.len());

    tf2zpk(&num[start..], &den)
}

#[derive(Clone, Copy, PartialEq)]
enum Pick {
    Any,
    Real,
    Complex,
}

fn is_real(z: &Complex64) -> bool {
    z.im == 0.0
}

/// Index of the root in `from` closest to `to`, restricted by kind
fn nearest(from: &[Complex64], to: Complex64, pick: Pick) -> Option<usize> {
    from.iter()
        .enumerate()
        .filter(|(_, z)| match pick {
            Pick::Any => true,
            Pick::Real => is_real(z),
            Pick::Complex => !is_real(z),
        })
        .map(|(i, z)| (i, (z - to).norm()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn take_nearest(from: &mut Vec<Complex64>, to: Complex64, pick: Pick) -> Result<Complex64> {
    let idx = nearest(from, to, pick).ok_or_else(|| {
        FilterError::InvalidArgument("zeros and poles cannot be paired into sections".to_string())
    })?;
    Ok(from.remove(idx))
}

fn section(zeros: &[Complex64], poles: &[Complex64]) -> [f64; 6] {
    let b = poly(zeros);
    let a = poly(poles);
    let mut row = [0.0; 6];
    for (i, c) in b.iter().enumerate() {
        row[3 - b.len() + i] = c.re;
    }
    for (i, c) in a.iter().enumerate() {
        row[6 - a.len() + i] = c.re;
    }
    row
}

/// Group a digital filter's roots into biquads
///
/// Poles closest to the unit circle are paired first, each with its nearest
/// zero, and land in the last section. The gain is folded into the first
/// section's numerator.
pub fn zpk2sos(zpk: &Zpk) -> Result<Sos> {
    if zpk.zeros.is_empty() && zpk.poles.is_empty() {
        return Ok(Sos::new(vec![[zpk.gain, 0.0, 0.0, 1.0, 0.0, 0.0]]));
    }

    let mut z = zpk.zeros.clone();
    let mut p = zpk.poles.clone();
    let len = z.len().max(p.len());
    z.resize(len, ZERO);
    p.resize(len, ZERO);
    let n_sections = len.div_ceil(2);
    if len % 2 == 1 {
        z.push(ZERO);
        p.push(ZERO);
    }

    let flatten = |(c, r): (Vec<Complex64>, Vec<f64>)| -> Vec<Complex64> {
        c.into_iter()
            .chain(r.into_iter().map(|x| Complex64::new(x, 0.0)))
            .collect()
    };
    let mut z = flatten(cplxreal(&z, CONJUGATE_TOLERANCE)?);
    let mut p = flatten(cplxreal(&p, CONJUGATE_TOLERANCE)?);

    let mut sections = vec![[0.0; 6]; n_sections];
    for si in (0..n_sections).rev() {
        let p1_idx = p
            .iter()
            .enumerate()
            .map(|(i, x)| (i, (1.0 - x.norm()).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
            .ok_or_else(|| FilterError::InvalidArgument("ran out of poles".to_string()))?;
        let p1 = p.remove(p1_idx);
        let real_poles = p.iter().filter(|x| is_real(x)).count();
        let real_zeros = z.iter().filter(|x| is_real(x)).count();

        sections[si] = if is_real(&p1) && real_poles == 0 {
            // Last real pole pairs with the nearest real zero
            let z1 = take_nearest(&mut z, p1, Pick::Real)?;
            section(&[z1, ZERO], &[p1, ZERO])
        } else if p.len() + 1 == z.len() && !is_real(&p1) && real_poles == 1 && real_zeros == 1 {
            // The remaining real zero must stay for the remaining real pole
            let z1 = take_nearest(&mut z, p1, Pick::Complex)?;
            section(&[z1, z1.conj()], &[p1, p1.conj()])
        } else {
            let p2 = if is_real(&p1) {
                take_nearest(&mut p, p1, Pick::Real)?
            } else {
                p1.conj()
            };
            if z.is_empty() {
                section(&[], &[p1, p2])
            } else {
                let z1 = take_nearest(&mut z, p1, Pick::Any)?;
                if !is_real(&z1) {
                    section(&[z1, z1.conj()], &[p1, p2])
                } else if z.is_empty() {
                    section(&[z1], &[p1, p2])
                } else {
                    let z2 = take_nearest(&mut z, p1, Pick::Real)?;
                    section(&[z1, z2], &[p1, p2])
                }
            }
        };
    }

    if !p.is_empty() || !z.is_empty() {
        return Err(FilterError::InvalidArgument(
            "zeros and poles cannot be paired into sections".to_string(),
        ));
    }

    for c in &mut sections[0][..3] {
        *c *= zpk.gain;
    }
    Ok(Sos::new(sections))
}
