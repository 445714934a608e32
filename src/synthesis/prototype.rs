//! Analog lowpass prototypes with a 1 rad/s critical frequency.
//!
//! - Butterworth: maximally flat, -3 dB at 1 rad/s
//! - Chebyshev I: equiripple passband, `-rp` dB at 1 rad/s
//! - Chebyshev II: equiripple stopband, `-rs` dB at 1 rad/s
//! - Elliptic: equiripple in both bands, `-rp` dB at 1 rad/s

use super::special::{arc_jac_sc1, ellipdeg, ellipj, ellipk, pow10m1};
use crate::constants::ELLIP_EPSILON;
use crate::error::{FilterError, Result};
use crate::zpk::Zpk;
use num_complex::Complex64;
use std::f64::consts::PI;

fn neg_product(roots: &[Complex64]) -> Complex64 {
    roots.iter().map(|r| -r).product()
}

/// `m = -N+1, -N+3, ..., N-1`
fn symmetric_indices(order: usize) -> impl Iterator<Item = f64> {
    let n = order as i64;
    (0..n).map(move |i| (-n + 1 + 2 * i) as f64)
}

pub fn buttap(order: usize) -> Zpk {
    let n = order as f64;
    let poles = symmetric_indices(order)
        .map(|m| -(Complex64::new(0.0, PI * m / (2.0 * n))).exp())
        .collect();
    Zpk::new(Vec::new(), poles, 1.0)
}

pub fn cheb1ap(order: usize, rp: f64) -> Zpk {
    if order == 0 {
        // Even order, so the DC gain sits at the bottom of the ripple.
        return Zpk::new(Vec::new(), Vec::new(), 10f64.powf(-rp / 20.0));
    }

    let n = order as f64;
    let eps = pow10m1(0.1 * rp).sqrt();
    let mu = (1.0 / eps).asinh() / n;

    // Poles on an ellipse in the left half plane
    let poles: Vec<Complex64> = symmetric_indices(order)
        .map(|m| -(Complex64::new(mu, PI * m / (2.0 * n))).sinh())
        .collect();

    let mut gain = neg_product(&poles).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }

    Zpk::new(Vec::new(), poles, gain)
}

pub fn cheb2ap(order: usize, rs: f64) -> Zpk {
    if order == 0 {
        return Zpk::new(Vec::new(), Vec::new(), 1.0);
    }

    let n = order as f64;
    let de = 1.0 / pow10m1(0.1 * rs).sqrt();
    let mu = (1.0 / de).asinh() / n;

    // Zeros on the imaginary axis; odd orders skip the zero at infinity (m = 0)
    let zeros: Vec<Complex64> = symmetric_indices(order)
        .filter(|&m| m != 0.0)
        .map(|m| -(Complex64::i() / (m * PI / (2.0 * n)).sin()).conj())
        .collect();

    // Butterworth circle warped onto the Chebyshev ellipse, then inverted
    let poles: Vec<Complex64> = symmetric_indices(order)
        .map(|m| -(Complex64::new(0.0, PI * m / (2.0 * n))).exp())
        .map(|p| Complex64::new(mu.sinh() * p.re, mu.cosh() * p.im).inv())
        .collect();

    let gain = (neg_product(&poles) / neg_product(&zeros)).re;

    Zpk::new(zeros, poles, gain)
}

pub fn ellipap(order: usize, rp: f64, rs: f64) -> Result<Zpk> {
    if order == 0 {
        return Ok(Zpk::new(Vec::new(), Vec::new(), 10f64.powf(-rp / 20.0)));
    }
    if order == 1 {
        let p = -(1.0 / pow10m1(0.1 * rp)).sqrt();
        return Ok(Zpk::new(Vec::new(), vec![Complex64::new(p, 0.0)], -p));
    }

    let eps_sq = pow10m1(0.1 * rp);
    let eps = eps_sq.sqrt();
    let ck1_sq = eps_sq / pow10m1(0.1 * rs);
    if ck1_sq == 0.0 {
        return Err(FilterError::FilterDesign(
            "Cannot design a filter with the given rp and rs".to_string(),
        ));
    }

    let k1 = ellipk(ck1_sq);
    let m = ellipdeg(order, ck1_sq);
    let capk = ellipk(m);
    let n = order as f64;

    let jacobi: Vec<(f64, f64, f64)> = (1 - order % 2..order)
        .step_by(2)
        .map(|j| {
            let (s, c, d, _) = ellipj(j as f64 * capk / n, m);
            (s, c, d)
        })
        .collect();

    let mut zeros: Vec<Complex64> = jacobi
        .iter()
        .filter(|(s, _, _)| s.abs() > ELLIP_EPSILON)
        .map(|(s, _, _)| Complex64::new(0.0, 1.0 / (m.sqrt() * s)))
        .collect();
    let conj_zeros: Vec<Complex64> = zeros.iter().map(|z| z.conj()).collect();
    zeros.extend(conj_zeros);

    let r = arc_jac_sc1(1.0 / eps, ck1_sq)?;
    let v0 = capk * r / (n * k1);
    let (sv, cv, dv, _) = ellipj(v0, 1.0 - m);

    let mut poles: Vec<Complex64> = jacobi
        .iter()
        .map(|&(s, c, d)| {
            -Complex64::new(c * d * sv * cv, s * dv) / (1.0 - (d * sv).powi(2))
        })
        .collect();

    let conj_poles: Vec<Complex64> = if order % 2 == 1 {
        let norm = poles.iter().map(|p| p.norm_sqr()).sum::<f64>().sqrt();
        poles
            .iter()
            .filter(|p| p.im.abs() > ELLIP_EPSILON * norm)
            .map(|p| p.conj())
            .collect()
    } else {
        poles.iter().map(|p| p.conj()).collect()
    };
    poles.extend(conj_poles);

    let mut gain = (neg_product(&poles) / neg_product(&zeros)).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps_sq).sqrt();
    }

    Ok(Zpk::new(zeros, poles, gain))
}
