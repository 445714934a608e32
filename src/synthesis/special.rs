//! Special functions needed by the elliptic prototype and the Kaiser window.
//!
//! Complete elliptic integrals use the arithmetic-geometric mean, Jacobi
//! elliptic functions use the descending Landen / AGM scheme
//! (Abramowitz & Stegun 16.4), and the modular degree equation is solved
//! with nome series.

use crate::error::{FilterError, Result};
use num_complex::Complex64;
use std::f64::consts::{FRAC_PI_2, PI};

const AGM_MAX_ITER: usize = 64;
const ELLIPJ_MAX_ITER: usize = 8;
const ELLIPDEG_MMAX: i32 = 7;
const ARC_JAC_SN_MAX_ITER: usize = 10;

fn agm(mut a: f64, mut b: f64) -> f64 {
    for _ in 0..AGM_MAX_ITER {
        if (a - b).abs() <= f64::EPSILON * a.abs() {
            break;
        }
        let next_b = (a * b).sqrt();
        a = 0.5 * (a + b);
        b = next_b;
    }
    a
}

/// Complete elliptic integral of the first kind, `K(m)`, with parameter `m = k²`
pub fn ellipk(m: f64) -> f64 {
    if m >= 1.0 {
        return f64::INFINITY;
    }
    FRAC_PI_2 / agm(1.0, (1.0 - m).sqrt())
}

/// `K(1 - p)`, accurate for small `p`
pub fn ellipkm1(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::INFINITY;
    }
    FRAC_PI_2 / agm(1.0, p.sqrt())
}

/// Jacobi elliptic functions `(sn, cn, dn, am)` of `u` with parameter `m`
pub fn ellipj(u: f64, m: f64) -> (f64, f64, f64, f64) {
    if m < 1e-9 {
        let t = u.sin();
        let b = u.cos();
        let ai = 0.25 * m * (u - t * b);
        return (t - ai * b, b + ai * t, 1.0 - 0.5 * m * t * t, u - ai);
    }

    if m >= 0.999_999_999_9 {
        let mut ai = 0.25 * (1.0 - m);
        let b = u.cosh();
        let t = u.tanh();
        let phi = 1.0 / b;
        let twon = b * u.sinh();
        let sn = t + ai * (twon - u) / (b * b);
        let am = 2.0 * u.exp().atan() - FRAC_PI_2 + ai * (twon - u) / b;
        ai *= t * phi;
        let cn = phi - ai * (twon - u);
        let dn = phi + ai * (twon + u);
        return (sn, cn, dn, am);
    }

    let mut a = [0.0f64; ELLIPJ_MAX_ITER + 2];
    let mut c = [0.0f64; ELLIPJ_MAX_ITER + 2];
    a[0] = 1.0;
    c[0] = m.sqrt();
    let mut b = (1.0 - m).sqrt();
    let mut twon = 1.0;
    let mut i = 0;

    while (c[i] / a[i]).abs() > f64::EPSILON {
        if i > ELLIPJ_MAX_ITER - 1 {
            break;
        }
        let ai = a[i];
        i += 1;
        c[i] = 0.5 * (ai - b);
        let t = (ai * b).sqrt();
        a[i] = 0.5 * (ai + b);
        b = t;
        twon *= 2.0;
    }

    let mut phi = twon * a[i] * u;
    let mut prev = phi;
    while i > 0 {
        let t = c[i] * phi.sin() / a[i];
        prev = phi;
        phi = 0.5 * (t.asin() + phi);
        i -= 1;
    }

    let sn = phi.sin();
    let cn = phi.cos();
    let dn = cn / (phi - prev).cos();
    (sn, cn, dn, phi)
}

/// Solve the degree equation: the parameter `m` of a degree-`n` elliptic
/// filter whose selectivity parameter is `m1`
pub fn ellipdeg(n: usize, m1: f64) -> f64 {
    let k1 = ellipk(m1);
    let k1p = ellipkm1(m1);
    let q1 = (-PI * k1p / k1).exp();
    let q = q1.powf(1.0 / n as f64);

    let num: f64 = (0..=ELLIPDEG_MMAX).map(|m| q.powi(m * (m + 1))).sum();
    let den: f64 = 1.0 + 2.0 * (1..=ELLIPDEG_MMAX + 1).map(|m| q.powi(m * m)).sum::<f64>();

    16.0 * q * (num / den).powi(4)
}

/// Inverse Jacobi `sn` for complex argument, via descending Landen transforms
fn arc_jac_sn(w: Complex64, m: f64) -> Result<Complex64> {
    let complement = |kx: Complex64| ((1.0 - kx) * (1.0 + kx)).sqrt();

    let k = m.sqrt();
    if k > 1.0 {
        return Err(FilterError::FilterDesign(format!(
            "inverse sn undefined for modulus {}",
            k
        )));
    }
    if k == 1.0 {
        return Ok(w.atanh());
    }

    let mut ks = vec![k];
    while let Some(&last) = ks.last() {
        if last == 0.0 {
            break;
        }
        if ks.len() > ARC_JAC_SN_MAX_ITER {
            return Err(FilterError::FilterDesign(
                "Landen transformation not converging".to_string(),
            ));
        }
        let kp = ((1.0 - last) * (1.0 + last)).sqrt();
        ks.push((1.0 - kp) / (1.0 + kp));
    }

    let capk: f64 = ks[1..].iter().map(|k| 1.0 + k).product::<f64>() * FRAC_PI_2;

    let mut wn = w;
    for pair in ks.windows(2) {
        let (kn, knext) = (pair[0], pair[1]);
        wn = 2.0 * wn / ((1.0 + knext) * (1.0 + complement(kn * wn)));
    }

    Ok(capk * 2.0 / PI * wn.asin())
}

/// Real inverse Jacobi `sc` with complementary parameter: `sc(z, 1 - m) = w`
pub fn arc_jac_sc1(w: f64, m: f64) -> Result<f64> {
    let z = arc_jac_sn(Complex64::new(0.0, w), m)?;
    if z.re.abs() > 1e-14 {
        return Err(FilterError::FilterDesign(format!(
            "inverse sc produced a non-imaginary result ({})",
            z
        )));
    }
    Ok(z.im)
}

/// Modified Bessel function of the first kind, order zero
pub fn bessel_i0(x: f64) -> f64 {
    let half = 0.5 * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    while term > sum * 1e-17 {
        term *= (half / k) * (half / k);
        sum += term;
        k += 1.0;
    }
    sum
}

/// `10^x - 1` without cancellation for small `x`
pub fn pow10m1(x: f64) -> f64 {
    (std::f64::consts::LN_10 * x).exp_m1()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ellipk_reference_values() {
        assert_relative_eq!(ellipk(0.0), FRAC_PI_2, epsilon = 1e-15);
        assert_relative_eq!(ellipk(0.5), 1.854_074_677_301_372, epsilon = 1e-13);
        assert_relative_eq!(ellipkm1(0.5), ellipk(0.5), epsilon = 1e-13);
        assert!(ellipk(1.0).is_infinite());
    }

    #[test]
    fn test_ellipj_identities() {
        for &m in &[0.0, 0.1, 0.5, 0.9, 0.999] {
            for &u in &[0.1, 0.7, 1.3] {
                let (sn, cn, dn, _) = ellipj(u, m);
                assert_relative_eq!(sn * sn + cn * cn, 1.0, epsilon = 1e-12);
                assert_relative_eq!(dn * dn + m * sn * sn, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_ellipj_reduces_to_trig_at_zero_parameter() {
        let (sn, cn, dn, am) = ellipj(0.8, 0.0);
        assert_relative_eq!(sn, 0.8f64.sin(), epsilon = 1e-15);
        assert_relative_eq!(cn, 0.8f64.cos(), epsilon = 1e-15);
        assert_relative_eq!(dn, 1.0, epsilon = 1e-15);
        assert_relative_eq!(am, 0.8, epsilon = 1e-15);
    }

    #[test]
    fn test_ellipj_quarter_period() {
        let m = 0.3;
        let (sn, cn, _, _) = ellipj(ellipk(m), m);
        assert_relative_eq!(sn, 1.0, epsilon = 1e-12);
        assert!(cn.abs() < 1e-7);
    }

    #[test]
    fn test_arc_jac_sc1_inverts_sc() {
        let m = 0.2;
        let w = 0.75;
        let z = arc_jac_sc1(w, m).unwrap();
        let (sn, cn, _, _) = ellipj(z, 1.0 - m);
        assert_relative_eq!(sn / cn, w, epsilon = 1e-10);
    }

    #[test]
    fn test_bessel_i0() {
        assert_eq!(bessel_i0(0.0), 1.0);
        assert_relative_eq!(bessel_i0(1.0), 1.266_065_877_752_008_4, epsilon = 1e-14);
        assert_relative_eq!(bessel_i0(5.0), 27.239_871_823_604_45, epsilon = 1e-12);
    }

    #[test]
    fn test_pow10m1() {
        assert_relative_eq!(pow10m1(0.1), 10f64.powf(0.1) - 1.0, epsilon = 1e-14);
        assert_relative_eq!(pow10m1(1e-12), std::f64::consts::LN_10 * 1e-12, epsilon = 1e-22);
    }
}
