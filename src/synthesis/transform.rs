//! Analog frequency transforms and the sampling-rate form of the bilinear
//! transform, all in zero-pole-gain form.

use crate::error::{FilterError, Result};
use crate::zpk::Zpk;
use num_complex::Complex64;

fn degree(zpk: &Zpk) -> Result<usize> {
    usize::try_from(zpk.relative_degree()).map_err(|_| {
        FilterError::InvalidArgument(
            "improper transfer function: more zeros than poles".to_string(),
        )
    })
}

fn neg_product(roots: &[Complex64]) -> Complex64 {
    roots.iter().map(|r| -r).product()
}

/// Shift each root from baseband to `+wo` and `-wo`, doubling the list
fn split_around(roots: &[Complex64], wo: f64) -> Vec<Complex64> {
    let shifted = |sign: f64| {
        roots
            .iter()
            .map(move |x| x + sign * (x * x - wo * wo).sqrt())
    };
    shifted(1.0).chain(shifted(-1.0)).collect()
}

/// Lowpass prototype to lowpass with cutoff `wo` (rad/s)
pub fn lp2lp(zpk: &Zpk, wo: f64) -> Result<Zpk> {
    let degree = degree(zpk)?;

    let zeros = zpk.zeros.iter().map(|z| wo * z).collect();
    let poles = zpk.poles.iter().map(|p| wo * p).collect();

    Ok(Zpk::new(zeros, poles, zpk.gain * wo.powi(degree as i32)))
}

/// Lowpass prototype to highpass with cutoff `wo` (rad/s)
pub fn lp2hp(zpk: &Zpk, wo: f64) -> Result<Zpk> {
    let degree = degree(zpk)?;

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|z| wo / z).collect();
    let poles = zpk.poles.iter().map(|p| wo / p).collect();

    // Zeros at infinity move to the origin
    zeros.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), degree));

    let gain = zpk.gain * (neg_product(&zpk.zeros) / neg_product(&zpk.poles)).re;
    Ok(Zpk::new(zeros, poles, gain))
}

/// Lowpass prototype to bandpass centred on `wo` with bandwidth `bw` (rad/s)
pub fn lp2bp(zpk: &Zpk, wo: f64, bw: f64) -> Result<Zpk> {
    let degree = degree(zpk)?;

    let z_lp: Vec<Complex64> = zpk.zeros.iter().map(|z| z * bw / 2.0).collect();
    let p_lp: Vec<Complex64> = zpk.poles.iter().map(|p| p * bw / 2.0).collect();

    let mut zeros = split_around(&z_lp, wo);
    let poles = split_around(&p_lp, wo);

    zeros.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), degree));

    Ok(Zpk::new(zeros, poles, zpk.gain * bw.powi(degree as i32)))
}

/// Lowpass prototype to bandstop centred on `wo` with bandwidth `bw` (rad/s)
pub fn lp2bs(zpk: &Zpk, wo: f64, bw: f64) -> Result<Zpk> {
    let degree = degree(zpk)?;

    let z_hp: Vec<Complex64> = zpk.zeros.iter().map(|z| (bw / 2.0) / z).collect();
    let p_hp: Vec<Complex64> = zpk.poles.iter().map(|p| (bw / 2.0) / p).collect();

    let mut zeros = split_around(&z_hp, wo);
    let poles = split_around(&p_hp, wo);

    // Zeros at infinity move to the centre of the stopband
    zeros.extend(std::iter::repeat_n(Complex64::new(0.0, wo), degree));
    zeros.extend(std::iter::repeat_n(Complex64::new(0.0, -wo), degree));

    let gain = zpk.gain * (neg_product(&zpk.zeros) / neg_product(&zpk.poles)).re;
    Ok(Zpk::new(zeros, poles, gain))
}

/// Bilinear transform of an s-plane filter for sampling rate `fs`
///
/// Zeros at infinity map to Nyquist (`z = -1`).
pub fn bilinear(zpk: &Zpk, fs: f64) -> Result<Zpk> {
    let degree = degree(zpk)?;
    let fs2 = 2.0 * fs;

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|z| (fs2 + z) / (fs2 - z)).collect();
    let poles = zpk.poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect();
    zeros.extend(std::iter::repeat_n(Complex64::new(-1.0, 0.0), degree));

    let num: Complex64 = zpk.zeros.iter().map(|z| fs2 - z).product();
    let den: Complex64 = zpk.poles.iter().map(|p| fs2 - p).product();

    Ok(Zpk::new(zeros, poles, zpk.gain * (num / den).re))
}
