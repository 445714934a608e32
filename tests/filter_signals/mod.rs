//! Time-domain helpers for checking designed filters against real signals.

#![allow(dead_code)]

use std::f64::consts::PI;

use filterdesign::{Sos, Zpk};

/// Unit-amplitude sine of `duration` seconds
pub fn sine(frequency: f64, sample_rate: f64, duration: f64) -> Vec<f64> {
    let n = (duration * sample_rate) as usize;
    (0..n)
        .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate).sin())
        .collect()
}

/// Run a biquad cascade over `input` (transposed direct form II)
pub fn apply_sos(sos: &Sos, input: &[f64]) -> Vec<f64> {
    let mut signal = input.to_vec();
    for s in &sos.sections {
        let (b0, b1, b2) = (s[0] / s[3], s[1] / s[3], s[2] / s[3]);
        let (a1, a2) = (s[4] / s[3], s[5] / s[3]);
        let (mut z1, mut z2) = (0.0, 0.0);
        for x in signal.iter_mut() {
            let y = b0 * *x + z1;
            z1 = b1 * *x - a1 * y + z2;
            z2 = b2 * *x - a2 * y;
            *x = y;
        }
    }
    signal
}

/// Convolve `input` with FIR `taps`
pub fn apply_fir(taps: &[f64], input: &[f64]) -> Vec<f64> {
    (0..input.len())
        .map(|n| {
            taps.iter()
                .enumerate()
                .take_while(|(k, _)| *k <= n)
                .map(|(k, h)| h * input[n - k])
                .sum()
        })
        .collect()
}

pub fn rms(signal: &[f64]) -> f64 {
    (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
}

/// Steady-state gain in dB of `filter` on a sine at `frequency`
///
/// The first half of the output is discarded to let transients decay.
pub fn measured_gain_db(filter: impl Fn(&[f64]) -> Vec<f64>, frequency: f64, sample_rate: f64) -> f64 {
    let input = sine(frequency, sample_rate, 4.0);
    let output = filter(&input);
    let half = output.len() / 2;
    20.0 * (rms(&output[half..]) / rms(&input[half..])).log10()
}

/// Magnitude response in dB at each frequency in `frequencies`
pub fn sweep_db(zpk: &Zpk, frequencies: &[f64], sample_rate: f64) -> Vec<f64> {
    frequencies
        .iter()
        .map(|&f| zpk.magnitude_db(f, sample_rate))
        .collect()
}

/// `n` evenly spaced frequencies from `start` to `stop` inclusive
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| start + (stop - start) * i as f64 / (n - 1) as f64)
        .collect()
}
