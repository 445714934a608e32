//! Symmetric window functions for windowed-sinc FIR design.

use super::special::bessel_i0;
use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window applied to the ideal (sinc) impulse response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Window {
    Boxcar,
    Triang,
    #[default]
    Hann,
    Hamming,
    Blackman,
    Kaiser { beta: f64 },
}

impl Window {
    /// Sample the window at `len` points (symmetric, not FFT-periodic)
    pub fn samples(&self, len: usize) -> Vec<f64> {
        if len == 0 {
            return Vec::new();
        }
        if len == 1 {
            return vec![1.0];
        }

        let m = (len - 1) as f64;
        let cosine = |a: &[f64]| -> Vec<f64> {
            (0..len)
                .map(|n| {
                    let x = 2.0 * PI * n as f64 / m;
                    a.iter()
                        .enumerate()
                        .map(|(k, &ak)| {
                            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                            sign * ak * (k as f64 * x).cos()
                        })
                        .sum()
                })
                .collect()
        };

        match *self {
            Window::Boxcar => vec![1.0; len],
            Window::Triang => {
                let l = len as f64;
                (0..len)
                    .map(|n| {
                        let n = n as f64 + 1.0;
                        let half = if len % 2 == 0 { l / 2.0 } else { (l + 1.0) / 2.0 };
                        let w = if len % 2 == 0 {
                            (2.0 * n - 1.0) / l
                        } else {
                            2.0 * n / (l + 1.0)
                        };
                        if n <= half { w } else { 2.0 - w }
                    })
                    .collect()
            }
            Window::Hann => cosine(&[0.5, 0.5]),
            Window::Hamming => cosine(&[0.54, 0.46]),
            Window::Blackman => cosine(&[0.42, 0.5, 0.08]),
            Window::Kaiser { beta } => {
                let denom = bessel_i0(beta);
                (0..len)
                    .map(|n| {
                        let r = 2.0 * n as f64 / m - 1.0;
                        bessel_i0(beta * (1.0 - r * r).max(0.0).sqrt()) / denom
                    })
                    .collect()
            }
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Boxcar => write!(f, "boxcar"),
            Window::Triang => write!(f, "triang"),
            Window::Hann => write!(f, "hann"),
            Window::Hamming => write!(f, "hamming"),
            Window::Blackman => write!(f, "blackman"),
            Window::Kaiser { beta } => write!(f, "kaiser:{}", beta),
        }
    }
}

impl FromStr for Window {
    type Err = FilterError;

    /// Parses a window name; Kaiser takes its shape parameter as `kaiser:<beta>`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(beta) = s.strip_prefix("kaiser:") {
            let beta: f64 = beta
                .parse()
                .map_err(|_| FilterError::InvalidArgument(format!("invalid kaiser beta: {}", beta)))?;
            return Ok(Window::Kaiser { beta });
        }
        match s.as_str() {
            "boxcar" | "rectangular" => Ok(Window::Boxcar),
            "triang" | "triangle" => Ok(Window::Triang),
            "hann" | "hanning" => Ok(Window::Hann),
            "hamming" => Ok(Window::Hamming),
            "blackman" => Ok(Window::Blackman),
            other => Err(FilterError::InvalidArgument(format!(
                "unknown window '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Window {
    type Error = FilterError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Window> for String {
    fn from(w: Window) -> Self {
        w.to_string()
    }
}

/// Empirical stopband attenuation (dB) of a Kaiser-windowed design with
/// `num_taps` taps and normalized transition `width` (fraction of Nyquist)
pub fn kaiser_atten(num_taps: usize, width: f64) -> f64 {
    2.285 * (num_taps as f64 - 1.0) * PI * width + 7.95
}

/// Kaiser shape parameter achieving `atten` dB of stopband attenuation
pub fn kaiser_beta(atten: f64) -> f64 {
    if atten > 50.0 {
        0.1102 * (atten - 8.7)
    } else if atten > 21.0 {
        0.5842 * (atten - 21.0).powf(0.4) + 0.07886 * (atten - 21.0)
    } else {
        0.0
    }
}
