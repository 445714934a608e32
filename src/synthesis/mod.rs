//! Classical filter synthesis: IIR order selection and design, windowed-sinc
//! and equiripple FIR design, and representation conversions.
//!
//! Digital Butterworth designs are delegated to `iir_filters`; equiripple
//! FIR designs to `pm_remez`.

pub mod convert;
pub mod order;
pub mod prototype;
pub mod special;
pub mod transform;
pub mod window;

pub use convert::{ss2zpk, tf2zpk, zpk2sos, zpk2tf};
pub use order::{BandType, OrderSelection};
pub use window::Window;

use crate::constants::{MAX_FIR_TAPS, MAX_IIR_ORDER};
use crate::error::{FilterError, Result};
use crate::zpk::Zpk;
use log::{debug, trace};
use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// IIR filter family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IirFamily {
    /// Maximally flat passband
    Butter,
    /// Equiripple passband
    #[default]
    Cheby1,
    /// Equiripple stopband
    Cheby2,
    /// Equiripple in both bands (elliptic / Cauer)
    Ellip,
}

impl fmt::Display for IirFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IirFamily::Butter => "butter",
            IirFamily::Cheby1 => "cheby1",
            IirFamily::Cheby2 => "cheby2",
            IirFamily::Ellip => "ellip",
        };
        f.write_str(name)
    }
}

impl FromStr for IirFamily {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "butter" | "butterworth" => Ok(IirFamily::Butter),
            "cheby1" | "chebyshev1" => Ok(IirFamily::Cheby1),
            "cheby2" | "chebyshev2" => Ok(IirFamily::Cheby2),
            "ellip" | "elliptic" => Ok(IirFamily::Ellip),
            other => Err(FilterError::InvalidArgument(format!(
                "unknown IIR filter family '{}'",
                other
            ))),
        }
    }
}

fn validate_edges(wp: &[f64], ws: &[f64], analog: bool) -> Result<()> {
    if wp.iter().chain(ws).any(|w| !(*w > 0.0)) {
        return Err(FilterError::InvalidArgument(format!(
            "values for wp, ws must be greater than 0 (wp={:?}, ws={:?})",
            wp, ws
        )));
    }
    // A stopband edge exactly at Nyquist is accepted; the passband must lie below it.
    if !analog && (wp.iter().any(|w| *w >= 1.0) || ws.iter().any(|w| *w > 1.0)) {
        return Err(FilterError::InvalidArgument(format!(
            "digital band edges must be below Nyquist (wp={:?}, ws={:?})",
            wp, ws
        )));
    }
    if wp.len() == 2 && ws.len() == 2 {
        let passband_inside = ws[0] < wp[0] && wp[1] < ws[1];
        let stopband_inside = wp[0] < ws[0] && ws[1] < wp[1];
        if !(passband_inside || stopband_inside) {
            return Err(FilterError::InvalidArgument(
                "passband must lie strictly inside stopband or vice versa".to_string(),
            ));
        }
    }
    Ok(())
}

/// Design the minimum-order filter of `family` meeting the band edges and
/// tolerances
///
/// Digital edges are fractions of Nyquist; analog edges are in rad/s. The
/// band type follows from the edge layout (see [`BandType::classify`]).
pub fn iirdesign(
    wp: &[f64],
    ws: &[f64],
    gpass: f64,
    gstop: f64,
    analog: bool,
    family: IirFamily,
) -> Result<Zpk> {
    validate_edges(wp, ws, analog)?;

    let selection = match family {
        IirFamily::Butter => order::buttord(wp, ws, gpass, gstop, analog)?,
        IirFamily::Cheby1 => order::cheb1ord(wp, ws, gpass, gstop, analog)?,
        IirFamily::Cheby2 => order::cheb2ord(wp, ws, gpass, gstop, analog)?,
        IirFamily::Ellip => order::ellipord(wp, ws, gpass, gstop, analog)?,
    };
    debug!(
        "iirdesign: {} {:?} of order {} at wn={:?}",
        family, selection.band, selection.order, selection.wn
    );

    iirfilter(&selection, gpass, gstop, analog, family)
}

/// Design a filter of known order and natural frequencies
pub fn iirfilter(
    selection: &OrderSelection,
    rp: f64,
    rs: f64,
    analog: bool,
    family: IirFamily,
) -> Result<Zpk> {
    let OrderSelection { order, wn, band } = selection;
    if *order > MAX_IIR_ORDER {
        return Err(FilterError::FilterDesign(format!(
            "order {} exceeds the maximum of {}",
            order, MAX_IIR_ORDER
        )));
    }

    if family == IirFamily::Butter && !analog {
        return butter_digital(*order, wn, *band);
    }

    let proto = match family {
        IirFamily::Butter => prototype::buttap(*order),
        IirFamily::Cheby1 => prototype::cheb1ap(*order, rp),
        IirFamily::Cheby2 => prototype::cheb2ap(*order, rs),
        IirFamily::Ellip => prototype::ellipap(*order, rp, rs)?,
    };

    // Prewarp digital frequencies for the bilinear transform at fs = 2
    let fs = 2.0;
    let warped: Vec<f64> = if analog {
        wn.clone()
    } else {
        wn.iter().map(|w| 2.0 * fs * (PI * w / fs).tan()).collect()
    };
    trace!("iirfilter: warped natural frequencies {:?}", warped);

    let zpk = match band {
        BandType::Lowpass => transform::lp2lp(&proto, warped[0])?,
        BandType::Highpass => transform::lp2hp(&proto, warped[0])?,
        BandType::Bandpass | BandType::Bandstop => {
            let bw = warped[1] - warped[0];
            let wo = (warped[0] * warped[1]).sqrt();
            if *band == BandType::Bandpass {
                transform::lp2bp(&proto, wo, bw)?
            } else {
                transform::lp2bs(&proto, wo, bw)?
            }
        }
    };

    if analog {
        Ok(zpk)
    } else {
        transform::bilinear(&zpk, fs)
    }
}

fn butter_digital(order: usize, wn: &[f64], band: BandType) -> Result<Zpk> {
    use iir_filters::filter_design::{FilterType, butter};

    let filter_type = match band {
        BandType::Lowpass => FilterType::LowPass(wn[0]),
        BandType::Highpass => FilterType::HighPass(wn[0]),
        BandType::Bandpass => FilterType::BandPass(wn[0], wn[1]),
        BandType::Bandstop => FilterType::BandStop(wn[0], wn[1]),
    };

    // With fs = 2 the cutoffs are already fractions of Nyquist
    let order = u32::try_from(order)
        .map_err(|_| FilterError::FilterDesign(format!("order {} does not fit in u32", order)))?;
    let zpk = butter(order, filter_type, 2.0)
        .map_err(|e| FilterError::FilterDesign(format!("{:?}", e)))?;

    Ok(Zpk::new(zpk.z, zpk.p, zpk.k))
}

/// Options for [`firwin`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirWindowSpec {
    pub window: Window,
    /// Whether the response at DC is in a passband
    pub pass_zero: bool,
    /// Transition width; when given, a Kaiser window sized for it replaces
    /// `window`
    pub width: Option<f64>,
    /// Normalize so the first passband has unit gain at its centre
    pub scale: bool,
}

impl Default for FirWindowSpec {
    fn default() -> Self {
        Self {
            window: Window::Hamming,
            pass_zero: true,
            width: None,
            scale: true,
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Linear-phase FIR filter by the window method
///
/// `cutoff` and `width` are in the same units as `nyquist`. Band edges
/// alternate between pass and stop starting from DC according to
/// `pass_zero`.
///
/// # Errors
/// `InvalidArgument` for cutoffs outside `(0, nyquist)`, cutoffs that are
/// not strictly increasing, or an even tap count for a filter that must
/// pass Nyquist
pub fn firwin(num_taps: usize, cutoff: &[f64], nyquist: f64, spec: &FirWindowSpec) -> Result<Vec<f64>> {
    if num_taps == 0 {
        return Err(FilterError::InvalidArgument(
            "FIR filter needs at least one tap".to_string(),
        ));
    }
    check_tap_limit(num_taps)?;
    if cutoff.is_empty() {
        return Err(FilterError::InvalidArgument(
            "at least one cutoff frequency must be given".to_string(),
        ));
    }

    let cutoff: Vec<f64> = cutoff.iter().map(|c| c / nyquist).collect();
    if cutoff.iter().any(|c| !(*c > 0.0 && *c < 1.0)) {
        return Err(FilterError::InvalidArgument(format!(
            "invalid cutoff frequency {:?}: frequencies must be greater than 0 and less than nyquist",
            cutoff
        )));
    }
    if cutoff.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FilterError::InvalidArgument(
            "invalid cutoff frequencies: the frequencies must be strictly increasing".to_string(),
        ));
    }

    let window = match spec.width {
        Some(width) => {
            let atten = window::kaiser_atten(num_taps, width / nyquist);
            let beta = window::kaiser_beta(atten);
            debug!("firwin: transition width {} selects kaiser(beta={:.4})", width, beta);
            Window::Kaiser { beta }
        }
        None => spec.window,
    };

    let pass_nyquist = (cutoff.len() % 2 == 1) ^ spec.pass_zero;
    if pass_nyquist && num_taps % 2 == 0 {
        return Err(FilterError::InvalidArgument(format!(
            "a filter with an even number of coefficients ({}) must have zero response at the Nyquist frequency",
            num_taps
        )));
    }

    let mut edges = Vec::with_capacity(cutoff.len() + 2);
    if spec.pass_zero {
        edges.push(0.0);
    }
    edges.extend_from_slice(&cutoff);
    if pass_nyquist {
        edges.push(1.0);
    }

    let alpha = 0.5 * (num_taps as f64 - 1.0);
    let m: Vec<f64> = (0..num_taps).map(|i| i as f64 - alpha).collect();

    let mut h = vec![0.0; num_taps];
    for band in edges.chunks_exact(2) {
        let (left, right) = (band[0], band[1]);
        for (hi, mi) in h.iter_mut().zip(&m) {
            *hi += right * sinc(right * mi) - left * sinc(left * mi);
        }
    }

    for (hi, wi) in h.iter_mut().zip(window.samples(num_taps)) {
        *hi *= wi;
    }

    if spec.scale {
        let (left, right) = (edges[0], edges[1]);
        let scale_frequency = if left == 0.0 {
            0.0
        } else if right == 1.0 {
            1.0
        } else {
            0.5 * (left + right)
        };
        let s: f64 = h
            .iter()
            .zip(&m)
            .map(|(hi, mi)| hi * (PI * mi * scale_frequency).cos())
            .sum();
        for hi in &mut h {
            *hi /= s;
        }
    }

    Ok(h)
}

fn check_tap_limit(num_taps: usize) -> Result<()> {
    if num_taps > MAX_FIR_TAPS {
        return Err(FilterError::InvalidArgument(format!(
            "{} taps exceeds the maximum of {}",
            num_taps, MAX_FIR_TAPS
        )));
    }
    Ok(())
}

/// Equiripple FIR filter by the Parks-McClellan algorithm
///
/// `wp` and `ws` are band edges in Hz laid out as for [`iirdesign`]; the
/// tap count is rounded up to odd so every band type has a linear-phase
/// Type I solution.
pub fn remez(num_taps: usize, wp: &[f64], ws: &[f64], sample_rate: f64) -> Result<Vec<f64>> {
    check_tap_limit(num_taps)?;
    let num_taps = if num_taps.is_multiple_of(2) {
        num_taps + 1
    } else {
        num_taps
    };

    let band = BandType::classify(wp, ws)?;
    let normalize = |hz: f64| hz / sample_rate;
    let setting = |f0: f64, f1: f64, gain: f64, name: &str| {
        BandSetting::new(normalize(f0), normalize(f1), constant(gain))
            .map_err(|e| FilterError::FilterDesign(format!("{}: {:?}", name, e)))
    };
    let nyquist = sample_rate / 2.0;

    let bands = match band {
        BandType::Lowpass => vec![
            setting(0.0, wp[0], 1.0, "Passband")?,
            setting(ws[0], nyquist, 0.0, "Stopband")?,
        ],
        BandType::Highpass => vec![
            setting(0.0, ws[0], 0.0, "Stopband")?,
            setting(wp[0], nyquist, 1.0, "Passband")?,
        ],
        BandType::Bandpass => vec![
            setting(0.0, ws[0], 0.0, "Lower stopband")?,
            setting(wp[0], wp[1], 1.0, "Passband")?,
            setting(ws[1], nyquist, 0.0, "Upper stopband")?,
        ],
        BandType::Bandstop => vec![
            setting(0.0, wp[0], 1.0, "Lower passband")?,
            setting(ws[0], ws[1], 0.0, "Stopband")?,
            setting(wp[1], nyquist, 1.0, "Upper passband")?,
        ],
    };

    let params = pm_parameters(num_taps, &bands)
        .map_err(|e| FilterError::FilterDesign(format!("PM parameters: {:?}", e)))?;
    let design =
        pm_remez(&params).map_err(|e| FilterError::FilterDesign(format!("PM Remez: {:?}", e)))?;

    debug!("remez: {:?} design with {} taps", band, num_taps);
    Ok(design.impulse_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn fir_gain(taps: &[f64], normalized: f64) -> f64 {
        let w = PI * normalized;
        taps.iter()
            .enumerate()
            .map(|(n, &h)| h * Complex64::from_polar(1.0, -w * n as f64))
            .sum::<Complex64>()
            .norm()
    }

    fn digital_db(zpk: &Zpk, normalized: f64) -> f64 {
        20.0 * zpk
            .evaluate(Complex64::from_polar(1.0, PI * normalized))
            .norm()
            .log10()
    }

    #[test]
    fn test_family_parsing() {
        assert_eq!("ellip".parse::<IirFamily>().unwrap(), IirFamily::Ellip);
        assert_eq!("Butter".parse::<IirFamily>().unwrap(), IirFamily::Butter);
        assert!("bessel".parse::<IirFamily>().is_err());
        assert_eq!(IirFamily::default().to_string(), "cheby1");
    }

    #[test]
    fn test_iirdesign_meets_tolerances_for_each_family() {
        for family in [
            IirFamily::Butter,
            IirFamily::Cheby1,
            IirFamily::Cheby2,
            IirFamily::Ellip,
        ] {
            let zpk = iirdesign(&[0.2], &[0.3], 1.0, 40.0, false, family).unwrap();
            assert!(zpk.is_stable(), "{} unstable", family);
            assert!(digital_db(&zpk, 0.2) >= -1.0 - 1e-6, "{} passband", family);
            assert!(digital_db(&zpk, 0.3) <= -40.0 + 1e-6, "{} stopband", family);
        }
    }

    #[test]
    fn test_iirdesign_validates_edges() {
        assert!(iirdesign(&[0.0], &[0.3], 1.0, 40.0, false, IirFamily::Cheby1).is_err());
        assert!(iirdesign(&[1.2], &[0.3], 1.0, 40.0, false, IirFamily::Cheby1).is_err());
        assert!(
            iirdesign(&[0.2, 0.4], &[0.3, 0.5], 1.0, 40.0, false, IirFamily::Cheby1).is_err()
        );
    }

    #[test]
    fn test_iirdesign_accepts_stopband_at_nyquist() {
        let zpk = iirdesign(&[0.8], &[1.0], 2.0, 30.0, false, IirFamily::Cheby1).unwrap();
        assert!(zpk.is_stable());
    }

    #[test]
    fn test_analog_design_stays_in_s_plane() {
        let zpk = iirdesign(&[1.0], &[2.0], 1.0, 30.0, true, IirFamily::Cheby1).unwrap();
        assert!(zpk.zeros.is_empty());
        assert!(zpk.poles.iter().all(|p| p.re < 0.0));
        let at_edge = 20.0 * zpk.evaluate(Complex64::new(0.0, 1.0)).norm().log10();
        assert_relative_eq!(at_edge, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_iirdesign_rejects_nearly_coincident_edges() {
        for family in [IirFamily::Butter, IirFamily::Cheby1] {
            let result = iirdesign(&[0.2], &[0.2 * (1.0 + 1e-13)], 2.0, 30.0, false, family);
            assert!(matches!(result, Err(FilterError::FilterDesign(_))), "{}", family);
        }
    }

    #[test]
    fn test_iirfilter_rejects_oversized_order() {
        let selection = OrderSelection {
            order: MAX_IIR_ORDER + 1,
            wn: vec![0.2],
            band: BandType::Lowpass,
        };
        for analog in [false, true] {
            assert!(matches!(
                iirfilter(&selection, 2.0, 30.0, analog, IirFamily::Butter),
                Err(FilterError::FilterDesign(_))
            ));
        }
    }

    #[test]
    fn test_fir_synthesis_rejects_oversized_tap_count() {
        let err = firwin(MAX_FIR_TAPS + 1, &[100.0], 512.0, &FirWindowSpec::default()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidArgument(_)));
        let err = remez(MAX_FIR_TAPS + 1, &[100.0], &[150.0], 1024.0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidArgument(_)));
    }

    #[test]
    fn test_firwin_lowpass_unit_dc_gain() {
        let taps = firwin(31, &[100.0], 512.0, &FirWindowSpec::default()).unwrap();
        assert_eq!(taps.len(), 31);
        assert_relative_eq!(taps.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for i in 0..15 {
            assert_relative_eq!(taps[i], taps[30 - i], epsilon = 1e-15);
        }
        assert!(fir_gain(&taps, 0.6) < 0.01);
    }

    #[test]
    fn test_firwin_highpass_requires_odd_taps() {
        let spec = FirWindowSpec {
            pass_zero: false,
            ..FirWindowSpec::default()
        };
        let err = firwin(30, &[100.0], 512.0, &spec).unwrap_err();
        assert!(matches!(err, FilterError::InvalidArgument(_)));

        let taps = firwin(31, &[100.0], 512.0, &spec).unwrap();
        assert_relative_eq!(fir_gain(&taps, 1.0), 1.0, epsilon = 1e-12);
        assert!(fir_gain(&taps, 0.0) < 0.01);
    }

    #[test]
    fn test_firwin_width_switches_to_kaiser() {
        let plain = firwin(41, &[100.0], 512.0, &FirWindowSpec::default()).unwrap();
        let kaiser = firwin(
            41,
            &[100.0],
            512.0,
            &FirWindowSpec {
                width: Some(50.0),
                ..FirWindowSpec::default()
            },
        )
        .unwrap();
        assert_ne!(plain, kaiser);
        assert_relative_eq!(kaiser.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_firwin_bandpass_centre_gain() {
        let spec = FirWindowSpec {
            pass_zero: false,
            ..FirWindowSpec::default()
        };
        let taps = firwin(101, &[100.0, 200.0], 512.0, &spec).unwrap();
        assert_relative_eq!(fir_gain(&taps, 150.0 / 512.0), 1.0, epsilon = 1e-2);
        assert!(fir_gain(&taps, 0.0) < 0.01);
    }

    #[test]
    fn test_firwin_rejects_bad_cutoffs() {
        let spec = FirWindowSpec::default();
        assert!(firwin(31, &[], 512.0, &spec).is_err());
        assert!(firwin(31, &[600.0], 512.0, &spec).is_err());
        assert!(firwin(31, &[200.0, 100.0], 512.0, &spec).is_err());
    }

    #[test]
    fn test_remez_lowpass() {
        let taps = remez(63, &[100.0], &[150.0], 1024.0).unwrap();
        assert_eq!(taps.len(), 63);
        assert_relative_eq!(fir_gain(&taps, 0.0), 1.0, epsilon = 0.1);
        assert!(fir_gain(&taps, 300.0 / 512.0) < 0.1);
    }
}
