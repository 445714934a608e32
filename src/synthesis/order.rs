//! Minimum-order selection for the classical IIR families.
//!
//! Given passband / stopband edges and the allowed loss / required
//! attenuation, each `*ord` function returns the lowest order meeting
//! those tolerances together with the natural frequencies to design at.
//! Digital edges are normalized to Nyquist (`0..=1`) and prewarped with
//! `tan(πω/2)`; analog edges are in rad/s and used as-is.

use super::special::{ellipk, ellipkm1};
use crate::constants::{MAX_IIR_ORDER, MINIMIZE_XTOL};
use crate::error::{FilterError, Result};
use log::{debug, trace};
use std::f64::consts::{FRAC_2_PI, PI};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandType {
    Lowpass,
    Highpass,
    Bandstop,
    Bandpass,
}

impl BandType {
    /// Infer the band from the edge layout: a single edge pair is lowpass
    /// when the passband edge is below the stopband edge, highpass
    /// otherwise; two pairs are band-stop when the first passband edge lies
    /// below the first stopband edge, bandpass otherwise.
    pub fn classify(wp: &[f64], ws: &[f64]) -> Result<Self> {
        match (wp.len(), ws.len()) {
            (1, 1) if wp[0] < ws[0] => Ok(BandType::Lowpass),
            (1, 1) => Ok(BandType::Highpass),
            (2, 2) if wp[0] < ws[0] => Ok(BandType::Bandstop),
            (2, 2) => Ok(BandType::Bandpass),
            (p, s) => Err(FilterError::InvalidArgument(format!(
                "wp and ws must both have one or two elements (got {} and {})",
                p, s
            ))),
        }
    }
}

/// Selected order, natural frequencies and band classification
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSelection {
    pub order: usize,
    pub wn: Vec<f64>,
    pub band: BandType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Butter,
    Cheby,
    Ellip,
}

fn loss_ratio(gpass: f64, gstop: f64) -> (f64, f64) {
    (10f64.powf(0.1 * gpass.abs()), 10f64.powf(0.1 * gstop.abs()))
}

/// Fractional order needed for natural-frequency ratio `nat`
fn fractional_order(nat: f64, gpass: f64, gstop: f64, kind: Kind) -> f64 {
    let (p, g) = loss_ratio(gpass, gstop);
    match kind {
        Kind::Butter => ((g - 1.0) / (p - 1.0)).log10() / (2.0 * nat.log10()),
        Kind::Cheby => ((g - 1.0) / (p - 1.0)).sqrt().acosh() / nat.acosh(),
        Kind::Ellip => {
            let arg1 = ((p - 1.0) / (g - 1.0)).sqrt();
            let arg0 = 1.0 / nat;
            ellipk(arg0 * arg0) * ellipkm1(arg1 * arg1)
                / (ellipkm1(arg0 * arg0) * ellipk(arg1 * arg1))
        }
    }
}

/// Bounded scalar minimization by golden-section search
fn minimize_bounded<F: Fn(f64) -> f64>(f: F, mut a: f64, mut b: f64, xtol: f64) -> f64 {
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let mut c = b - ratio * (b - a);
    let mut d = a + ratio * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    while (b - a).abs() > xtol {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - ratio * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + ratio * (b - a);
            fd = f(d);
        }
    }
    (a + b) / 2.0
}

fn band_stop_nat(passb: [f64; 2], stopb: &[f64]) -> f64 {
    stopb
        .iter()
        .map(|s| (s * (passb[0] - passb[1]) / (s * s - passb[0] * passb[1])).abs())
        .fold(f64::INFINITY, f64::min)
}

/// Order as a function of one band-stop passband edge, the other fixed
fn band_stop_obj(
    wp: f64,
    ind: usize,
    passb: [f64; 2],
    stopb: &[f64],
    gpass: f64,
    gstop: f64,
    kind: Kind,
) -> f64 {
    let mut passb = passb;
    passb[ind] = wp;
    fractional_order(band_stop_nat(passb, stopb), gpass, gstop, kind)
}

/// Natural-frequency ratio of the equivalent lowpass problem
///
/// For band-stop designs the passband edges are first relaxed as far as
/// possible without raising the order; the adjusted edges are returned.
fn find_nat_freq(
    stopb: &[f64],
    passb: &[f64],
    gpass: f64,
    gstop: f64,
    band: BandType,
    kind: Kind,
) -> (f64, Vec<f64>) {
    match band {
        BandType::Lowpass => (stopb[0] / passb[0], passb.to_vec()),
        BandType::Highpass => (passb[0] / stopb[0], passb.to_vec()),
        BandType::Bandstop => {
            let mut pb = [passb[0], passb[1]];
            let wp0 = minimize_bounded(
                |w| band_stop_obj(w, 0, pb, stopb, gpass, gstop, kind),
                passb[0],
                stopb[0] - 1e-12,
                MINIMIZE_XTOL,
            );
            pb[0] = wp0;
            let wp1 = minimize_bounded(
                |w| band_stop_obj(w, 1, pb, stopb, gpass, gstop, kind),
                stopb[1] + 1e-12,
                passb[1],
                MINIMIZE_XTOL,
            );
            pb[1] = wp1;
            trace!("band-stop passband relaxed from {:?} to {:?}", passb, pb);
            (band_stop_nat(pb, stopb), pb.to_vec())
        }
        BandType::Bandpass => {
            let nat = stopb
                .iter()
                .map(|s| ((s * s - passb[0] * passb[1]) / (s * (passb[0] - passb[1]))).abs())
                .fold(f64::INFINITY, f64::min);
            (nat, passb.to_vec())
        }
    }
}

struct Prepared {
    band: BandType,
    passb: Vec<f64>,
    stopb: Vec<f64>,
}

fn prepare(wp: &[f64], ws: &[f64], gpass: f64, gstop: f64, analog: bool) -> Result<Prepared> {
    if !(gpass > 0.0) {
        return Err(FilterError::InvalidArgument(format!(
            "gpass should be larger than 0.0 (got {})",
            gpass
        )));
    }
    if !(gstop > 0.0) {
        return Err(FilterError::InvalidArgument(format!(
            "gstop should be larger than 0.0 (got {})",
            gstop
        )));
    }

    let band = BandType::classify(wp, ws)?;
    let warp = |w: &[f64]| -> Vec<f64> {
        if analog {
            w.to_vec()
        } else {
            w.iter().map(|x| (PI * x / 2.0).tan()).collect()
        }
    };
    Ok(Prepared {
        band,
        passb: warp(wp),
        stopb: warp(ws),
    })
}

fn finish_order(order: f64, name: &str) -> Result<usize> {
    if !order.is_finite() {
        return Err(FilterError::FilterDesign(format!(
            "{}: order estimate is not finite",
            name
        )));
    }
    let order = order.ceil().max(1.0);
    if order > MAX_IIR_ORDER as f64 {
        return Err(FilterError::FilterDesign(format!(
            "{}: required order {} exceeds the maximum of {}",
            name, order, MAX_IIR_ORDER
        )));
    }
    Ok(order as usize)
}

fn unwarp(wn: &[f64], analog: bool) -> Vec<f64> {
    if analog {
        wn.to_vec()
    } else {
        wn.iter().map(|w| FRAC_2_PI * w.atan()).collect()
    }
}

pub fn buttord(wp: &[f64], ws: &[f64], gpass: f64, gstop: f64, analog: bool) -> Result<OrderSelection> {
    let Prepared { band, passb, stopb } = prepare(wp, ws, gpass, gstop, analog)?;
    let (nat, passb) = find_nat_freq(&stopb, &passb, gpass, gstop, band, Kind::Butter);
    let order = finish_order(fractional_order(nat, gpass, gstop, Kind::Butter), "buttord")?;

    // Natural frequency giving exactly gpass at the passband edge
    let (p, _) = loss_ratio(gpass, gstop);
    let w0 = (p - 1.0).powf(-1.0 / (2.0 * order as f64));
    let mut wn = match band {
        BandType::Lowpass => vec![w0 * passb[0]],
        BandType::Highpass => vec![passb[0] / w0],
        BandType::Bandstop => {
            let span = passb[1] - passb[0];
            let discr = (span * span + 4.0 * w0 * w0 * passb[0] * passb[1]).sqrt();
            vec![
                ((span + discr) / (2.0 * w0)).abs(),
                ((span - discr) / (2.0 * w0)).abs(),
            ]
        }
        BandType::Bandpass => {
            let span = passb[1] - passb[0];
            [-w0, w0]
                .iter()
                .map(|w| (-w * span / 2.0 + (w * w / 4.0 * span * span + passb[0] * passb[1]).sqrt()).abs())
                .collect()
        }
    };
    wn.sort_by(f64::total_cmp);

    Ok(OrderSelection {
        order,
        wn: unwarp(&wn, analog),
        band,
    })
}

pub fn cheb1ord(wp: &[f64], ws: &[f64], gpass: f64, gstop: f64, analog: bool) -> Result<OrderSelection> {
    let Prepared { band, passb, stopb } = prepare(wp, ws, gpass, gstop, analog)?;
    let (nat, passb) = find_nat_freq(&stopb, &passb, gpass, gstop, band, Kind::Cheby);
    let order = finish_order(fractional_order(nat, gpass, gstop, Kind::Cheby), "cheb1ord")?;

    // Natural frequencies are the passband edges
    Ok(OrderSelection {
        order,
        wn: unwarp(&passb, analog),
        band,
    })
}

pub fn cheb2ord(wp: &[f64], ws: &[f64], gpass: f64, gstop: f64, analog: bool) -> Result<OrderSelection> {
    let Prepared { band, passb, stopb } = prepare(wp, ws, gpass, gstop, analog)?;
    let (nat, passb) = find_nat_freq(&stopb, &passb, gpass, gstop, band, Kind::Cheby);
    let order = finish_order(fractional_order(nat, gpass, gstop, Kind::Cheby), "cheb2ord")?;

    // Frequency where the analog response is -gpass dB
    let (p, g) = loss_ratio(gpass, gstop);
    let new_freq = 1.0 / ((((g - 1.0) / (p - 1.0)).sqrt().acosh()) / order as f64).cosh();

    let wn = match band {
        BandType::Lowpass => vec![passb[0] / new_freq],
        BandType::Highpass => vec![passb[0] * new_freq],
        BandType::Bandstop => {
            let (span, product) = (passb[1] - passb[0], passb[0] * passb[1]);
            let n0 = -new_freq / 2.0 * span
                + (new_freq * new_freq * span * span / 4.0 + product).sqrt();
            vec![n0, product / n0]
        }
        BandType::Bandpass => {
            let (span, product) = (passb[1] - passb[0], passb[0] * passb[1]);
            let n0 = -span / (2.0 * new_freq)
                + (span * span / (4.0 * new_freq * new_freq) + product).sqrt();
            vec![n0, product / n0]
        }
    };

    Ok(OrderSelection {
        order,
        wn: unwarp(&wn, analog),
        band,
    })
}

pub fn ellipord(wp: &[f64], ws: &[f64], gpass: f64, gstop: f64, analog: bool) -> Result<OrderSelection> {
    let Prepared { band, passb, stopb } = prepare(wp, ws, gpass, gstop, analog)?;
    let (nat, passb) = find_nat_freq(&stopb, &passb, gpass, gstop, band, Kind::Ellip);
    let order = finish_order(fractional_order(nat, gpass, gstop, Kind::Ellip), "ellipord")?;
    debug!("ellipord: natural frequency ratio {:.6}, order {}", nat, order);

    Ok(OrderSelection {
        order,
        wn: unwarp(&passb, analog),
        band,
    })
}
