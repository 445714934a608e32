use super::{DesignedFilter, FilterSpec, num_taps};
use crate::config::{FirMethod, FirOptions};
use crate::error::{FilterError, Result};
use crate::synthesis::{self, FirWindowSpec, Window};
use log::debug;

/// Design a linear-phase FIR filter for `spec`
///
/// The tap count comes from [`num_taps`] on the first passband/stopband
/// edge pair. Unset options are resolved as follows:
/// * window: Hamming
/// * `pass_zero`: false when the first passband edge lies above the first
///   stopband edge, otherwise true
/// * width: `stopband - passband` when a single stopband edge is given,
///   which switches the window to a Kaiser window. For a highpass the
///   width is negative and the Kaiser window degenerates to a rectangle.
///
/// # Errors
/// `UnsupportedFilter` for analog specs and `MissingSampleRate` without a
/// sample rate. Otherwise whatever the windowed or equiripple synthesis
/// reports, e.g. an even tap count for a filter that must pass Nyquist.
pub fn design_fir(spec: &FilterSpec, options: &FirOptions) -> Result<DesignedFilter> {
    spec.validate()?;
    if spec.analog {
        return Err(FilterError::UnsupportedFilter(
            "FIR designs are digital only".to_string(),
        ));
    }

    let sample_rate = spec.sample_rate()?;
    let (wp0, ws0) = (spec.passband[0], spec.stopband[0]);
    let taps = num_taps(sample_rate, (wp0 - ws0).abs(), spec.gpass, spec.gstop)?;

    let h = match options.method {
        FirMethod::Window => {
            let window_spec = FirWindowSpec {
                window: options.window.unwrap_or(Window::Hamming),
                pass_zero: options.pass_zero.unwrap_or(wp0 <= ws0),
                width: options
                    .width
                    .or((spec.stopband.len() == 1).then_some(ws0 - wp0)),
                scale: options.scale,
            };
            debug!(
                "design_fir: {} taps, cutoff={:?} {:?}",
                taps, spec.passband, window_spec
            );
            synthesis::firwin(taps, &spec.passband, sample_rate / 2.0, &window_spec)?
        }
        FirMethod::Remez => {
            debug!("design_fir: remez with {} taps", taps);
            synthesis::remez(taps, &spec.passband, &spec.stopband, sample_rate)?
        }
    };

    Ok(DesignedFilter::Fir(h))
}
