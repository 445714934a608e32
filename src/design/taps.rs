use crate::constants::MAX_FIR_TAPS;
use crate::error::{FilterError, Result};
use log::trace;

/// Number of taps for an FIR filter with the given transition width and
/// tolerances
///
/// Uses Bellanger's estimate
/// `N = 2/3 · log10(1 / (10·δp·δs)) · fs / Δf`, with `δ = 10^(-dB/10)`,
/// truncated toward zero and never less than one.
///
/// # Arguments
/// * `sample_rate` - Sampling rate of the target data
/// * `transition_width` - Width of the transition band, in the same units
///   as `sample_rate`
/// * `gpass` - Maximum passband loss (dB)
/// * `gstop` - Minimum stopband attenuation (dB)
///
/// # Errors
/// `InvalidArgument` if `sample_rate` or `transition_width` is not a
/// positive finite number, or if the estimate exceeds [`MAX_FIR_TAPS`]
pub fn num_taps(sample_rate: f64, transition_width: f64, gpass: f64, gstop: f64) -> Result<usize> {
    if !(transition_width > 0.0 && transition_width.is_finite()) {
        return Err(FilterError::InvalidArgument(format!(
            "transition width must be positive and finite (got {})",
            transition_width
        )));
    }
    if !(sample_rate > 0.0 && sample_rate.is_finite()) {
        return Err(FilterError::InvalidArgument(format!(
            "sample rate must be positive and finite (got {})",
            sample_rate
        )));
    }

    let gpass = 10f64.powf(-gpass / 10.0);
    let gstop = 10f64.powf(-gstop / 10.0);
    let estimate = 2.0 / 3.0 * (1.0 / (10.0 * gpass * gstop)).log10() * sample_rate / transition_width;
    trace!("num_taps: raw estimate {}", estimate);

    if !(estimate <= MAX_FIR_TAPS as f64) {
        return Err(FilterError::InvalidArgument(format!(
            "estimated {} taps exceeds the maximum of {}",
            estimate.trunc(),
            MAX_FIR_TAPS
        )));
    }

    Ok((estimate.trunc() as usize).max(1))
}
