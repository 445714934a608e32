use crate::config::{FilterType, NotchOptions};
use crate::constants::{NOTCH_INNER_HALF_WIDTH, NOTCH_OUTER_HALF_WIDTH};
use crate::error::{FilterError, Result};
use crate::synthesis;
use crate::units::Scalar;
use crate::zpk::Zpk;
use log::debug;

/// Normalized band edges of a notch at `frequency`
///
/// Returns `(passband, stopband)`: the passband edges sit 1 Hz either side
/// of the notch and the stopband edges 0.1 Hz either side, both as
/// fractions of Nyquist.
pub fn notch_edges(frequency: f64, sample_rate: f64) -> ([f64; 2], [f64; 2]) {
    let nyquist = sample_rate / 2.0;
    (
        [
            (frequency - NOTCH_OUTER_HALF_WIDTH) / nyquist,
            (frequency + NOTCH_OUTER_HALF_WIDTH) / nyquist,
        ],
        [
            (frequency - NOTCH_INNER_HALF_WIDTH) / nyquist,
            (frequency + NOTCH_INNER_HALF_WIDTH) / nyquist,
        ],
    )
}

/// Design a digital IIR notch (band-stop) filter
///
/// # Errors
/// `NotImplemented` for FIR notches; design errors when the notch is too
/// close to DC or Nyquist for its edges to be valid
///
/// # Example
/// ```
/// use filterdesign::config::NotchOptions;
/// use filterdesign::design::notch;
///
/// let zpk = notch(60.0, 16384.0, &NotchOptions::default()).unwrap();
/// assert!(zpk.magnitude_db(60.0, 16384.0) < -10.0);
/// assert!(zpk.magnitude_db(200.0, 16384.0).abs() < 1.0);
/// ```
pub fn notch(
    frequency: impl Into<Scalar>,
    sample_rate: impl Into<Scalar>,
    options: &NotchOptions,
) -> Result<Zpk> {
    if options.filter_type == FilterType::Fir {
        return Err(FilterError::NotImplemented(
            "FIR notch filter design".to_string(),
        ));
    }

    let frequency = frequency.into().as_hz()?;
    let sample_rate = sample_rate.into().as_hz()?;
    if !(sample_rate > 0.0 && sample_rate.is_finite()) {
        return Err(FilterError::InvalidArgument(format!(
            "sample rate must be positive and finite (got {})",
            sample_rate
        )));
    }

    let (wp, ws) = notch_edges(frequency, sample_rate);
    debug!("notch: {} Hz, wp={:?} ws={:?}", frequency, wp, ws);

    synthesis::iirdesign(&wp, &ws, options.gpass, options.gstop, false, options.family)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::IirFamily;
    use approx::assert_relative_eq;

    #[test]
    fn test_edges() {
        let (wp, ws) = notch_edges(60.0, 16384.0);
        assert_relative_eq!(wp[0], 59.0 / 8192.0);
        assert_relative_eq!(wp[1], 61.0 / 8192.0);
        assert_relative_eq!(ws[0], 59.9 / 8192.0);
        assert_relative_eq!(ws[1], 60.1 / 8192.0);
    }

    #[test]
    fn test_notch_reference() {
        let zpk = notch(60.0, 16384.0, &NotchOptions::default()).unwrap();
        assert_eq!(zpk.zeros.len(), 2);
        assert_eq!(zpk.poles.len(), 2);
        assert!(zpk.is_stable());

        assert!(zpk.magnitude_db(60.0, 16384.0) < -30.0);
        assert!(zpk.magnitude_db(59.9, 16384.0) < -10.0);
        assert!(zpk.magnitude_db(60.1, 16384.0) < -10.0);
        assert!(zpk.magnitude_db(59.0, 16384.0) > -1.0 - 1e-6);
        assert!(zpk.magnitude_db(61.0, 16384.0) > -1.0 - 1e-6);
        assert!(zpk.magnitude_db(10.0, 16384.0).abs() < 0.01);
        assert!(zpk.magnitude_db(200.0, 16384.0).abs() < 0.01);
    }

    #[test]
    fn test_other_families() {
        let options = NotchOptions {
            family: IirFamily::Butter,
            ..NotchOptions::default()
        };
        let zpk = notch(50.0, 4096.0, &options).unwrap();
        assert!(zpk.is_stable());
        assert!(zpk.magnitude_db(50.0, 4096.0) < -10.0);
    }

    #[test]
    fn test_fir_notch_not_implemented() {
        let options = NotchOptions {
            filter_type: FilterType::Fir,
            ..NotchOptions::default()
        };
        assert!(matches!(
            notch(60.0, 16384.0, &options),
            Err(FilterError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_notch_at_dc_rejected() {
        assert!(notch(0.5, 16384.0, &NotchOptions::default()).is_err());
    }
}
