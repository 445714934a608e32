use super::{DesignedFilter, FilterSpec, design_fir, design_iir};
use crate::config::{DesignOptions, FilterType};
use crate::constants::{HIGHPASS_STOPBAND_RATIO, LOWPASS_STOPBAND_RATIO};
use crate::error::Result;
use crate::units::Scalar;
use log::debug;

fn design(spec: FilterSpec, options: &DesignOptions) -> Result<DesignedFilter> {
    match options.filter_type {
        FilterType::Iir => design_iir(&spec, options.family, options.output),
        FilterType::Fir => design_fir(&spec, &options.fir),
    }
}

fn spec(passband: Vec<f64>, stopband: Vec<f64>, sample_rate: f64, options: &DesignOptions) -> FilterSpec {
    FilterSpec::new(passband, stopband, sample_rate)
        .with_tolerances(options.gpass, options.gstop)
        .with_analog(options.analog)
}

/// Design a low-pass filter
///
/// `fstop` defaults to `1.5 × frequency`, capped at Nyquist.
///
/// # Example
/// ```
/// use filterdesign::config::DesignOptions;
/// use filterdesign::design::lowpass;
///
/// let filter = lowpass(1000.0, 4096.0, None, &DesignOptions::default()).unwrap();
/// assert!((filter.magnitude_db(1000.0, 4096.0) + 2.0).abs() < 1e-6);
/// ```
pub fn lowpass(
    frequency: impl Into<Scalar>,
    sample_rate: impl Into<Scalar>,
    fstop: Option<Scalar>,
    options: &DesignOptions,
) -> Result<DesignedFilter> {
    let frequency = frequency.into().as_hz()?;
    let sample_rate = sample_rate.into().as_hz()?;
    let fstop = match fstop {
        Some(f) => f.as_hz()?,
        None => (LOWPASS_STOPBAND_RATIO * frequency).min(sample_rate / 2.0),
    };
    debug!("lowpass: {} Hz, stopband from {} Hz", frequency, fstop);

    design(spec(vec![frequency], vec![fstop], sample_rate, options), options)
}

/// Design a high-pass filter
///
/// `fstop` defaults to `2/3 × frequency`.
pub fn highpass(
    frequency: impl Into<Scalar>,
    sample_rate: impl Into<Scalar>,
    fstop: Option<Scalar>,
    options: &DesignOptions,
) -> Result<DesignedFilter> {
    let frequency = frequency.into().as_hz()?;
    let sample_rate = sample_rate.into().as_hz()?;
    let fstop = match fstop {
        Some(f) => f.as_hz()?,
        None => HIGHPASS_STOPBAND_RATIO * frequency,
    };
    debug!("highpass: {} Hz, stopband below {} Hz", frequency, fstop);

    design(spec(vec![frequency], vec![fstop], sample_rate, options), options)
}

/// Design a band-pass filter passing `flow..fhigh`
///
/// `fstop` defaults to `(2/3 × flow, 1.5 × fhigh)`, with the upper edge
/// capped at Nyquist. FIR designs always use `pass_zero = false`.
pub fn bandpass(
    flow: impl Into<Scalar>,
    fhigh: impl Into<Scalar>,
    sample_rate: impl Into<Scalar>,
    fstop: Option<(Scalar, Scalar)>,
    options: &DesignOptions,
) -> Result<DesignedFilter> {
    let flow = flow.into().as_hz()?;
    let fhigh = fhigh.into().as_hz()?;
    let sample_rate = sample_rate.into().as_hz()?;
    let (slow, shigh) = match fstop {
        Some((lo, hi)) => (lo.as_hz()?, hi.as_hz()?),
        None => (
            HIGHPASS_STOPBAND_RATIO * flow,
            (LOWPASS_STOPBAND_RATIO * fhigh).min(sample_rate / 2.0),
        ),
    };
    debug!(
        "bandpass: {}-{} Hz, stopbands below {} Hz and above {} Hz",
        flow, fhigh, slow, shigh
    );

    let mut options = options.clone();
    options.fir.pass_zero = Some(false);
    design(
        spec(vec![flow, fhigh], vec![slow, shigh], sample_rate, &options),
        &options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::FilterError;
    use crate::units::{Quantity, Unit};
    use approx::assert_relative_eq;

    #[test]
    fn test_lowpass_default_stopband() {
        let filter = lowpass(1000.0, 4096.0, None, &DesignOptions::default()).unwrap();
        assert!(filter.magnitude_db(1500.0, 4096.0) < -30.0);
        assert!(filter.magnitude_db(1000.0, 4096.0) > -2.0 - 1e-6);
    }

    #[test]
    fn test_lowpass_stopband_capped_at_nyquist() {
        let filter = lowpass(1500.0, 4096.0, None, &DesignOptions::default()).unwrap();
        assert!(filter.magnitude_db(2048.0, 4096.0) < -30.0);
    }

    #[test]
    fn test_explicit_stopband() {
        let opts = DesignOptions::default();
        let tight = lowpass(1000.0, 4096.0, Some(Scalar::from(1100.0)), &opts).unwrap();
        let loose = lowpass(1000.0, 4096.0, None, &opts).unwrap();
        let order = |f: &DesignedFilter| f.as_zpk().map(|z| z.poles.len()).unwrap_or(0);
        assert!(order(&tight) > order(&loose));
        assert!(tight.magnitude_db(1100.0, 4096.0) < -30.0);
    }

    #[test]
    fn test_highpass_reference() {
        let filter = highpass(100.0, 4096.0, None, &DesignOptions::default()).unwrap();
        assert_eq!(filter.as_zpk().unwrap().poles.len(), 5);
        assert_relative_eq!(filter.magnitude_db(100.0, 4096.0), -2.0, epsilon = 1e-6);
        assert!(filter.magnitude_db(200.0 / 3.0, 4096.0) < -30.0);
    }

    #[test]
    fn test_bandpass_reference() {
        let filter = bandpass(100.0, 1000.0, 4096.0, None, &DesignOptions::default()).unwrap();
        let zpk = filter.as_zpk().unwrap();
        assert_eq!(zpk.poles.len(), 10);
        assert!(zpk.is_stable());
        assert_relative_eq!(filter.magnitude_db(100.0, 4096.0), -2.0, epsilon = 1e-6);
        assert_relative_eq!(filter.magnitude_db(1000.0, 4096.0), -2.0, epsilon = 1e-6);
        assert!(filter.magnitude_db(200.0 / 3.0, 4096.0) < -30.0);
        assert!(filter.magnitude_db(1500.0, 4096.0) < -30.0);
    }

    #[test]
    fn test_bandpass_fir_passes_band_centre() {
        let opts = DesignOptions::default().fir();
        let filter = bandpass(100.0, 200.0, 1024.0, None, &opts).unwrap();
        assert_eq!(filter.taps().unwrap().len(), 45);
        assert_relative_eq!(filter.response(150.0, 1024.0).norm(), 1.0, epsilon = 1e-9);
        assert!(filter.response(0.0, 1024.0).norm() < 0.1);
    }

    #[test]
    fn test_quantity_arguments() {
        let opts = DesignOptions {
            output: OutputFormat::Sos,
            ..DesignOptions::default()
        };
        let hz = lowpass(1000.0, 4096.0, None, &opts).unwrap();
        let khz = lowpass(
            Quantity::new(1.0, Unit::Kilohertz),
            Quantity::new(4.096, Unit::Kilohertz),
            None,
            &opts,
        )
        .unwrap();
        assert_relative_eq!(
            hz.magnitude_db(1200.0, 4096.0),
            khz.magnitude_db(1200.0, 4096.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_non_frequency_quantity_rejected() {
        let err = lowpass(
            Quantity::new(1.0, Unit::Second),
            4096.0,
            None,
            &DesignOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::InvalidUnit(_)));
    }

    #[test]
    fn test_cutoff_above_nyquist_rejected() {
        assert!(lowpass(3000.0, 4096.0, None, &DesignOptions::default()).is_err());
    }
}
