use super::{DesignedFilter, FilterSpec};
use crate::config::OutputFormat;
use crate::constants::TWO_PI;
use crate::error::Result;
use crate::synthesis::{self, IirFamily};
use log::debug;

/// Design a minimum-order IIR filter for `spec`
///
/// Digital edges are normalized to the Nyquist frequency, so digital specs
/// need a sample rate. Analog edges are converted to rad/s for the design,
/// and the resulting s-plane roots are mapped back to Hz with `s → -s/2π`,
/// so the returned ZPK can be handed straight to
/// [`crate::bilinear::bilinear_zpk`] with unit Hz. The analog gain is left
/// in rad/s units.
pub fn design_iir(spec: &FilterSpec, family: IirFamily, output: OutputFormat) -> Result<DesignedFilter> {
    spec.validate()?;

    let scale = if spec.analog { TWO_PI } else { 1.0 / spec.nyquist()? };
    let wp: Vec<f64> = spec.passband.iter().map(|f| f * scale).collect();
    let ws: Vec<f64> = spec.stopband.iter().map(|f| f * scale).collect();
    debug!(
        "design_iir: {} wp={:?} ws={:?} gpass={} gstop={} analog={}",
        family, wp, ws, spec.gpass, spec.gstop, spec.analog
    );

    let mut zpk = synthesis::iirdesign(&wp, &ws, spec.gpass, spec.gstop, spec.analog, family)?;
    if spec.analog {
        for root in zpk.zeros.iter_mut().chain(zpk.poles.iter_mut()) {
            *root /= -TWO_PI;
        }
    }

    Ok(match output {
        OutputFormat::Zpk => DesignedFilter::Zpk(zpk),
        OutputFormat::Ba => DesignedFilter::TransferFunction(synthesis::zpk2tf(&zpk)?),
        OutputFormat::Sos => DesignedFilter::Sos(synthesis::zpk2sos(&zpk)?),
    })
}
