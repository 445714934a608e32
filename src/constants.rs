//! Numeric constants shared by the design and normalization routines.

use std::f64::consts::PI;

/// Conversion factor between cycle frequency (Hz) and angular frequency (rad/s).
pub const TWO_PI: f64 = 2.0 * PI;

/// Threshold below which a root's imaginary part (or a Jacobi `sn` value)
/// is treated as exactly zero by the elliptic prototype.
pub const ELLIP_EPSILON: f64 = 2e-16;

/// Relative tolerance for matching complex-conjugate root pairs.
///
/// Roots recovered from the companion matrix are accurate to roughly
/// `sqrt(eps)` for clustered roots, so this is far looser than the
/// `100 * eps` used for exactly-constructed prototypes.
pub const CONJUGATE_TOLERANCE: f64 = 1e-8;

/// Stopband edge heuristics used when the caller gives no `fstop`.
pub const LOWPASS_STOPBAND_RATIO: f64 = 1.5;
pub const HIGHPASS_STOPBAND_RATIO: f64 = 2.0 / 3.0;

/// Half-widths (Hz) of the two bands placed around a notch frequency.
pub const NOTCH_OUTER_HALF_WIDTH: f64 = 1.0;
pub const NOTCH_INNER_HALF_WIDTH: f64 = 0.1;

/// Absolute tolerance of the bounded scalar minimizer used by band-stop
/// order selection.
pub const MINIMIZE_XTOL: f64 = 1e-5;

/// Largest IIR order the designers will synthesize. Prototype roots and
/// polynomial expansions lose all precision long before this.
pub const MAX_IIR_ORDER: usize = 100;

/// Largest FIR tap count the designers will synthesize.
pub const MAX_FIR_TAPS: usize = 1 << 16;
