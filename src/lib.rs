pub mod bilinear;
pub mod config;
pub mod constants;
pub mod design;
pub mod error;
pub mod lti;
pub mod synthesis;
pub mod units;
pub mod zpk;

pub use bilinear::bilinear_zpk;
pub use config::{DesignOptions, FilterConfig, NotchOptions};
pub use design::{DesignedFilter, bandpass, highpass, lowpass, notch, num_taps};
pub use error::{FilterError, Result};
pub use lti::{is_zpk, normalize_filter_input, parse_digital_lti};
pub use zpk::{Sos, TransferFunction, Zpk, concatenate_zpks};
