//! Design options for the filter designers.
//!
//! Every option struct has documented defaults and deserializes from TOML
//! with missing keys falling back to those defaults:
//!
//! ```toml
//! [design]
//! gpass = 1.0
//! gstop = 60.0
//! type = "iir"
//! output = "sos"
//! family = "ellip"
//!
//! [design.fir]
//! window = "kaiser:8.6"
//! method = "remez"
//!
//! [notch]
//! gstop = 20.0
//! ```

use crate::error::{FilterError, Result};
use crate::synthesis::{IirFamily, Window};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Infinite or finite impulse response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Iir,
    Fir,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterType::Iir => write!(f, "iir"),
            FilterType::Fir => write!(f, "fir"),
        }
    }
}

impl FromStr for FilterType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iir" => Ok(FilterType::Iir),
            "fir" => Ok(FilterType::Fir),
            other => Err(FilterError::InvalidArgument(format!(
                "unknown filter type '{}' (expected 'iir' or 'fir')",
                other
            ))),
        }
    }
}

/// Output form of an IIR design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Zeros, poles and gain
    #[default]
    Zpk,
    /// Numerator and denominator polynomials
    Ba,
    /// Second-order sections
    Sos,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Zpk => write!(f, "zpk"),
            OutputFormat::Ba => write!(f, "ba"),
            OutputFormat::Sos => write!(f, "sos"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zpk" => Ok(OutputFormat::Zpk),
            "ba" => Ok(OutputFormat::Ba),
            "sos" => Ok(OutputFormat::Sos),
            other => Err(FilterError::InvalidArgument(format!(
                "'{}' is not a valid output form",
                other
            ))),
        }
    }
}

/// FIR synthesis method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FirMethod {
    /// Windowed sinc
    #[default]
    Window,
    /// Parks-McClellan equiripple
    Remez,
}

impl fmt::Display for FirMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirMethod::Window => write!(f, "window"),
            FirMethod::Remez => write!(f, "remez"),
        }
    }
}

impl FromStr for FirMethod {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "window" | "firwin" => Ok(FirMethod::Window),
            "remez" | "pm" | "parks-mcclellan" => Ok(FirMethod::Remez),
            other => Err(FilterError::InvalidArgument(format!(
                "unknown FIR method '{}'",
                other
            ))),
        }
    }
}

/// Options for the FIR path of the designers
///
/// Unset fields are decided per design: the window falls back to Hamming,
/// `pass_zero` to whether DC lies in the passband, and `width` to the
/// transition width when a single stopband edge is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirOptions {
    pub window: Option<Window>,
    pub pass_zero: Option<bool>,
    /// Transition width in Hz; switches the design to a Kaiser window
    pub width: Option<f64>,
    /// Normalize the first passband to unit gain
    pub scale: bool,
    pub method: FirMethod,
}

impl Default for FirOptions {
    fn default() -> Self {
        Self {
            window: None,
            pass_zero: None,
            width: None,
            scale: true,
            method: FirMethod::default(),
        }
    }
}

/// Options shared by `lowpass`, `highpass` and `bandpass`
///
/// # Example
/// ```
/// use filterdesign::config::{DesignOptions, OutputFormat};
///
/// let opts = DesignOptions::from_toml_str("gstop = 60.0\noutput = \"sos\"").unwrap();
/// assert_eq!(opts.gpass, 2.0);
/// assert_eq!(opts.gstop, 60.0);
/// assert_eq!(opts.output, OutputFormat::Sos);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignOptions {
    /// Maximum passband loss (dB)
    pub gpass: f64,
    /// Minimum stopband attenuation (dB)
    pub gstop: f64,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub output: OutputFormat,
    pub family: IirFamily,
    /// Design in the s-plane; frequencies are still given in Hz
    pub analog: bool,
    pub fir: FirOptions,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self {
            gpass: 2.0,
            gstop: 30.0,
            filter_type: FilterType::Iir,
            output: OutputFormat::Zpk,
            family: IirFamily::Cheby1,
            analog: false,
            fir: FirOptions::default(),
        }
    }
}

impl DesignOptions {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| FilterError::InvalidArgument(format!("invalid design options: {}", e)))
    }

    /// Finite-impulse-response variant of these options
    pub fn fir(mut self) -> Self {
        self.filter_type = FilterType::Fir;
        self
    }
}

/// Options for `notch`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotchOptions {
    pub gpass: f64,
    pub gstop: f64,
    pub family: IirFamily,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
}

impl Default for NotchOptions {
    fn default() -> Self {
        Self {
            gpass: 1.0,
            gstop: 10.0,
            family: IirFamily::Ellip,
            filter_type: FilterType::Iir,
        }
    }
}

/// File-level configuration: a `[design]` table and a `[notch]` table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub design: DesignOptions,
    pub notch: NotchOptions,
}

impl FilterConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| FilterError::InvalidArgument(format!("invalid configuration: {}", e)))
    }
}
