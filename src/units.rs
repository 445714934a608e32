//! Unit handling for frequency-like inputs.
//!
//! Designers accept either bare numbers (taken to already be in Hz) or a
//! [`Quantity`] carrying its own unit. Everything is reduced to a plain
//! `f64` in Hz before any numerics happen.
//!
//! # Parsing formats
//! - `Hz`, `mHz`, `kHz`, `MHz`, `GHz` - cycle frequency
//! - `rad/s` - angular frequency
//! - `s`, `ms` - time
//! - `m` - length
//! - empty string or `1` - dimensionless
//!
//! # Example
//! ```
//! use filterdesign::units::{Quantity, Scalar, Unit};
//!
//! let f = Scalar::from(Quantity::new(1.5, Unit::Kilohertz));
//! assert_eq!(f.as_hz().unwrap(), 1500.0);
//! ```

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical dimension of a [`Unit`]. Conversions only happen within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Frequency,
    AngularFrequency,
    Time,
    Length,
    Dimensionless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "mHz")]
    Millihertz,
    #[serde(rename = "Hz")]
    Hertz,
    #[serde(rename = "kHz")]
    Kilohertz,
    #[serde(rename = "MHz")]
    Megahertz,
    #[serde(rename = "GHz")]
    Gigahertz,
    #[serde(rename = "rad/s")]
    RadiansPerSecond,
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "ms")]
    Millisecond,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "")]
    Dimensionless,
}

impl Unit {
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Millihertz | Unit::Hertz | Unit::Kilohertz | Unit::Megahertz | Unit::Gigahertz => {
                Dimension::Frequency
            }
            Unit::RadiansPerSecond => Dimension::AngularFrequency,
            Unit::Second | Unit::Millisecond => Dimension::Time,
            Unit::Meter => Dimension::Length,
            Unit::Dimensionless => Dimension::Dimensionless,
        }
    }

    /// Multiplier taking a value in this unit to the SI base unit of its dimension
    fn scale(&self) -> f64 {
        match self {
            Unit::Millihertz => 1e-3,
            Unit::Hertz => 1.0,
            Unit::Kilohertz => 1e3,
            Unit::Megahertz => 1e6,
            Unit::Gigahertz => 1e9,
            Unit::RadiansPerSecond => 1.0,
            Unit::Second => 1.0,
            Unit::Millisecond => 1e-3,
            Unit::Meter => 1.0,
            Unit::Dimensionless => 1.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Millihertz => "mHz",
            Unit::Hertz => "Hz",
            Unit::Kilohertz => "kHz",
            Unit::Megahertz => "MHz",
            Unit::Gigahertz => "GHz",
            Unit::RadiansPerSecond => "rad/s",
            Unit::Second => "s",
            Unit::Millisecond => "ms",
            Unit::Meter => "m",
            Unit::Dimensionless => "",
        }
    }

    /// Factor converting a value in `self` to `target`
    pub fn conversion_factor(&self, target: Unit) -> Result<f64> {
        if self.dimension() != target.dimension() {
            return Err(FilterError::InvalidUnit(format!(
                "'{}' ({:?}) and '{}' ({:?}) are not convertible",
                self.symbol(),
                self.dimension(),
                target.symbol(),
                target.dimension()
            )));
        }
        Ok(self.scale() / target.scale())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        // Case matters: "mHz" and "MHz" differ by nine orders of magnitude.
        match s.trim() {
            "mHz" => Ok(Unit::Millihertz),
            "Hz" | "hz" => Ok(Unit::Hertz),
            "kHz" | "khz" => Ok(Unit::Kilohertz),
            "MHz" => Ok(Unit::Megahertz),
            "GHz" => Ok(Unit::Gigahertz),
            "rad/s" | "rad / s" => Ok(Unit::RadiansPerSecond),
            "s" => Ok(Unit::Second),
            "ms" => Ok(Unit::Millisecond),
            "m" => Ok(Unit::Meter),
            "" | "1" => Ok(Unit::Dimensionless),
            other => Err(FilterError::InvalidUnit(format!("unrecognized unit '{}'", other))),
        }
    }
}

/// A value with an attached unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn hz(value: f64) -> Self {
        Self::new(value, Unit::Hertz)
    }

    /// Express this quantity in `unit`
    ///
    /// # Errors
    /// Returns `FilterError::InvalidUnit` if the dimensions differ
    pub fn to(&self, unit: Unit) -> Result<f64> {
        Ok(self.value * self.unit.conversion_factor(unit)?)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit == Unit::Dimensionless {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

impl FromStr for Quantity {
    type Err = FilterError;

    /// Parses `"<number> <unit>"`, with or without the space (`"60Hz"`, `"1.5 kHz"`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic() || c == '/')
            .unwrap_or(s.len());
        let (num, unit) = s.split_at(split);
        // An exponent such as "1e3" starts with a letter too.
        let (num, unit) = if unit.starts_with(['e', 'E'])
            && unit[1..].starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+')
        {
            let rest = &unit[1..];
            let end = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '+' || c == '.'))
                .unwrap_or(rest.len());
            (&s[..split + 1 + end], &rest[end..])
        } else {
            (num, unit)
        };
        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| FilterError::InvalidArgument(format!("invalid quantity: {}", s)))?;
        Ok(Self::new(value, unit.parse()?))
    }
}

/// A bare number or a dimensioned quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bare(f64),
    Quantity(Quantity),
}

impl Scalar {
    /// Reduce to a bare `f64` in `unit`
    ///
    /// Bare numbers are assumed to already be expressed in `unit`.
    pub fn to_unit(&self, unit: Unit) -> Result<f64> {
        match self {
            Scalar::Bare(v) => Ok(*v),
            Scalar::Quantity(q) => q.to(unit),
        }
    }

    pub fn as_hz(&self) -> Result<f64> {
        self.to_unit(Unit::Hertz)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Bare(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Bare(v as f64)
    }
}

impl From<Quantity> for Scalar {
    fn from(q: Quantity) -> Self {
        Scalar::Quantity(q)
    }
}

impl FromStr for Scalar {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(v) = s.trim().parse::<f64>() {
            return Ok(Scalar::Bare(v));
        }
        Ok(Scalar::Quantity(s.parse()?))
    }
}

/// Reduce any frequency-like input to Hz
pub fn as_hz(value: impl Into<Scalar>) -> Result<f64> {
    value.into().as_hz()
}
