//! Temperature units and pairwise conversion.
//!
//! Conversion is defined for every ordered `(from, to)` pair individually
//! (nine entries, including the three identities) instead of pivoting through
//! a single base unit. Chaining two conversions would compound floating-point
//! error, and the offset bias-cancellation math in
//! [`crate::sensor::ThermSensor::set_offset`] depends on each pair being
//! exact on its own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{W1Error, W1Result};

/// A temperature unit understood by this library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Degrees Celsius, the native unit of the w1 sensor interface.
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
    /// Kelvin.
    Kelvin,
}

impl Unit {
    /// All supported units.
    pub const ALL: [Unit; 3] = [Unit::Celsius, Unit::Fahrenheit, Unit::Kelvin];

    /// Lowercase identifier used on the command line and in JSON output.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Celsius => "celsius",
            Unit::Fahrenheit => "fahrenheit",
            Unit::Kelvin => "kelvin",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = W1Error;

    /// Resolves an external unit identifier, e.g. user input.
    fn from_str(s: &str) -> W1Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "celsius" => Ok(Unit::Celsius),
            "fahrenheit" => Ok(Unit::Fahrenheit),
            "kelvin" => Ok(Unit::Kelvin),
            _ => Err(W1Error::UnsupportedUnit),
        }
    }
}

/// A pure conversion function between two fixed units.
pub type Conversion = fn(f64) -> f64;

/// Conversion table keyed by `(from, to)` pairs.
///
/// Every pair carries its own closed-form expression; there is no implicit
/// C→F→K chaining.
const CONVERSIONS: [((Unit, Unit), Conversion); 9] = [
    // identities
    ((Unit::Celsius, Unit::Celsius), |x| x),
    ((Unit::Fahrenheit, Unit::Fahrenheit), |x| x),
    ((Unit::Kelvin, Unit::Kelvin), |x| x),
    // celsius to X
    ((Unit::Celsius, Unit::Fahrenheit), |x| x * 1.8 + 32.0),
    ((Unit::Celsius, Unit::Kelvin), |x| x + 273.15),
    // fahrenheit to X
    ((Unit::Fahrenheit, Unit::Celsius), |x| (x - 32.0) * (5.0 / 9.0)),
    ((Unit::Fahrenheit, Unit::Kelvin), |x| {
        (x - 32.0) * (5.0 / 9.0) + 273.15
    }),
    // kelvin to X
    ((Unit::Kelvin, Unit::Celsius), |x| x - 273.15),
    ((Unit::Kelvin, Unit::Fahrenheit), |x| (x - 273.15) * 1.8 + 32.0),
];

/// Looks up the conversion function for a unit pair.
///
/// Fails with [`W1Error::UnsupportedUnit`] if the pair is not in the table.
pub fn conversion(from: Unit, to: Unit) -> W1Result<Conversion> {
    CONVERSIONS
        .iter()
        .find(|((f, t), _)| *f == from && *t == to)
        .map(|(_, convert)| *convert)
        .ok_or(W1Error::UnsupportedUnit)
}

/// Converts `value` from one unit to another.
pub fn convert(value: f64, from: Unit, to: Unit) -> W1Result<f64> {
    Ok(conversion(from, to)?(value))
}
