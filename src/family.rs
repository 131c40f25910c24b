//! Supported sensor families.
//!
//! A family is the hardware device type, identified by the one-byte code
//! embedded in the bus address of the device (the part before the dash in a
//! directory entry like `28-0316a4ffb1ff`). The family determines how the
//! raw register snapshot is decoded, which is resolved once at discovery
//! time instead of re-examining path prefixes on every read.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a family encodes its temperature on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// 16-bit two's-complement ADC count with 4 fractional bits
    /// (the 12-bit measurement standard).
    AdcCount,
    /// Precomputed signed millidegree integer in the `t=` field.
    Millidegree,
}

/// An enumerated hardware device family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum SensorFamily {
    #[serde(rename = "DS18S20")]
    Ds18s20,
    #[serde(rename = "DS1822")]
    Ds1822,
    #[serde(rename = "DS18B20")]
    Ds18b20,
    #[serde(rename = "DS1825")]
    Ds1825,
    #[serde(rename = "DS28EA00")]
    Ds28ea00,
    #[serde(rename = "MAX31850K")]
    Max31850k,
}

impl SensorFamily {
    /// All known families, in discovery match order.
    pub const ALL: [SensorFamily; 6] = [
        SensorFamily::Ds18s20,
        SensorFamily::Ds1822,
        SensorFamily::Ds18b20,
        SensorFamily::Ds1825,
        SensorFamily::Ds28ea00,
        SensorFamily::Max31850k,
    ];

    /// The one-byte family code embedded in the bus address.
    ///
    /// DS1825 and MAX31850K share the code 0x3B.
    pub fn code(self) -> u8 {
        match self {
            SensorFamily::Ds18s20 => 0x10,
            SensorFamily::Ds1822 => 0x22,
            SensorFamily::Ds18b20 => 0x28,
            SensorFamily::Ds1825 => 0x3B,
            SensorFamily::Ds28ea00 => 0x42,
            SensorFamily::Max31850k => 0x3B,
        }
    }

    /// Resolves a family code to its canonical family.
    ///
    /// For the shared code 0x3B the DS1825 wins; which display name a caller
    /// prefers for such devices is not a decoding concern.
    pub fn from_code(code: u8) -> Option<SensorFamily> {
        match code {
            0x10 => Some(SensorFamily::Ds18s20),
            0x22 => Some(SensorFamily::Ds1822),
            0x28 => Some(SensorFamily::Ds18b20),
            0x3B => Some(SensorFamily::Ds1825),
            0x42 => Some(SensorFamily::Ds28ea00),
            _ => None,
        }
    }

    /// Resolves a family name, e.g. from command line input.
    pub fn from_name(name: &str) -> Option<SensorFamily> {
        SensorFamily::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(name))
    }

    /// Human-readable device name.
    pub fn name(self) -> &'static str {
        match self {
            SensorFamily::Ds18s20 => "DS18S20",
            SensorFamily::Ds1822 => "DS1822",
            SensorFamily::Ds18b20 => "DS18B20",
            SensorFamily::Ds1825 => "DS1825",
            SensorFamily::Ds28ea00 => "DS28EA00",
            SensorFamily::Max31850k => "MAX31850K",
        }
    }

    /// How raw snapshots of this family are decoded.
    ///
    /// The DS18S20 predates the 12-bit measurement standard and only reports
    /// the precomputed millidegree value.
    pub fn decode_strategy(self) -> DecodeStrategy {
        match self {
            SensorFamily::Ds18s20 => DecodeStrategy::Millidegree,
            SensorFamily::Ds1822
            | SensorFamily::Ds18b20
            | SensorFamily::Ds1825
            | SensorFamily::Ds28ea00
            | SensorFamily::Max31850k => DecodeStrategy::AdcCount,
        }
    }

    /// Directory name prefix for devices of this family, e.g. `28-`.
    pub fn device_prefix(self) -> String {
        format!("{:02x}-", self.code())
    }
}

impl fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
