//! # w1therm
//!
//! A library and CLI tool to work with w1 (1-Wire) temperature sensors on
//! Linux. The `w1-gpio` and `w1-therm` kernel modules expose each connected
//! sensor as a line-oriented text file under `/sys/bus/w1/devices`; this
//! crate interprets and manages that contract: it discovers sensors,
//! decodes their raw register snapshots into calibrated temperatures in
//! multiple units, and controls the sampling resolution.
//!
//! ## Crate Structure
//!
//! The library is organized into several modules, each with a distinct
//! responsibility:
//!
//! - **`config`**: The [`Settings`] context value (device directory,
//!   module auto-load switch, retry policy) threaded through discovery and
//!   readiness checks, sourced from `W1THERM_*` environment variables.
//! - **`error`**: The custom [`W1Error`] enum for centralized error handling
//!   across the crate.
//! - **`family`**: The supported hardware device families and their decode
//!   strategies.
//! - **`kernel`**: The readiness protocol that loads the kernel modules and
//!   waits for the device interface to appear.
//! - **`units`**: Pairwise temperature unit conversion.
//! - **`calibration`**: Two-point linear correction of raw readings.
//! - **`sensor`**: The [`ThermSensor`] handle: discovery, construction, raw
//!   snapshot decoding, offsets and resolution control.
//! - **`async_sensor`**: The [`AsyncThermSensor`] variant with suspend
//!   points around the file I/O only.
//!
//! ## Example
//!
//! ```rust,no_run
//! use w1therm::{Settings, ThermSensor, Unit};
//!
//! # fn main() -> w1therm::W1Result<()> {
//! let settings = Settings::from_env()?;
//! let sensor = ThermSensor::first(&settings)?;
//! println!("{}: {:.2} °C", sensor.id(), sensor.temperature(Unit::Celsius)?);
//! # Ok(())
//! # }
//! ```
//!
//! Supported sensors: DS18S20, DS1822, DS18B20, DS1825, DS28EA00,
//! MAX31850K. Supported units: Celsius, Fahrenheit, Kelvin.

pub mod async_sensor;
pub mod calibration;
pub mod config;
pub mod error;
pub mod family;
pub mod kernel;
pub mod sensor;
pub mod units;

pub use async_sensor::AsyncThermSensor;
pub use calibration::CalibrationData;
pub use config::{RetryPolicy, Settings};
pub use error::{W1Error, W1Result};
pub use family::{DecodeStrategy, SensorFamily};
pub use sensor::{RawReading, ThermSensor};
pub use units::Unit;
