//! Custom error types for the library.
//!
//! This module defines the primary error type, `W1Error`, for the entire
//! crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle the different kinds of failures the w1 sysfs
//! interface can produce, from a missing kernel interface to a sensor that
//! has not finished a conversion cycle yet.
//!
//! Every error is raised synchronously from the operation that detects it;
//! nothing is logged-and-swallowed inside the library. Discovery returning an
//! empty list is *not* an error; only requesting a specific sensor that does
//! not exist is.

use thiserror::Error;

use crate::family::SensorFamily;

/// Convenience alias for results using the library error type.
pub type W1Result<T> = std::result::Result<T, W1Error>;

/// Primary error type for the w1 sensor library.
///
/// # Error Categories
///
/// Errors fall into three broad categories:
///
/// 1. **Interface errors** - `KernelModuleLoad`, `Io`, `Config`
///    - The kernel-backed filesystem interface is unavailable or unreadable.
///    - Recovery: check module installation and wiring, fix environment.
///
/// 2. **Sensor errors** - `NoSensorFound`, `SensorNotReady`, `ResetValue`
///    - A specific device is absent or produced an unusable snapshot.
///    - `SensorNotReady` and `ResetValue` are transient: retry after a short
///      delay. `NoSensorFound` means the device is gone.
///
/// 3. **Caller errors** - `UnsupportedUnit`, `InvalidResolution`,
///    `InvalidCalibrationData`
///    - Precondition violations detected before any hardware is touched.
#[derive(Error, Debug)]
pub enum W1Error {
    /// The w1 sysfs tree never appeared within the bounded retry budget.
    ///
    /// Raised by the readiness protocol after the advisory `modprobe` calls
    /// and the existence poll are exhausted. Treated as a hard dependency
    /// failure; it is not retried further up the stack.
    #[error("cannot load w1 kernel modules; the device interface never became available")]
    KernelModuleLoad,

    /// The requested sensor does not exist, or vanished between construction
    /// and a later read.
    #[error("{}", no_sensor_message(.family, .id))]
    NoSensorFound {
        /// Requested family, if the request named one.
        family: Option<SensorFamily>,
        /// Requested hardware id, if the request named one.
        id: Option<String>,
    },

    /// A read observed an invalid or incomplete hardware snapshot.
    ///
    /// Either the CRC marker was not "YES" or the byte groups were all zero
    /// (a disconnected or unpowered device reporting garbage). Callers are
    /// expected to retry after a short delay; the library does not auto-retry
    /// reads.
    #[error("sensor {id} is not yet ready to read a temperature")]
    SensorNotReady {
        /// Hardware id of the sensor that produced the snapshot.
        id: String,
    },

    /// The hardware returned its 85 °C power-on sentinel instead of a real
    /// measurement.
    #[error(
        "sensor {id} reports the power-on reset value of 85 degrees celsius; \
         check the power supply of the sensor"
    )]
    ResetValue {
        /// Hardware id of the sensor that produced the sentinel.
        id: String,
    },

    /// A unit identifier outside celsius, fahrenheit and kelvin was supplied.
    #[error("only degrees celsius, fahrenheit and kelvin are supported")]
    UnsupportedUnit,

    /// A resolution outside the 9-12 bit range was requested.
    ///
    /// Local precondition failure; no hardware write is attempted.
    #[error("the sensor resolution {resolution} is out of range (9-12 bits)")]
    InvalidResolution {
        /// The rejected resolution value.
        resolution: u8,
    },

    /// The resolution write to the device control path failed.
    #[error(
        "failed to change the resolution to {resolution} bits; \
         you might need elevated privileges to change the resolution"
    )]
    SetResolutionFailed {
        /// The resolution that could not be set.
        resolution: u8,
    },

    /// The EEPROM commit after a successful resolution write failed.
    ///
    /// Kept distinct from [`W1Error::SetResolutionFailed`] so callers can
    /// tell "resolution changed but not persisted" from "resolution never
    /// changed".
    #[error("failed to persist the resolution configuration to the sensor EEPROM")]
    PersistResolutionFailed,

    /// Calibration construction invariants were violated.
    #[error("invalid calibration data: {reason} ({data})")]
    InvalidCalibrationData {
        /// Which invariant failed.
        reason: &'static str,
        /// Debug rendering of the rejected data.
        data: String,
    },

    /// Environment-based settings could not be read.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// An I/O operation outside the sensor data file failed.
    ///
    /// Failures to open the data file itself are reported as
    /// [`W1Error::NoSensorFound`] instead: the decoder treats "cannot open"
    /// as "no longer present".
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn no_sensor_message(family: &Option<SensorFamily>, id: &Option<String>) -> String {
    let subject = match (family, id) {
        (Some(family), Some(id)) => format!("could not find {} sensor with id {}", family, id),
        (Some(family), None) => format!("could not find any {} sensor", family),
        (None, Some(id)) => format!("could not find sensor with id {}", id),
        (None, None) => "could not find any sensor".to_string(),
    };
    format!(
        "{}; check the cabling and that dtoverlay=w1-gpio is enabled in /boot/config.txt",
        subject
    )
}
