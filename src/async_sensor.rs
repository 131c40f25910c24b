//! Asynchronous sensor variant.
//!
//! [`AsyncThermSensor`] exposes the same read operations as
//! [`ThermSensor`](crate::sensor::ThermSensor) with suspend points around the
//! file I/O only; decoding, calibration and unit conversion are pure
//! computation and never suspend. Overlapping reads of *different* sensors
//! are fully independent; for the *same* sensor, call order determines read
//! order because each operation awaits its own snapshot before returning.

use tokio::fs;

use crate::config::Settings;
use crate::error::{W1Error, W1Result};
use crate::family::SensorFamily;
use crate::sensor::{RawReading, ThermSensor};
use crate::units::Unit;

/// Async wrapper around a [`ThermSensor`].
///
/// Construction and resolution writes go through the synchronous core (both
/// are quick existence probes or blocking external-process invocations by
/// contract); only the per-read file I/O is asynchronous.
#[derive(Debug, Clone)]
pub struct AsyncThermSensor {
    inner: ThermSensor,
}

impl AsyncThermSensor {
    /// Takes the first sensor of any family. See
    /// [`ThermSensor::first`].
    pub fn first(settings: &Settings) -> W1Result<Self> {
        ThermSensor::first(settings).map(Self::from)
    }

    /// Takes the first discovered sensor of the given family. See
    /// [`ThermSensor::by_family`].
    pub fn by_family(settings: &Settings, family: SensorFamily) -> W1Result<Self> {
        ThermSensor::by_family(settings, family).map(Self::from)
    }

    /// Finds the sensor with the given hardware id. See
    /// [`ThermSensor::by_id`].
    pub fn by_id(settings: &Settings, id: &str) -> W1Result<Self> {
        ThermSensor::by_id(settings, id).map(Self::from)
    }

    /// Constructs a handle for a known family and hardware id. See
    /// [`ThermSensor::new`].
    pub fn new(settings: &Settings, family: SensorFamily, id: &str) -> W1Result<Self> {
        ThermSensor::new(settings, family, id).map(Self::from)
    }

    /// The wrapped synchronous handle, for construction-time configuration
    /// (offset, calibration) and resolution writes.
    pub fn inner(&self) -> &ThermSensor {
        &self.inner
    }

    /// Mutable access to the wrapped handle.
    pub fn inner_mut(&mut self) -> &mut ThermSensor {
        &mut self.inner
    }

    /// Reads and parses one snapshot without blocking the executor.
    pub async fn read_raw(&self) -> W1Result<RawReading> {
        let contents = fs::read_to_string(self.inner.device_path())
            .await
            .map_err(|_| W1Error::NoSensorFound {
                family: Some(self.inner.family()),
                id: Some(self.inner.id().to_string()),
            })?;
        RawReading::parse(self.inner.id(), &contents)
    }

    /// Reads the current temperature in the given unit.
    pub async fn temperature(&self, unit: Unit) -> W1Result<f64> {
        let reading = self.read_raw().await?;
        self.inner.temperature_from_reading(&reading, unit)
    }

    /// Reads the temperature once and returns it in each of the given units,
    /// in matching order.
    pub async fn temperatures(&self, units_wanted: &[Unit]) -> W1Result<Vec<f64>> {
        let reading = self.read_raw().await?;
        units_wanted
            .iter()
            .map(|&unit| self.inner.temperature_from_reading(&reading, unit))
            .collect()
    }

    /// Reads the sampling resolution from the configuration register.
    pub async fn resolution(&self) -> W1Result<u8> {
        self.read_raw().await?.resolution()
    }
}

impl From<ThermSensor> for AsyncThermSensor {
    fn from(inner: ThermSensor) -> Self {
        Self { inner }
    }
}
