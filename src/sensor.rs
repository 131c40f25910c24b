//! Sensor discovery, raw value decoding and resolution control.
//!
//! A [`ThermSensor`] identifies one physical device behind the w1 sysfs
//! interface. The handle is created once per logical sensor (by discovery or
//! explicit construction, which validates that the backing path exists) and
//! reused across many reads; every read opens, parses and closes the
//! kernel-maintained `w1_slave` snapshot file, so no in-process state needs
//! locking and no reading is ever cached.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use tracing::{debug, info};

use crate::calibration::CalibrationData;
use crate::config::Settings;
use crate::error::{W1Error, W1Result};
use crate::family::{DecodeStrategy, SensorFamily};
use crate::kernel;
use crate::units::{self, Unit};

/// Name of the per-device data file inside its directory entry.
pub const SLAVE_FILE: &str = "w1_slave";

/// Power-on default of the temperature register. A 12-bit reading that
/// decodes to exactly this value is a hardware fault or "no measurement yet"
/// signal, never a legitimate temperature.
const RESET_VALUE_CELSIUS: f64 = 85.0;

/// The integer part of the 12-bit count is 8 bits wide, leaving 4 fractional
/// bits, so one degree spans 2^4 = 16 counts.
const ADC_FRACTION_DIVISOR: f64 = 16.0;

/// Byte pattern reported by a disconnected or unpowered device. Such a
/// snapshot may still carry a valid CRC marker and must not be mistaken for
/// a zero-degree reading.
const ZERO_BYTE_GROUPS: &str = "00 00 00 00 00 00 00 00 00";

/// One parsed snapshot of a device's data file.
///
/// Ephemeral by design: the physical value changes over time, so a reading
/// is recomputed on every access and never cached across reads.
#[derive(Debug, Clone)]
pub struct RawReading {
    id: String,
    status_line: String,
    data_line: String,
}

impl RawReading {
    /// Parses the two-line snapshot text, rejecting incomplete hardware
    /// states.
    ///
    /// A missing "YES" marker means the driver has not completed a CRC-valid
    /// conversion cycle; all-zero byte groups mean the device lost power
    /// mid-read. Both raise [`W1Error::SensorNotReady`] and are expected to
    /// be retried by the caller after a short delay.
    pub fn parse(id: &str, contents: &str) -> W1Result<Self> {
        let mut lines = contents.lines();
        let status_line = lines.next().unwrap_or("").trim().to_string();
        let data_line = lines.next().unwrap_or("").trim().to_string();

        let reading = Self {
            id: id.to_string(),
            status_line,
            data_line,
        };

        if !reading.crc_ready() || reading.is_all_zero() {
            return Err(reading.not_ready());
        }

        Ok(reading)
    }

    /// Whether the driver marked the snapshot CRC-valid.
    pub fn crc_ready(&self) -> bool {
        self.status_line.ends_with("YES")
    }

    /// Whether the snapshot consists entirely of zero byte groups.
    pub fn is_all_zero(&self) -> bool {
        self.status_line.contains(ZERO_BYTE_GROUPS)
    }

    /// Decodes the snapshot to degrees Celsius according to the family's
    /// encoding.
    pub fn celsius(&self, family: SensorFamily) -> W1Result<f64> {
        match family.decode_strategy() {
            DecodeStrategy::AdcCount => {
                let value = f64::from(self.adc_count()?) / ADC_FRACTION_DIVISOR;
                if value == RESET_VALUE_CELSIUS {
                    return Err(W1Error::ResetValue {
                        id: self.id.clone(),
                    });
                }
                Ok(value)
            }
            DecodeStrategy::Millidegree => Ok(self.millidegrees()? as f64 * 0.001),
        }
    }

    /// The signed two's-complement 16-bit ADC count.
    ///
    /// The first two byte tokens are LSB and MSB, in that file order.
    pub fn adc_count(&self) -> W1Result<i32> {
        let mut tokens = self.status_line.split_whitespace();
        let lsb = tokens.next().ok_or_else(|| self.not_ready())?;
        let msb = tokens.next().ok_or_else(|| self.not_ready())?;

        let word = u32::from_str_radix(&format!("{msb}{lsb}"), 16)
            .map_err(|_| self.not_ready())?;

        if word >> 15 == 0 {
            Ok(word as i32)
        } else {
            // subtract 2^16 to recover the negative value
            Ok(word as i32 - (1 << 16))
        }
    }

    /// The precomputed signed millidegree value from the `t=` field.
    pub fn millidegrees(&self) -> W1Result<i64> {
        let (_, value) = self
            .data_line
            .rsplit_once('=')
            .ok_or_else(|| self.not_ready())?;
        value.trim().parse::<i64>().map_err(|_| self.not_ready())
    }

    /// The sampling resolution encoded in the configuration register.
    ///
    /// Byte 5 of the snapshot is the configuration register; bits 5-6 hold
    /// the resolution with 9 bits as the minimum. Uniform across families.
    pub fn resolution(&self) -> W1Result<u8> {
        let config = self
            .data_line
            .split_whitespace()
            .nth(4)
            .ok_or_else(|| self.not_ready())?;
        let config = u8::from_str_radix(config, 16).map_err(|_| self.not_ready())?;
        Ok((config >> 5) + 9)
    }

    fn not_ready(&self) -> W1Error {
        W1Error::SensorNotReady {
            id: self.id.clone(),
        }
    }
}

/// A handle to one physical w1 temperature sensor.
#[derive(Debug, Clone)]
pub struct ThermSensor {
    family: SensorFamily,
    id: String,
    device_path: PathBuf,
    offset_celsius: f64,
    calibration: Option<CalibrationData>,
}

impl ThermSensor {
    /// Returns all available sensors, in filesystem enumeration order.
    ///
    /// The order is not guaranteed stable across platforms; callers must not
    /// depend on it beyond "first found". Entries whose family byte is
    /// unknown are silently excluded, and an empty result is a legitimate
    /// "nothing connected", not an error. If `families` is given, only
    /// devices with a matching family code are returned.
    pub fn available_sensors(
        settings: &Settings,
        families: Option<&[SensorFamily]>,
    ) -> W1Result<Vec<ThermSensor>> {
        kernel::ensure_interface(settings)?;

        let mut sensors = Vec::new();
        for entry in fs::read_dir(&settings.base_directory)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some((family, id)) = parse_device_name(name) else {
                continue;
            };
            if let Some(families) = families {
                if !families.iter().any(|wanted| wanted.code() == family.code()) {
                    continue;
                }
            }
            sensors.push(Self::from_parts(settings, family, id.to_string()));
        }
        Ok(sensors)
    }

    /// Takes the first sensor of any family.
    ///
    /// Hardware enumeration may lag kernel module load, so an empty scan is
    /// retried across the settings' bounded retry window before giving up
    /// with [`W1Error::NoSensorFound`].
    pub fn first(settings: &Settings) -> W1Result<Self> {
        for attempt in 1..=settings.retry.attempts {
            let sensors = Self::available_sensors(settings, None)?;
            if let Some(sensor) = sensors.into_iter().next() {
                return Ok(sensor);
            }
            debug!(attempt, "no sensor enumerated yet");
            thread::sleep(settings.retry.delay);
        }
        Err(W1Error::NoSensorFound {
            family: None,
            id: None,
        })
    }

    /// Takes the first discovered sensor of the given family.
    ///
    /// No retry here: the readiness protocol has already proven the
    /// interface is up, so an empty scan means no such device is connected.
    pub fn by_family(settings: &Settings, family: SensorFamily) -> W1Result<Self> {
        let found = Self::available_sensors(settings, Some(&[family]))?
            .into_iter()
            .next()
            .ok_or(W1Error::NoSensorFound {
                family: Some(family),
                id: None,
            })?;
        // keep the family the caller asked for; DS1825 and MAX31850K share
        // a family code and discovery reports the canonical one
        Ok(Self::from_parts(settings, family, found.id))
    }

    /// Finds the sensor with the given hardware id, whatever its family.
    pub fn by_id(settings: &Settings, id: &str) -> W1Result<Self> {
        Self::available_sensors(settings, None)?
            .into_iter()
            .find(|sensor| sensor.id == id)
            .ok_or_else(|| W1Error::NoSensorFound {
                family: None,
                id: Some(id.to_string()),
            })
    }

    /// Constructs a handle for a known family and hardware id.
    ///
    /// Built without scanning; existence is checked afterwards by probing
    /// the computed device path. A handle obtained once remains valid until
    /// a read proves otherwise.
    pub fn new(settings: &Settings, family: SensorFamily, id: &str) -> W1Result<Self> {
        kernel::ensure_interface(settings)?;
        let sensor = Self::from_parts(settings, family, id.to_string());
        if !sensor.exists() {
            return Err(W1Error::NoSensorFound {
                family: Some(family),
                id: Some(id.to_string()),
            });
        }
        Ok(sensor)
    }

    fn from_parts(settings: &Settings, family: SensorFamily, id: String) -> Self {
        let device_path = settings
            .base_directory
            .join(format!("{}{}", family.device_prefix(), id))
            .join(SLAVE_FILE);
        Self {
            family,
            id,
            device_path,
            offset_celsius: 0.0,
            calibration: None,
        }
    }

    /// The sensor's hardware family.
    pub fn family(&self) -> SensorFamily {
        self.family
    }

    /// The 12-hex-character hardware id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable family name.
    pub fn name(&self) -> &'static str {
        self.family.name()
    }

    /// Path to the device's data file.
    pub fn device_path(&self) -> &Path {
        &self.device_path
    }

    /// Whether the backing device path currently exists.
    pub fn exists(&self) -> bool {
        self.device_path.exists()
    }

    /// Sets a tuning offset to be applied to each reading, given in `unit`.
    ///
    /// The offset is a pure delta: converting it to the internally stored
    /// Celsius value subtracts out the unit's own additive bias (such as
    /// Fahrenheit's +32), so an offset of 2 °F shifts readings by exactly
    /// 2 °F, not by the absolute temperature 2 °F corresponds to.
    pub fn set_offset(&mut self, offset: f64, unit: Unit) -> W1Result<()> {
        let to_celsius = units::conversion(unit, Unit::Celsius)?;
        self.offset_celsius = to_celsius(offset) - to_celsius(0.0);
        Ok(())
    }

    /// Returns the stored offset expressed in `unit`, 0.0 if none was set.
    pub fn offset(&self, unit: Unit) -> W1Result<f64> {
        let from_celsius = units::conversion(Unit::Celsius, unit)?;
        Ok(from_celsius(self.offset_celsius) - from_celsius(0.0))
    }

    /// Builder-style variant of [`ThermSensor::set_offset`].
    pub fn with_offset(mut self, offset: f64, unit: Unit) -> W1Result<Self> {
        self.set_offset(offset, unit)?;
        Ok(self)
    }

    /// Attaches two-point calibration data applied to every reading.
    pub fn set_calibration(&mut self, calibration: CalibrationData) {
        self.calibration = Some(calibration);
    }

    /// Removes any attached calibration data.
    pub fn clear_calibration(&mut self) {
        self.calibration = None;
    }

    /// Builder-style variant of [`ThermSensor::set_calibration`].
    pub fn with_calibration(mut self, calibration: CalibrationData) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Reads and parses one snapshot from the device's data file.
    ///
    /// A file that can no longer be opened means the device was disconnected
    /// between construction and this read, reported as
    /// [`W1Error::NoSensorFound`] rather than as an I/O error.
    pub fn read_raw(&self) -> W1Result<RawReading> {
        let contents = fs::read_to_string(&self.device_path).map_err(|_| self.vanished())?;
        RawReading::parse(&self.id, &contents)
    }

    /// Evaluates a snapshot to a temperature in the requested unit.
    ///
    /// Decode → calibration correction → offset → unit conversion. Shared
    /// by the sync and async read paths; pure computation.
    pub fn temperature_from_reading(&self, reading: &RawReading, unit: Unit) -> W1Result<f64> {
        let raw = reading.celsius(self.family)?;
        let calibrated = match &self.calibration {
            Some(calibration) => calibration.correct(raw),
            None => raw,
        };
        units::convert(calibrated + self.offset_celsius, Unit::Celsius, unit)
    }

    /// Reads the current temperature in the given unit.
    pub fn temperature(&self, unit: Unit) -> W1Result<f64> {
        let reading = self.read_raw()?;
        self.temperature_from_reading(&reading, unit)
    }

    /// Reads the temperature once and returns it in each of the given units,
    /// in matching order.
    pub fn temperatures(&self, units_wanted: &[Unit]) -> W1Result<Vec<f64>> {
        let reading = self.read_raw()?;
        units_wanted
            .iter()
            .map(|&unit| self.temperature_from_reading(&reading, unit))
            .collect()
    }

    /// Reads the sampling resolution (9-12 bits) from the configuration
    /// register.
    pub fn resolution(&self) -> W1Result<u8> {
        self.read_raw()?.resolution()
    }

    /// Sets the sampling resolution for the next conversions.
    ///
    /// Without `persist` the value only lives in the volatile SRAM and is
    /// lost on power-cycle. With `persist` a second write commits it to the
    /// EEPROM; the EEPROM endures a limited number of writes (>50k), so
    /// persisting on every reading cycle should be avoided. Changing the
    /// resolution requires write access to the device path, typically root.
    pub fn set_resolution(&self, resolution: u8, persist: bool) -> W1Result<()> {
        if !(9..=12).contains(&resolution) {
            return Err(W1Error::InvalidResolution { resolution });
        }

        info!(sensor = %self.id, resolution, "changing sensor resolution");
        let status = Command::new("sh")
            .arg("-c")
            .arg(format!(
                "echo {} > {}",
                resolution,
                self.device_path.display()
            ))
            .status()
            .map_err(|_| W1Error::SetResolutionFailed { resolution })?;
        if !status.success() {
            return Err(W1Error::SetResolutionFailed { resolution });
        }

        if persist {
            debug!(sensor = %self.id, "persisting resolution to EEPROM");
            let status = Command::new("sh")
                .arg("-c")
                .arg(format!("echo 0 > {}", self.device_path.display()))
                .status()
                .map_err(|_| W1Error::PersistResolutionFailed)?;
            if !status.success() {
                return Err(W1Error::PersistResolutionFailed);
            }
        }

        Ok(())
    }

    fn vanished(&self) -> W1Error {
        W1Error::NoSensorFound {
            family: Some(self.family),
            id: Some(self.id.clone()),
        }
    }
}

impl fmt::Display for ThermSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ThermSensor(name='{}', family=0x{:02x}, id='{}')",
            self.name(),
            self.family.code(),
            self.id
        )
    }
}

/// Splits a directory entry name into family and hardware id.
///
/// Entries look like `28-0316a4ffb1ff`; anything else (bus masters, unknown
/// family bytes, malformed ids) is excluded from discovery.
fn parse_device_name(name: &str) -> Option<(SensorFamily, &str)> {
    let (prefix, id) = name.split_once('-')?;
    if prefix.len() != 2 {
        return None;
    }
    let code = u8::from_str_radix(prefix, 16).ok()?;
    let family = SensorFamily::from_code(code)?;
    if id.len() != 12 || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some((family, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENSOR_ID: &str = "0316a4ffb1ff";

    /// Sample snapshot in the same shape the kernel driver produces.
    fn w1_file(lsb: u8, msb: u8, config: u8, ready: &str, millidegrees: i64) -> String {
        format!(
            "{lsb:02x} {msb:02x} 4b 46 {config:02x} ff 02 10 56 : crc=56 {ready}\n\
             {lsb:02x} {msb:02x} 4b 46 {config:02x} ff 02 10 56 t={millidegrees}\n"
        )
    }

    fn reading(lsb: u8, msb: u8, config: u8, millidegrees: i64) -> RawReading {
        RawReading::parse(SENSOR_ID, &w1_file(lsb, msb, config, "YES", millidegrees)).unwrap()
    }

    fn dummy_sensor(family: SensorFamily) -> ThermSensor {
        let settings = Settings::default().with_base_directory("/nonexistent/devices");
        ThermSensor::from_parts(&settings, family, SENSOR_ID.to_string())
    }

    #[test]
    fn test_positive_twelve_bit_decode() {
        // 0x0140 = 320 counts -> 20.0 degrees
        let value = reading(0x40, 0x01, 0x7F, 20000)
            .celsius(SensorFamily::Ds18b20)
            .unwrap();
        assert_eq!(value, 20.0);
    }

    #[test]
    fn test_negative_twelve_bit_decode() {
        // 0xFFF8 is two's complement for -8 counts -> -0.5 degrees
        let value = reading(0xF8, 0xFF, 0x7F, -500)
            .celsius(SensorFamily::Ds18b20)
            .unwrap();
        assert_eq!(value, -0.5);
    }

    #[test]
    fn test_reset_sentinel_raises_instead_of_returning() {
        // 85.0 degrees = 1360 counts = 0x0550
        let result = reading(0x50, 0x05, 0x7F, 85000).celsius(SensorFamily::Ds18b20);
        assert!(matches!(
            result,
            Err(W1Error::ResetValue { id }) if id == SENSOR_ID
        ));
    }

    #[test]
    fn test_near_reset_values_pass() {
        // one count below the sentinel: 1359 / 16 = 84.9375
        let value = reading(0x4F, 0x05, 0x7F, 84937)
            .celsius(SensorFamily::Ds18b20)
            .unwrap();
        assert_eq!(value, 84.9375);
    }

    #[test]
    fn test_millidegree_decode_skips_sentinel_check() {
        let value = reading(0x50, 0x05, 0x7F, 85000)
            .celsius(SensorFamily::Ds18s20)
            .unwrap();
        assert_eq!(value, 85.0);
    }

    #[test]
    fn test_millidegree_decode() {
        let value = reading(0x00, 0x00, 0x7F, 25123)
            .celsius(SensorFamily::Ds18s20)
            .unwrap();
        assert_eq!(value, 25.123);
        let value = reading(0x00, 0x00, 0x7F, -1250)
            .celsius(SensorFamily::Ds18s20)
            .unwrap();
        assert_eq!(value, -1.25);
    }

    #[test]
    fn test_not_ready_marker_rejected() {
        let result = RawReading::parse(SENSOR_ID, &w1_file(0x40, 0x01, 0x7F, "NO", 20000));
        assert!(matches!(
            result,
            Err(W1Error::SensorNotReady { id }) if id == SENSOR_ID
        ));
    }

    #[test]
    fn test_all_zero_bytes_with_yes_marker_rejected() {
        let contents = "00 00 00 00 00 00 00 00 00 : crc=00 YES\n\
                        00 00 00 00 00 00 00 00 00 t=0\n";
        let result = RawReading::parse(SENSOR_ID, contents);
        assert!(matches!(result, Err(W1Error::SensorNotReady { .. })));
    }

    #[test]
    fn test_garbage_snapshot_is_not_ready() {
        let reading = RawReading::parse(SENSOR_ID, "zz zz : crc=00 YES\nzz zz\n").unwrap();
        assert!(matches!(
            reading.celsius(SensorFamily::Ds18b20),
            Err(W1Error::SensorNotReady { .. })
        ));
        assert!(matches!(
            reading.resolution(),
            Err(W1Error::SensorNotReady { .. })
        ));
    }

    #[test]
    fn test_resolution_decode_across_config_values() {
        for (config, resolution) in [(0x1Fu8, 9u8), (0x3F, 10), (0x5F, 11), (0x7F, 12)] {
            assert_eq!(
                reading(0x40, 0x01, config, 20000).resolution().unwrap(),
                resolution
            );
        }
    }

    #[test]
    fn test_out_of_range_resolutions_rejected_without_hardware() {
        // the device path does not exist; an attempted write would not fail
        // with InvalidResolution, so this proves the precondition fires first
        let sensor = dummy_sensor(SensorFamily::Ds18b20);
        for resolution in [8u8, 13] {
            assert!(matches!(
                sensor.set_resolution(resolution, false),
                Err(W1Error::InvalidResolution { resolution: r }) if r == resolution
            ));
        }
    }

    #[test]
    fn test_offset_round_trips_in_its_own_unit() {
        let mut sensor = dummy_sensor(SensorFamily::Ds18b20);
        for unit in Unit::ALL {
            sensor.set_offset(2.0, unit).unwrap();
            let back = sensor.offset(unit).unwrap();
            assert!(
                (back - 2.0).abs() < 1e-9,
                "offset in {unit} round-tripped to {back}"
            );
        }
    }

    #[test]
    fn test_offset_is_a_pure_delta_not_an_absolute_shift() {
        let mut sensor = dummy_sensor(SensorFamily::Ds18b20);
        sensor.set_offset(2.0, Unit::Fahrenheit).unwrap();
        // 2 F of delta is 10/9 degrees, NOT the -16.67 C that the absolute
        // temperature 2 F converts to
        let celsius_offset = sensor.offset(Unit::Celsius).unwrap();
        assert!((celsius_offset - 2.0 * 5.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_from_reading_applies_offset_and_unit() {
        let mut sensor = dummy_sensor(SensorFamily::Ds18b20);
        sensor.set_offset(1.5, Unit::Celsius).unwrap();
        let snapshot = reading(0x40, 0x01, 0x7F, 20000);
        assert_eq!(
            sensor
                .temperature_from_reading(&snapshot, Unit::Celsius)
                .unwrap(),
            21.5
        );
        assert_eq!(
            sensor
                .temperature_from_reading(&snapshot, Unit::Fahrenheit)
                .unwrap(),
            21.5 * 1.8 + 32.0
        );
    }

    #[test]
    fn test_temperature_from_reading_applies_calibration_before_offset() {
        let calibration = crate::calibration::CalibrationData::new(99.0, -1.0, 100.0, 0.0).unwrap();
        let mut sensor = dummy_sensor(SensorFamily::Ds18b20).with_calibration(calibration);
        sensor.set_offset(0.5, Unit::Celsius).unwrap();
        let snapshot = reading(0x40, 0x01, 0x7F, 20000);
        // raw 20.0 -> calibrated 21.0 -> offset 21.5
        assert_eq!(
            sensor
                .temperature_from_reading(&snapshot, Unit::Celsius)
                .unwrap(),
            21.5
        );
    }

    #[test]
    fn test_parse_device_name() {
        assert_eq!(
            parse_device_name("28-0316a4ffb1ff"),
            Some((SensorFamily::Ds18b20, "0316a4ffb1ff"))
        );
        assert_eq!(
            parse_device_name("3b-0316a4ffb1ff"),
            Some((SensorFamily::Ds1825, "0316a4ffb1ff"))
        );
        assert_eq!(parse_device_name("w1_bus_master1"), None);
        assert_eq!(parse_device_name("99-0316a4ffb1ff"), None);
        assert_eq!(parse_device_name("28-short"), None);
        assert_eq!(parse_device_name("28-0316a4ffb1zz"), None);
    }

    #[test]
    fn test_display() {
        let sensor = dummy_sensor(SensorFamily::Ds18b20);
        assert_eq!(
            sensor.to_string(),
            "ThermSensor(name='DS18B20', family=0x28, id='0316a4ffb1ff')"
        );
    }
}
