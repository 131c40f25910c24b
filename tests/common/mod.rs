//! Shared fixtures: a fake w1 sysfs device tree in a temp directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use w1therm::{RetryPolicy, SensorFamily, Settings};

/// Sample snapshot contents in the shape the kernel driver produces.
pub fn snapshot(lsb: u8, msb: u8, config: u8, ready: &str, millidegrees: i64) -> String {
    format!(
        "{lsb:02x} {msb:02x} 4b 46 {config:02x} ff 02 10 56 : crc=56 {ready}\n\
         {lsb:02x} {msb:02x} 4b 46 {config:02x} ff 02 10 56 t={millidegrees}\n"
    )
}

/// Snapshot of a partially disconnected device reporting only zero bytes.
pub fn zero_snapshot() -> String {
    "00 00 00 00 00 00 00 00 00 : crc=00 YES\n\
     00 00 00 00 00 00 00 00 00 t=0\n"
        .to_string()
}

/// Ready snapshot for a given Celsius value with 12-bit resolution config.
pub fn ready_snapshot(celsius: f64) -> String {
    let count = (celsius * 16.0).round() as i16;
    let word = count as u16;
    snapshot(
        (word & 0xFF) as u8,
        (word >> 8) as u8,
        0x7F,
        "YES",
        (celsius * 1000.0).round() as i64,
    )
}

/// Settings pointing at the fake tree, with module load suppressed and a
/// zero-delay retry policy.
pub fn test_settings(dir: &TempDir) -> Settings {
    Settings::default()
        .with_base_directory(dir.path())
        .without_kernel_module()
        .with_retry(RetryPolicy::no_delay())
}

/// Creates a device entry with the given snapshot contents.
pub fn add_sensor(base: &Path, family: SensorFamily, id: &str, contents: &str) {
    let device_dir = base.join(format!("{}{}", family.device_prefix(), id));
    fs::create_dir_all(&device_dir).unwrap();
    fs::write(device_dir.join("w1_slave"), contents).unwrap();
}

/// Creates a non-sensor directory entry, like the bus master device.
pub fn add_noise_entry(base: &Path, name: &str) {
    fs::create_dir_all(base.join(name)).unwrap();
}
