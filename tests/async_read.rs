//! Async variant parity with the synchronous read paths.

mod common;

use common::{add_sensor, ready_snapshot, snapshot, test_settings};
use w1therm::{AsyncThermSensor, SensorFamily, Unit, W1Error};

const SENSOR_ID: &str = "0316a4ffb1ff";

#[tokio::test]
async fn test_async_temperature_matches_sync_semantics() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir);
    add_sensor(
        dir.path(),
        SensorFamily::Ds18b20,
        SENSOR_ID,
        &ready_snapshot(20.0),
    );

    let sensor = AsyncThermSensor::new(&settings, SensorFamily::Ds18b20, SENSOR_ID).unwrap();
    assert_eq!(sensor.temperature(Unit::Celsius).await.unwrap(), 20.0);
    assert_eq!(sensor.temperature(Unit::Fahrenheit).await.unwrap(), 68.0);
}

#[tokio::test]
async fn test_async_temperatures_match_unit_order() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir);
    add_sensor(
        dir.path(),
        SensorFamily::Ds18b20,
        SENSOR_ID,
        &ready_snapshot(20.0),
    );

    let sensor = AsyncThermSensor::first(&settings).unwrap();
    let values = sensor
        .temperatures(&[Unit::Kelvin, Unit::Celsius])
        .await
        .unwrap();
    assert_eq!(values, vec![293.15, 20.0]);
}

#[tokio::test]
async fn test_async_resolution_read() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir);
    add_sensor(
        dir.path(),
        SensorFamily::Ds18b20,
        SENSOR_ID,
        &snapshot(0x40, 0x01, 0x3F, "YES", 20000),
    );

    let sensor = AsyncThermSensor::by_id(&settings, SENSOR_ID).unwrap();
    assert_eq!(sensor.resolution().await.unwrap(), 10);
}

#[tokio::test]
async fn test_async_not_ready_raises() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir);
    add_sensor(
        dir.path(),
        SensorFamily::Ds18b20,
        SENSOR_ID,
        &snapshot(0x40, 0x01, 0x7F, "NO", 20000),
    );

    let sensor = AsyncThermSensor::by_family(&settings, SensorFamily::Ds18b20).unwrap();
    assert!(matches!(
        sensor.temperature(Unit::Celsius).await,
        Err(W1Error::SensorNotReady { .. })
    ));
}

#[tokio::test]
async fn test_async_offset_applies_through_inner_handle() {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir);
    add_sensor(
        dir.path(),
        SensorFamily::Ds18b20,
        SENSOR_ID,
        &ready_snapshot(20.0),
    );

    let mut sensor = AsyncThermSensor::first(&settings).unwrap();
    sensor.inner_mut().set_offset(2.0, Unit::Celsius).unwrap();
    assert_eq!(sensor.temperature(Unit::Celsius).await.unwrap(), 22.0);
}
