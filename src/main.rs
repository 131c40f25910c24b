//! CLI entry point for w1therm.
//!
//! Provides a command-line interface over the sensor library:
//! - `ls` lists the connected sensors
//! - `all` reads the temperature of every connected sensor
//! - `get` reads one sensor, selected by id, family or "first found"
//! - `resolution` changes a sensor's sampling resolution
//!
//! All commands honor the `W1THERM_BASE_DIRECTORY` and
//! `W1THERM_NO_KERNEL_MODULE` environment variables, and log through
//! `tracing` filtered by `RUST_LOG`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use w1therm::{SensorFamily, Settings, ThermSensor, Unit};

#[derive(Parser)]
#[command(name = "w1therm")]
#[command(version)]
#[command(about = "Get the temperature from your connected w1 therm sensors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all available sensors
    Ls {
        /// Show only sensors of this family (repeatable)
        #[arg(short = 't', long = "type", value_parser = parse_family)]
        families: Vec<SensorFamily>,

        /// Also display the resolution of each sensor
        #[arg(short, long)]
        resolution: bool,

        /// Output the result in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Read the temperature of all available sensors
    All {
        /// Read only sensors of this family (repeatable)
        #[arg(short = 't', long = "type", value_parser = parse_family)]
        families: Vec<SensorFamily>,

        /// Unit to report temperatures in
        #[arg(short, long, default_value = "celsius", value_parser = parse_unit)]
        unit: Unit,

        /// Output the result in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Read the temperature of a single sensor
    Get {
        /// Hardware id of the sensor
        #[arg(short, long)]
        id: Option<String>,

        /// Family of the sensor
        #[arg(short = 't', long = "type", value_parser = parse_family)]
        family: Option<SensorFamily>,

        /// Unit to report the temperature in
        #[arg(short, long, default_value = "celsius", value_parser = parse_unit)]
        unit: Unit,

        /// Tuning offset to apply to the reading, in `--offset-unit`
        #[arg(short, long, default_value_t = 0.0)]
        offset: f64,

        /// Unit the offset is given in
        #[arg(long, default_value = "celsius", value_parser = parse_unit)]
        offset_unit: Unit,

        /// Output the result in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Change the sampling resolution of a sensor
    Resolution {
        /// Resolution in bits (9-12)
        bits: u8,

        /// Hardware id of the sensor; first found if omitted
        #[arg(short, long)]
        id: Option<String>,

        /// Persist the resolution to the sensor EEPROM
        #[arg(short, long)]
        persist: bool,
    },
}

#[derive(Serialize)]
struct SensorRow {
    id: usize,
    hwid: String,
    family: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<u8>,
}

#[derive(Serialize)]
struct TemperatureRow {
    id: usize,
    hwid: String,
    family: &'static str,
    temperature: f64,
    unit: &'static str,
}

fn parse_family(name: &str) -> Result<SensorFamily, String> {
    SensorFamily::from_name(name).ok_or_else(|| {
        let known = SensorFamily::ALL.map(SensorFamily::name).join(", ");
        format!("unknown sensor family '{name}'; use one of: {known}")
    })
}

fn parse_unit(name: &str) -> Result<Unit, String> {
    name.parse::<Unit>().map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Ls {
            families,
            resolution,
            json,
        } => ls(&settings, &families, resolution, json),
        Commands::All {
            families,
            unit,
            json,
        } => all(&settings, &families, unit, json),
        Commands::Get {
            id,
            family,
            unit,
            offset,
            offset_unit,
            json,
        } => get(&settings, id, family, unit, offset, offset_unit, json),
        Commands::Resolution { bits, id, persist } => set_resolution(&settings, bits, id, persist),
    }
}

fn families_filter(families: &[SensorFamily]) -> Option<&[SensorFamily]> {
    if families.is_empty() {
        None
    } else {
        Some(families)
    }
}

fn ls(settings: &Settings, families: &[SensorFamily], resolution: bool, json: bool) -> Result<()> {
    let sensors = ThermSensor::available_sensors(settings, families_filter(families))?;

    let mut rows = Vec::with_capacity(sensors.len());
    for (index, sensor) in sensors.iter().enumerate() {
        rows.push(SensorRow {
            id: index + 1,
            hwid: sensor.id().to_string(),
            family: sensor.name(),
            resolution: if resolution {
                Some(sensor.resolution()?)
            } else {
                None
            },
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Found {} sensors:", rows.len());
    for row in rows {
        match row.resolution {
            Some(resolution) => println!(
                "  {}. HWID: {} Type: {} Resolution: {} bits",
                row.id, row.hwid, row.family, resolution
            ),
            None => println!("  {}. HWID: {} Type: {}", row.id, row.hwid, row.family),
        }
    }
    Ok(())
}

fn all(settings: &Settings, families: &[SensorFamily], unit: Unit, json: bool) -> Result<()> {
    let sensors = ThermSensor::available_sensors(settings, families_filter(families))?;

    let mut rows = Vec::with_capacity(sensors.len());
    for (index, sensor) in sensors.iter().enumerate() {
        rows.push(TemperatureRow {
            id: index + 1,
            hwid: sensor.id().to_string(),
            family: sensor.name(),
            temperature: sensor.temperature(unit)?,
            unit: unit.label(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Got temperatures of {} sensors:", rows.len());
    for row in rows {
        println!(
            "  Sensor {} ({}): temperature {:.2} {}",
            row.id, row.hwid, row.temperature, row.unit
        );
    }
    Ok(())
}

fn get(
    settings: &Settings,
    id: Option<String>,
    family: Option<SensorFamily>,
    unit: Unit,
    offset: f64,
    offset_unit: Unit,
    json: bool,
) -> Result<()> {
    let mut sensor = select_sensor(settings, id, family)?;
    sensor.set_offset(offset, offset_unit)?;

    let row = TemperatureRow {
        id: 1,
        hwid: sensor.id().to_string(),
        family: sensor.name(),
        temperature: sensor.temperature(unit)?,
        unit: unit.label(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&row)?);
    } else {
        println!(
            "Sensor {} measured temperature {:.2} {}",
            row.hwid, row.temperature, row.unit
        );
    }
    Ok(())
}

fn set_resolution(settings: &Settings, bits: u8, id: Option<String>, persist: bool) -> Result<()> {
    let sensor = select_sensor(settings, id, None)?;
    sensor.set_resolution(bits, persist)?;
    println!("Set resolution of sensor {} to {} bits", sensor.id(), bits);
    Ok(())
}

/// Resolves the sensor selection priority: id beats family beats "first".
fn select_sensor(
    settings: &Settings,
    id: Option<String>,
    family: Option<SensorFamily>,
) -> Result<ThermSensor> {
    let sensor = match (id, family) {
        (Some(id), Some(family)) => ThermSensor::new(settings, family, &id)?,
        (Some(id), None) => ThermSensor::by_id(settings, &id)?,
        (None, Some(family)) => ThermSensor::by_family(settings, family)?,
        (None, None) => ThermSensor::first(settings)?,
    };
    Ok(sensor)
}
