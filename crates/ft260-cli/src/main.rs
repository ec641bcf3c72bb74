//! ft260ctl - command-line control for the FTDI FT260 USB HID to I2C
//! bridge: device discovery, chip queries, and one-shot I2C transactions.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ft260_driver::{Ft260, Ft260I2cBus, I2cBus};
use ft260_hid_common::{HidapiTransport, enumerate_devices};
use hid_ft260_protocol::{PRODUCT_ID, VENDOR_ID};
use hidapi::HidApi;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ft260ctl")]
#[command(about = "FTDI FT260 USB HID to I2C bridge control tool")]
#[command(version)]
struct Cli {
    /// Which attached FT260 to use, in enumeration order
    #[arg(long, global = true, env = "DEVICE_INDEX", default_value_t = 0)]
    device_index: usize,

    /// Verbose logging (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List attached FT260 devices
    List,
    /// Print the chip silicon revision as JSON
    ChipVersion,
    /// Print the decoded system status as JSON
    SystemStatus,
    /// Read bytes from an I2C peripheral
    I2cRead {
        /// 7-bit slave address (hex, e.g. 0x50)
        #[arg(value_parser = parse_hex_u8)]
        address: u8,
        /// Number of bytes to read
        length: usize,
        /// Register address to write before reading (combined transaction)
        #[arg(long, value_parser = parse_hex_u8)]
        reg: Option<u8>,
        /// Set the bus clock (kHz) before the transaction
        #[arg(long)]
        speed_khz: Option<u16>,
    },
    /// Write bytes to an I2C peripheral
    I2cWrite {
        /// 7-bit slave address (hex, e.g. 0x50)
        #[arg(value_parser = parse_hex_u8)]
        address: u8,
        /// Data bytes (hex, e.g. 0x10 0xFF)
        #[arg(value_parser = parse_hex_u8, num_args = 1..)]
        data: Vec<u8>,
        /// Set the bus clock (kHz) before the transaction
        #[arg(long)]
        speed_khz: Option<u16>,
    },
}

fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let trimmed = s.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(trimmed, 16).map_err(|e| format!("invalid hex byte '{s}': {e}"))
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn open_driver(api: &HidApi, device_index: usize) -> Result<Ft260> {
    let devices = enumerate_devices(api, VENDOR_ID, PRODUCT_ID);
    if devices.is_empty() {
        bail!("no FT260 devices attached");
    }
    let info = devices.get(device_index).with_context(|| {
        format!(
            "device index {device_index} out of range ({} attached)",
            devices.len()
        )
    })?;
    let transport = HidapiTransport::open(api, info)
        .with_context(|| format!("failed to open {}", info.path))?;
    Ok(Ft260::new(Box::new(transport)))
}

fn list_devices(api: &HidApi) -> Result<()> {
    let devices = enumerate_devices(api, VENDOR_ID, PRODUCT_ID);
    if devices.is_empty() {
        println!("No FT260 devices found.");
        return Ok(());
    }
    println!("{:<6} {:<20} {:<16} Path", "Index", "Product", "Serial");
    println!("{}", "-".repeat(72));
    for (index, dev) in devices.iter().enumerate() {
        println!(
            "{:<6} {:<20} {:<16} {}",
            index,
            dev.display_name(),
            dev.serial_number.as_deref().unwrap_or("-"),
            dev.path,
        );
    }
    Ok(())
}

fn open_bus(api: &HidApi, device_index: usize, speed_khz: Option<u16>) -> Result<Box<dyn I2cBus>> {
    let driver = open_driver(api, device_index)?;
    let mut bus = Ft260I2cBus::new(format!("ft260-{device_index}"), driver.into_shared());
    if let Some(khz) = speed_khz {
        bus.set_speed(u32::from(khz) * 1000)
            .context("failed to set bus speed")?;
    }
    Ok(Box::new(bus))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let api = HidApi::new().context("failed to initialize HID backend")?;

    match cli.command {
        Commands::List => list_devices(&api),
        Commands::ChipVersion => {
            let mut driver = open_driver(&api, cli.device_index)?;
            let version = driver.chip_version()?;
            println!("{}", serde_json::to_string_pretty(&version)?);
            Ok(())
        }
        Commands::SystemStatus => {
            let mut driver = open_driver(&api, cli.device_index)?;
            let status = driver.system_status()?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Commands::I2cRead {
            address,
            length,
            reg,
            speed_khz,
        } => {
            let mut bus = open_bus(&api, cli.device_index, speed_khz)?;
            let write: &[u8] = reg.as_slice();
            let mut read = vec![0u8; length];
            bus.tx(u16::from(address), write, &mut read)
                .with_context(|| format!("I2C read from {address:#04x} failed"))?;
            println!("{}", hex(&read));
            Ok(())
        }
        Commands::I2cWrite {
            address,
            data,
            speed_khz,
        } => {
            let mut bus = open_bus(&api, cli.device_index, speed_khz)?;
            bus.tx(u16::from(address), &data, &mut [])
                .with_context(|| format!("I2C write to {address:#04x} failed"))?;
            println!("wrote {} bytes to {address:#04x}", data.len());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u8() {
        assert_eq!(parse_hex_u8("0x50"), Ok(0x50));
        assert_eq!(parse_hex_u8("50"), Ok(0x50));
        assert_eq!(parse_hex_u8("0XfF"), Ok(0xFF));
        assert!(parse_hex_u8("0x100").is_err());
        assert!(parse_hex_u8("zz").is_err());
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(hex(&[0xAA, 0x01, 0x00]), "aa 01 00");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["ft260ctl", "chip-version"]).expect("parse");
        assert!(matches!(cli.command, Commands::ChipVersion));
        assert_eq!(cli.device_index, 0);

        let cli = Cli::try_parse_from([
            "ft260ctl",
            "--device-index",
            "1",
            "i2c-read",
            "0x50",
            "4",
            "--reg",
            "0x10",
        ])
        .expect("parse");
        assert_eq!(cli.device_index, 1);
        assert!(matches!(
            cli.command,
            Commands::I2cRead {
                address: 0x50,
                length: 4,
                reg: Some(0x10),
                speed_khz: None,
            }
        ));
    }
}
