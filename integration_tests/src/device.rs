//! Host serial port and delay for the radio controller client.

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use embedded_hal::delay::DelayNs;
use serialport::SerialPort as _;
use wavelink::serial::{SerialError, SerialPort};
use wavelink::transport::{TransportClient, TransportConfig};

/// Client talking to the radio controller on a host serial port.
pub type HostClient = TransportClient<HostPort, StdDelay>;

/// Find candidate controller ports (USB serial adapters and on-board UARTs).
pub fn find_controller_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|info| info.port_name)
        .filter(|name| name.contains("ttyUSB") || name.contains("ttyAMA") || name.contains("ttyACM"))
        .collect())
}

/// Resolve a port argument - returns the port path if not "auto", otherwise auto-detects.
pub fn resolve_port(port_arg: &str) -> Result<String> {
    if port_arg != "auto" {
        return Ok(port_arg.to_string());
    }
    match find_controller_ports()?.into_iter().next() {
        Some(port) => Ok(port),
        None => anyhow::bail!("No serial port found - ensure the radio controller is connected"),
    }
}

/// Open the controller and wrap it in a transport client.
pub fn open_client(port_name: &str, baud_rate: u32, config: TransportConfig) -> Result<HostClient> {
    let port = HostPort::open(port_name, baud_rate)?;
    Ok(TransportClient::new(port, StdDelay, config))
}

/// Radio controller on a host serial port.
///
/// The port is opened exclusively, so other processes see it as busy for
/// as long as this value lives.
pub struct HostPort {
    port: Box<dyn serialport::SerialPort>,
    held: bool,
    bytes_written: usize,
}

impl HostPort {
    /// Open the port with the controller's line settings (8N1).
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(Duration::from_millis(
                wavelink::config::serial::READ_TIMEOUT_MS,
            ))
            .open()
            .with_context(|| format!("Failed to open {}", port_name))?;

        log::info!("Radio controller is ready: {}", port_name);
        Ok(Self {
            port,
            held: false,
            bytes_written: 0,
        })
    }

    /// Total bytes written to the controller since the port was opened.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}

fn map_io_error(error: std::io::Error, fallback: SerialError) -> SerialError {
    match error.kind() {
        std::io::ErrorKind::TimedOut => SerialError::Timeout,
        std::io::ErrorKind::WouldBlock => SerialError::Busy,
        _ => {
            log::debug!("Serial I/O error: {}", error);
            fallback
        }
    }
}

impl SerialPort for HostPort {
    fn acquire(&mut self) -> Result<(), SerialError> {
        if self.held {
            return Err(SerialError::Busy);
        }
        self.held = true;
        Ok(())
    }

    fn release(&mut self) {
        self.held = false;
    }

    fn clear(&mut self) -> Result<(), SerialError> {
        self.port
            .clear(serialport::ClearBuffer::All)
            .map_err(|e| {
                log::debug!("Failed to clear buffers: {}", e);
                SerialError::ReadError
            })
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(map_io_error(e, SerialError::ReadError)),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, SerialError> {
        let n = self
            .port
            .write(data)
            .map_err(|e| map_io_error(e, SerialError::WriteError))?;
        self.bytes_written += n;
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.port
            .flush()
            .map_err(|e| map_io_error(e, SerialError::WriteError))
    }
}

/// Blocking delay backed by `thread::sleep`.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}
