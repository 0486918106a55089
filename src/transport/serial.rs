use std::io;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{ReaderError, Result};

use super::Transport;

/// GPS receivers talk 8N1.
const DATA_BITS: serialport::DataBits = serialport::DataBits::Eight;
const STOP_BITS: serialport::StopBits = serialport::StopBits::One;
const PARITY: serialport::Parity = serialport::Parity::None;

/// Baud rates commonly used by NMEA receivers (the NMEA-0183 default first).
pub const BAUD_RATES: &[u32] = &[4800, 9600, 19200, 38400, 57600, 115200];

/// An NMEA transport backed by a native serial port.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    pub fn new(port: Box<dyn serialport::SerialPort>) -> Self {
        Self { port }
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut self.port, buf)
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.port.set_timeout(timeout).map_err(io::Error::other)
    }
}

/// List the names of all serial ports on the system.
pub fn available_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(ReaderError::Serial)?;
    for port in &ports {
        debug!("found port: {} ({:?})", port.port_name, port.port_type);
    }
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// Pick the first available serial port.
pub fn first_port() -> Result<String> {
    match available_ports()?.into_iter().next() {
        Some(name) => {
            info!("using first available port {name}");
            Ok(name)
        }
        None => {
            warn!("no serial ports found");
            Err(ReaderError::PortNotFound)
        }
    }
}

/// Open a serial port (8N1) at the given baud rate.
pub fn open_port(port_name: &str, baud_rate: u32, timeout: Duration) -> Result<SerialTransport> {
    let port = serialport::new(port_name, baud_rate)
        .data_bits(DATA_BITS)
        .stop_bits(STOP_BITS)
        .parity(PARITY)
        .timeout(timeout)
        .open()
        .map_err(ReaderError::Serial)?;

    info!("opened {} at {} baud", port_name, baud_rate);
    Ok(SerialTransport::new(port))
}
