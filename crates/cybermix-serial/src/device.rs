//! CyberMix board detection and serial I/O.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use tracing::{debug, trace};

use cybermix_core::transport::{self, DEFAULT_SIGNATURES};
use cybermix_core::{Connection, PortDescriptor, Transport, TransportError};

/// Default blocking read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Upper bound on a single read.
const MAX_READ: usize = 4096;

/// Finds and opens the board over a system serial port.
#[derive(Debug, Clone)]
pub struct SerialTransport {
    signatures: Vec<String>,
    read_timeout: Duration,
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURES.iter().map(ToString::to_string).collect(), DEFAULT_READ_TIMEOUT)
    }
}

impl SerialTransport {
    /// Create a transport matching ports whose description or name contains
    /// any of `signatures`.
    #[must_use]
    pub fn new(signatures: Vec<String>, read_timeout: Duration) -> Self {
        Self { signatures, read_timeout }
    }

    #[must_use]
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }

    /// All serial ports currently present, in OS enumeration order.
    #[must_use]
    pub fn list_ports() -> Vec<PortDescriptor> {
        match serialport::available_ports() {
            Ok(ports) => ports.into_iter().map(describe).collect(),
            Err(e) => {
                debug!(error = %e, "Failed to enumerate serial ports");
                Vec::new()
            }
        }
    }
}

impl Transport for SerialTransport {
    type Connection = SerialConnection;

    fn discover(&self) -> Option<PortDescriptor> {
        let ports = Self::list_ports();
        trace!(count = ports.len(), "Enumerated serial ports");
        transport::find_matching_port(ports, &self.signatures)
    }

    fn open(
        &self,
        port: &PortDescriptor,
        baud_rate: u32,
    ) -> Result<SerialConnection, TransportError> {
        let handle = serialport::new(&port.name, baud_rate)
            .timeout(self.read_timeout)
            .open()
            .map_err(|e| TransportError::Open { port: port.name.clone(), reason: e.to_string() })?;

        Ok(SerialConnection { name: port.name.clone(), port: handle })
    }
}

/// Build a descriptor from OS port info.
///
/// USB ports are described by their product string, falling back to the
/// manufacturer and then to the VID:PID pair. Other ports are described by
/// their name.
#[must_use]
pub fn describe(info: SerialPortInfo) -> PortDescriptor {
    let description = match info.port_type {
        SerialPortType::UsbPort(usb) => usb
            .product
            .or(usb.manufacturer)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid)),
        SerialPortType::PciPort | SerialPortType::BluetoothPort | SerialPortType::Unknown => {
            info.port_name.clone()
        }
    };

    PortDescriptor { name: info.port_name, description }
}

/// An open serial link to the board.
pub struct SerialConnection {
    name: String,
    port: Box<dyn SerialPort>,
}

impl Connection for SerialConnection {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn read_available(&mut self) -> Result<Vec<u8>, TransportError> {
        let pending = self.port.bytes_to_read().map_err(|e| TransportError::Read(e.to_string()))?;
        if pending == 0 {
            return Ok(Vec::new());
        }

        let len = usize::try_from(pending).unwrap_or(MAX_READ).min(MAX_READ);
        let mut buf = vec![0u8; len];
        match self.port.read(&mut buf) {
            Ok(0) => Err(TransportError::Disconnected),
            Ok(n) => {
                buf.truncate(n);
                trace!(port = %self.name, bytes = n, "Serial read");
                Ok(buf)
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(TransportError::Read(e.to_string())),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port
            .write_all(bytes)
            .and_then(|()| self.port.flush())
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    fn close(self) {
        debug!(port = %self.name, "Serial port released");
    }
}

#[cfg(test)]
mod tests {
    use serialport::UsbPortInfo;

    use super::*;

    fn usb(product: Option<&str>, manufacturer: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: "/dev/ttyACM0".into(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x2886,
                pid: 0x0042,
                serial_number: None,
                manufacturer: manufacturer.map(Into::into),
                product: product.map(Into::into),
            }),
        }
    }

    #[test]
    fn test_describe_usb_product() {
        let port = describe(usb(Some("XIAO RP2040"), Some("Seeed")));
        assert_eq!(port.name, "/dev/ttyACM0");
        assert_eq!(port.description, "XIAO RP2040");
    }

    #[test]
    fn test_describe_usb_fallbacks() {
        assert_eq!(describe(usb(None, Some("Seeed"))).description, "Seeed");
        assert_eq!(describe(usb(None, None)).description, "USB VID:PID=2886:0042");
    }

    #[test]
    fn test_describe_non_usb() {
        let info = SerialPortInfo { port_name: "/dev/ttyS0".into(), port_type: SerialPortType::Unknown };
        assert_eq!(describe(info).description, "/dev/ttyS0");
    }

    #[test]
    fn test_described_ports_match_signatures() {
        let ports = vec![
            describe(SerialPortInfo {
                port_name: "/dev/ttyS0".into(),
                port_type: SerialPortType::PciPort,
            }),
            describe(usb(Some("XIAO RP2040"), None)),
        ];
        let transport = SerialTransport::default();

        let found = transport::find_matching_port(ports, transport.signatures());
        assert_eq!(found.map(|p| p.name), Some("/dev/ttyACM0".to_string()));
    }

    #[test]
    fn test_open_missing_port_fails() {
        let transport = SerialTransport::default();
        let port = PortDescriptor {
            name: "/dev/cybermix-missing".into(),
            description: "XIAO".into(),
        };

        match transport.open(&port, 115_200) {
            Err(TransportError::Open { port, .. }) => assert_eq!(port, "/dev/cybermix-missing"),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("opened a port that does not exist"),
        }
    }
}
