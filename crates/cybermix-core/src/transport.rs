//! Transport capability: finding and talking to the control surface.

use crate::error::TransportError;

/// Serial port signatures of the stock CyberMix board.
pub const DEFAULT_SIGNATURES: &[&str] = &["XIAO", "USB Serial"];

/// A serial port as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Device path or name (e.g. `/dev/ttyACM0`, `COM3`)
    pub name: String,
    /// Human-readable description (USB product string when available)
    pub description: String,
}

/// Locates and opens the control surface.
pub trait Transport: Send {
    type Connection: Connection;

    /// Find the first port that looks like a CyberMix device.
    fn discover(&self) -> Option<PortDescriptor>;

    /// Open a discovered port.
    ///
    /// # Errors
    /// Returns an error if the port cannot be opened.
    fn open(
        &self,
        port: &PortDescriptor,
        baud_rate: u32,
    ) -> Result<Self::Connection, TransportError>;
}

/// An open link to the control surface. Exactly one owner at a time.
pub trait Connection: Send {
    /// Name of the underlying port.
    fn port_name(&self) -> &str;

    /// Return whatever bytes have arrived, possibly none. Never blocks for
    /// longer than the transport's read timeout.
    ///
    /// # Errors
    /// Returns an error if the link is gone.
    fn read_available(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Write a complete frame.
    ///
    /// # Errors
    /// Returns an error if the link is gone.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Release the port.
    fn close(self);
}

/// Pick the first port whose description or name contains a signature.
///
/// Ports are considered in the order given (the OS enumeration order); there
/// is no ranking between several matches.
pub fn find_matching_port<S: AsRef<str>>(
    ports: impl IntoIterator<Item = PortDescriptor>,
    signatures: &[S],
) -> Option<PortDescriptor> {
    ports.into_iter().find(|port| {
        signatures.iter().map(AsRef::as_ref).any(|sig| {
            !sig.is_empty() && (port.description.contains(sig) || port.name.contains(sig))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, description: &str) -> PortDescriptor {
        PortDescriptor { name: name.into(), description: description.into() }
    }

    #[test]
    fn test_first_match_wins() {
        let ports = vec![
            port("/dev/ttyS0", "n/a"),
            port("/dev/ttyACM0", "Seeed XIAO RP2040"),
            port("/dev/ttyUSB0", "USB Serial"),
        ];

        let found = find_matching_port(ports, DEFAULT_SIGNATURES).unwrap();
        assert_eq!(found.name, "/dev/ttyACM0");
    }

    #[test]
    fn test_no_match() {
        let ports = vec![port("/dev/ttyS0", "n/a"), port("COM1", "Communications Port")];
        assert!(find_matching_port(ports, DEFAULT_SIGNATURES).is_none());
    }

    #[test]
    fn test_custom_signature_matches_name() {
        let ports = vec![port("/dev/ttyACM3", "")];
        let found = find_matching_port(ports, &["ttyACM".to_string()]);
        assert_eq!(found.map(|p| p.name), Some("/dev/ttyACM3".into()));
    }

    #[test]
    fn test_empty_signature_never_matches() {
        let ports = vec![port("/dev/ttyS0", "anything")];
        assert!(find_matching_port(ports, &[""]).is_none());
    }
}
