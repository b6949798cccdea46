//! Scripted transport for engine tests.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::protocol::SCREEN_TAG;
use crate::transport::{Connection, PortDescriptor, Transport};

pub const FAKE_PORT: &str = "/dev/ttyACM0";

/// Shared state behind a [`FakeTransport`] and its connections.
#[derive(Default)]
pub struct Wire {
    pub present: bool,
    pub fail_open: bool,
    pub fail_writes: bool,
    pub discover_calls: usize,
    pub open_calls: usize,
    pub closed: usize,
    pub inbound: VecDeque<Result<Vec<u8>, TransportError>>,
    pub written: Vec<Vec<u8>>,
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    pub wire: Arc<Mutex<Wire>>,
}

impl FakeTransport {
    /// A transport whose device is plugged in.
    pub fn present() -> Self {
        let transport = Self::default();
        transport.wire.lock().present = true;
        transport
    }

    /// Queue bytes for the next read.
    pub fn feed(&self, bytes: &[u8]) {
        self.wire.lock().inbound.push_back(Ok(bytes.to_vec()));
    }

    /// Pull the device: the next read fails and discovery finds nothing.
    pub fn unplug(&self) {
        let mut wire = self.wire.lock();
        wire.present = false;
        wire.inbound.push_back(Err(TransportError::Disconnected));
    }

    /// Drain written screen updates as `(slot, text)` pairs.
    pub fn take_screens(&self) -> Vec<(u8, String)> {
        self.wire
            .lock()
            .written
            .drain(..)
            .map(|frame| {
                assert_eq!(frame[0], SCREEN_TAG);
                (frame[1], String::from_utf8_lossy(&frame[2..]).into_owned())
            })
            .collect()
    }
}

pub struct FakeConnection {
    wire: Arc<Mutex<Wire>>,
}

impl Transport for FakeTransport {
    type Connection = FakeConnection;

    fn discover(&self) -> Option<PortDescriptor> {
        let mut wire = self.wire.lock();
        wire.discover_calls += 1;
        wire.present.then(|| PortDescriptor {
            name: FAKE_PORT.to_string(),
            description: "Seeed XIAO RP2040".to_string(),
        })
    }

    fn open(
        &self,
        port: &PortDescriptor,
        _baud_rate: u32,
    ) -> Result<FakeConnection, TransportError> {
        let mut wire = self.wire.lock();
        wire.open_calls += 1;
        if wire.fail_open {
            return Err(TransportError::Open { port: port.name.clone(), reason: "busy".into() });
        }
        Ok(FakeConnection { wire: Arc::clone(&self.wire) })
    }
}

impl Connection for FakeConnection {
    fn port_name(&self) -> &str {
        FAKE_PORT
    }

    fn read_available(&mut self) -> Result<Vec<u8>, TransportError> {
        self.wire.lock().inbound.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut wire = self.wire.lock();
        if wire.fail_writes {
            return Err(TransportError::Write("broken pipe".into()));
        }
        wire.written.push(bytes.to_vec());
        Ok(())
    }

    fn close(self) {
        self.wire.lock().closed += 1;
    }
}
