//! CyberMix Audio - host volume control and process discovery.
//!
//! This crate implements the core capability traits against the host:
//! - [`PactlBackend`] drives PulseAudio (or PipeWire's pulse server) through
//!   the `pactl` CLI
//! - [`ProcfsProcessLister`] reads running process names from `/proc`

pub mod error;
pub mod pactl;
pub mod procfs;
pub mod session;

pub use error::{AudioError, AudioResult};
pub use pactl::{CommandRunner, PactlBackend, PactlRunner};
pub use procfs::ProcfsProcessLister;
pub use session::SinkInput;
