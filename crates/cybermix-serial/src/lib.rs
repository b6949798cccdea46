//! CyberMix Serial - USB serial link to the fader board.
//!
//! The board enumerates as a USB CDC serial port (Seeed XIAO RP2040 or a
//! generic USB-serial bridge). This crate finds it by port description and
//! implements the core [`Transport`](cybermix_core::Transport) trait on top
//! of the `serialport` crate.

pub mod device;

pub use device::{SerialConnection, SerialTransport};
