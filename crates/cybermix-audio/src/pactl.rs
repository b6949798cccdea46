//! Volume control through the `pactl` CLI.
//!
//! Works against PulseAudio and against PipeWire's pulse compatibility
//! server, which covers nearly every Linux desktop without a native binding.

use std::io;
use std::process::Command;

use tracing::debug;

use cybermix_core::{AudioSession, ChannelId, VolumeBackend, VolumeError};

use crate::error::{AudioError, AudioResult};
use crate::session::{self, SinkInput};

/// Runs a `pactl` subcommand and returns its stdout.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send {
    /// Run `pactl` with the given arguments.
    ///
    /// # Errors
    /// Returns an error if `pactl` cannot be started or exits unsuccessfully.
    fn run(&self, args: Vec<String>) -> AudioResult<String>;
}

/// Spawns the real `pactl` binary.
#[derive(Debug, Clone)]
pub struct PactlRunner {
    program: String,
}

impl Default for PactlRunner {
    fn default() -> Self {
        Self { program: "pactl".to_string() }
    }
}

impl CommandRunner for PactlRunner {
    fn run(&self, args: Vec<String>) -> AudioResult<String> {
        let output = Command::new(&self.program).args(&args).output().map_err(AudioError::Unavailable)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AudioError::CommandFailed { command: args.join(" "), stderr });
        }

        String::from_utf8(output.stdout)
            .map_err(|e| AudioError::Unavailable(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

/// [`VolumeBackend`] backed by `pactl`.
pub struct PactlBackend {
    runner: Box<dyn CommandRunner>,
}

impl Default for PactlBackend {
    fn default() -> Self {
        Self::new(Box::new(PactlRunner::default()))
    }
}

impl PactlBackend {
    #[must_use]
    pub fn new(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// List all playback streams.
    ///
    /// # Errors
    /// Returns an error if `pactl` fails or prints something unexpected.
    pub fn sink_inputs(&self) -> AudioResult<Vec<SinkInput>> {
        let stdout = self.runner.run(args(&["-f", "json", "list", "sink-inputs"]))?;
        Ok(session::parse_sink_inputs(&stdout)?)
    }

    fn set_master_volume(&self, volume: f32) -> AudioResult<()> {
        let raw = session::raw_volume(volume).to_string();
        self.runner.run(args(&["set-sink-volume", "@DEFAULT_SINK@", &raw]))?;
        debug!(volume, "Master volume set");
        Ok(())
    }

    fn set_app_volume(&self, channel: &ChannelId, volume: f32) -> AudioResult<()> {
        let inputs = self.sink_inputs()?;
        let target = inputs
            .iter()
            .find(|input| input.process_name().is_some_and(|name| channel.matches_process(name)))
            .ok_or_else(|| AudioError::SessionNotFound(channel.to_string()))?;

        let raw = session::raw_volume(volume).to_string();
        self.runner.run(args(&["set-sink-input-volume", &target.index.to_string(), &raw]))?;
        debug!(channel = %channel, index = target.index, volume, "Application volume set");
        Ok(())
    }
}

impl VolumeBackend for PactlBackend {
    fn list_sessions(&self) -> Result<Vec<AudioSession>, VolumeError> {
        let inputs = self.sink_inputs()?;
        Ok(inputs.iter().filter_map(SinkInput::to_session).collect())
    }

    fn set_volume(&self, channel: &ChannelId, volume: f32) -> Result<(), VolumeError> {
        if channel.is_master() {
            self.set_master_volume(volume)?;
        } else {
            self.set_app_volume(channel, volume)?;
        }
        Ok(())
    }
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
