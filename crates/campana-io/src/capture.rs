//! Microphone capture via cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream};

use crate::window::{DEFAULT_WINDOW_SIZE, SampleWindow, WindowAccumulator};
use crate::{Error, Result};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio input device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

/// Capture configuration.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Input device name (uses default if `None`); matched
    /// case-insensitively as a substring.
    pub device: Option<String>,
    /// Window length in frames handed to the consumer.
    pub window_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: None,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// List all available audio input devices.
pub fn list_input_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let inputs = host.input_devices().map_err(|e| Error::Stream(e.to_string()))?;
    for device in inputs {
        if let Ok(name) = device_name(&device) {
            let (sample_rate, channels) = device
                .default_input_config()
                .map(|c| (c.sample_rate(), c.channels()))
                .unwrap_or((48000, 2));

            devices.push(AudioDevice {
                name,
                default_sample_rate: sample_rate,
                channels,
            });
        }
    }

    Ok(devices)
}

/// Find a cpal input device by name, or return the default.
fn find_input_device(host: &cpal::Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            let devices = host
                .input_devices()
                .map_err(|e| Error::Stream(e.to_string()))?;

            for device in devices {
                if let Ok(dev_name) = device_name(&device)
                    && dev_name.to_lowercase().contains(&search_lower)
                {
                    return Ok(device);
                }
            }
            Err(Error::DeviceNotFound(format!(
                "no input device matching '{}'",
                search
            )))
        }
        None => host.default_input_device().ok_or(Error::NoDevice),
    }
}

/// Microphone capture source.
///
/// Owns the input stream and the double-buffered window accumulator.
/// The consumer callback runs on the audio thread, once per completed
/// window; everything it does counts against the real-time budget.
pub struct MicCapture {
    device: Device,
    window_size: usize,
    sample_rate: u32,
    channels: u16,
    stream: Option<Stream>,
}

impl MicCapture {
    /// Open the configured input device at its native sample rate.
    pub fn new(config: &CaptureConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_input_device(&host, config.device.as_deref())?;

        let input_config = device
            .default_input_config()
            .map_err(|e| Error::Stream(e.to_string()))?;
        let sample_rate = input_config.sample_rate();
        let channels = input_config.channels();

        tracing::info!(
            device = %device_name(&device).unwrap_or_else(|_| "unknown".into()),
            sample_rate,
            channels,
            "input device opened"
        );

        Ok(Self {
            device,
            window_size: config.window_size,
            sample_rate,
            channels,
            stream: None,
        })
    }

    /// Native sample rate of the opened device.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start capturing.
    ///
    /// `on_window` receives each completed [`SampleWindow`] together with
    /// the stream sample rate, on the audio thread. Capturing continues
    /// until [`stop`](Self::stop) or drop.
    pub fn start<F>(&mut self, mut on_window: F) -> Result<()>
    where
        F: FnMut(&mut SampleWindow, f32) + Send + 'static,
    {
        if self.stream.is_some() {
            return Ok(());
        }

        let input_config = self
            .device
            .default_input_config()
            .map_err(|e| Error::Stream(e.to_string()))?;

        let channels = self.channels as usize;
        let sample_rate = self.sample_rate as f32;
        let mut accumulator = WindowAccumulator::new(self.window_size);

        let stream = self
            .device
            .build_input_stream(
                &input_config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    accumulator.push_interleaved(data, channels, |window| {
                        on_window(window, sample_rate);
                    });
                },
                |err| tracing::error!(error = %err, "input stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        self.stream = Some(stream);

        Ok(())
    }

    /// Stop capturing and release the stream.
    ///
    /// Restarting afterwards begins a fresh window; partially accumulated
    /// frames are dropped.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::info!("capture stopped");
        }
    }
}
