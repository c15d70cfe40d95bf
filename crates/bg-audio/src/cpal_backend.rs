//! CPAL-based audio output backend.

use bg_engine::{AudioDevice, AudioError, AudioHost, Mixer, NoiseBuffer};
use bg_ir::{AudioTime, Hit};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Capacity of the scheduler-to-callback command queue.
pub const COMMAND_CAPACITY: usize = 1024;

/// Messages from the scheduler thread to the stream callback.
enum Command {
    Hit(Hit),
    Noise(NoiseBuffer),
}

/// Opens the default output device.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpalHost;

impl CpalHost {
    pub fn new() -> Self {
        Self
    }
}

impl AudioHost for CpalHost {
    type Device = CpalOutput;

    fn open(&mut self) -> Result<CpalOutput, AudioError> {
        CpalOutput::new()
    }
}

/// CPAL-based audio output.
///
/// The stream callback owns a [`Mixer`]. Hits reach it through a lock-free
/// command queue; the number of frames it has rendered is published through
/// an atomic and read back as the audio clock.
pub struct CpalOutput {
    config: StreamConfig,
    stream: Stream,
    commands: HeapProd<Command>,
    frames: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default device and build a suspended stream.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        // The callback writes stereo pairs
        config.channels = 2;

        let rb = HeapRb::<Command>::new(COMMAND_CAPACITY);
        let (commands, consumer) = rb.split();

        let frames = Arc::new(AtomicU64::new(0));
        let running = Arc::new(AtomicBool::new(false));
        let mixer = Mixer::new(config.sample_rate.0);

        let stream = build_stream(
            &device,
            &config,
            mixer,
            consumer,
            frames.clone(),
            running.clone(),
        )?;

        Ok(Self {
            config,
            stream,
            commands,
            frames,
            running,
        })
    }

    fn send(&mut self, command: Command) -> Result<(), AudioError> {
        self.commands
            .try_push(command)
            .map_err(|_| AudioError::QueueFull)
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut mixer: Mixer,
    mut commands: HeapCons<Command>,
    frames: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
) -> Result<Stream, AudioError> {
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // Commands are applied even while suspended so nothing queues up
                while let Some(command) = commands.try_pop() {
                    match command {
                        Command::Hit(hit) => {
                            mixer.schedule(hit);
                        }
                        Command::Noise(noise) => mixer.set_noise(noise),
                    }
                }

                if !running.load(Ordering::Acquire) {
                    data.fill(0.0);
                    return;
                }

                for chunk in data.chunks_mut(channels) {
                    let frame = mixer.render_frame();
                    for (i, sample) in chunk.iter_mut().enumerate() {
                        *sample = match i {
                            0 => frame.left_f32(),
                            1 => frame.right_f32(),
                            _ => 0.0,
                        };
                    }
                }
                frames.store(mixer.frames_rendered(), Ordering::Release);
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::StreamCreate(e.to_string()))
}

impl AudioDevice for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn current_time(&self) -> AudioTime {
        AudioTime::from_frames(self.frames.load(Ordering::Acquire), self.sample_rate())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Release);
        self.stream
            .play()
            .map_err(|e| AudioError::Playback(e.to_string()))
    }

    fn load_noise(&mut self, noise: NoiseBuffer) {
        if self.send(Command::Noise(noise)).is_err() {
            log::warn!("command queue full; noise buffer not delivered");
        }
    }

    fn trigger(&mut self, hit: Hit) -> Result<(), AudioError> {
        self.send(Command::Hit(hit))
    }
}
