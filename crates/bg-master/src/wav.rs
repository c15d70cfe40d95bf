//! WAV encoding for 16-bit stereo PCM.

use bg_engine::Frame;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{Seek, Write};
use std::path::Path;

fn spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn write_frames<W: Write + Seek>(
    writer: &mut WavWriter<W>,
    frames: &[Frame],
) -> Result<(), hound::Error> {
    for frame in frames {
        writer.write_sample(frame.left)?;
        writer.write_sample(frame.right)?;
    }
    Ok(())
}

/// Encode `frames` into a WAV file at `path`.
pub fn save_wav(path: &Path, frames: &[Frame], sample_rate: u32) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec(sample_rate))?;
    write_frames(&mut writer, frames)?;
    writer.finalize()
}
