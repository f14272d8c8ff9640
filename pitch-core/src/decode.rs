//! Audio file decoding into mono recordings, via symphonia.

use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::recording::Recording;

/// Decodes the first audio track of a file and downmixes it to mono.
///
/// Supports WAV, MP3, FLAC and OGG Vorbis. Packets that fail to decode
/// are skipped.
pub fn decode_audio(path: &Path) -> Result<Recording> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("No audio tracks found")?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.context("Unknown sample rate")?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                log::warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        // Layout can change between packets; trust the decoded buffer.
        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        append_mono(&mut samples, sample_buf.samples(), spec.channels.count());
    }

    let recording = Recording::new(samples, sample_rate);
    log::info!(
        "Decoded audio: {} samples, {}Hz, {:.2}s",
        recording.samples.len(),
        sample_rate,
        recording.duration_secs()
    );

    Ok(recording)
}

/// Appends interleaved frames to `out`, averaging each frame to one sample.
fn append_mono(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_mono_averages_frames() {
        let mut out = vec![1.0];
        append_mono(&mut out, &[0.2, 0.4, -0.2, -0.6], 2);
        assert_eq!(out.len(), 3);
        assert!((out[1] - 0.3).abs() < 1e-6);
        assert!((out[2] + 0.4).abs() < 1e-6);
    }

    #[test]
    fn stereo_file_decodes_to_mono_at_full_length() {
        let path = std::env::temp_dir()
            .join(format!("pitchscope-stereo-{}.wav", std::process::id()));
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..4000 {
            writer.write_sample(0.5f32).unwrap();
            writer.write_sample(-0.1f32).unwrap();
        }
        writer.finalize().unwrap();

        let decoded = decode_audio(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples.len(), 4000);
        assert!(decoded.samples.iter().all(|s| (s - 0.2).abs() < 1e-6));
    }
}
