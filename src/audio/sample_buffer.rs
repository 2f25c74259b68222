use std::fs::File;
use std::path::Path;

use anyhow::Context;
use symphonia::core::audio::SampleBuffer as DecodeBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::frame::StereoFrame;

#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    // hound reads the RIFF header whatever the extension; anything else is probed by symphonia
    pub fn load(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let (frames, file_rate) = match hound::WavReader::open(path) {
            Ok(reader) => read_wav(reader)?,
            Err(hound::Error::IoError(e)) => {
                return Err(e).with_context(|| format!("open {}", path.display()));
            }
            Err(_) => decode_compressed(path)?,
        };
        if frames.is_empty() {
            anyhow::bail!("{} contains no audio", path.display());
        }
        let data = if file_rate != target_rate {
            resample_linear(&frames, file_rate, target_rate)
        } else {
            frames
        };
        Ok(Self { data })
    }
}

fn read_wav<R: std::io::Read>(mut reader: hound::WavReader<R>) -> anyhow::Result<(Vec<StereoFrame>, u32)> {
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok((interleaved_to_stereo(&samples, spec.channels as usize), spec.sample_rate))
}

fn decode_compressed(path: &Path) -> anyhow::Result<(Vec<StereoFrame>, u32)> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        hint.with_extension(ext);
    }
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("unsupported format: {}", path.display()))?;
    let mut format = probed.format;
    let track = format.default_track().context("no default track")?.clone();
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    let mut frames = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track.id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => continue, // skip corrupt packets
            Err(e) => return Err(e.into()),
        };
        if sample_rate == 0 {
            sample_rate = decoded.spec().rate;
        }
        let channels = decoded.spec().channels.count();
        let mut buf = DecodeBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buf.copy_interleaved_ref(decoded);
        frames.extend(interleaved_to_stereo(buf.samples(), channels));
    }
    if sample_rate == 0 {
        anyhow::bail!("unknown sample rate: {}", path.display());
    }
    Ok((frames, sample_rate))
}

// mono is duplicated, anything past two channels is dropped
fn interleaved_to_stereo(samples: &[f32], channels: usize) -> Vec<StereoFrame> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().map(|&x| StereoFrame::mono(x)).collect(),
        n => samples
            .chunks_exact(n)
            .map(|c| StereoFrame { left: c[0], right: c[1] })
            .collect(),
    }
}

pub fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || source_rate == 0 {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.last().copied().unwrap_or_default();

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx + 1 >= frames.len() {
                last
            } else {
                let frac = (src_pos - idx as f64) as f32;
                frames[idx].lerp(frames[idx + 1], frac)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_fixture::write_test_wav;

    #[test]
    fn mono_wav_is_duplicated_to_both_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_test_wav(&path, 1, 44100, &[0.5; 100]);

        let buf = SampleBuffer::load(&path, 44100).unwrap();
        assert_eq!(buf.len(), 100);
        assert!((buf.data[10].left - 0.5).abs() < 1e-3);
        assert_eq!(buf.data[10].left, buf.data[10].right);
    }

    #[test]
    fn wav_content_is_read_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20240101120000.mp3");
        write_test_wav(&path, 2, 48000, &[0.25; 200]);

        let buf = SampleBuffer::load(&path, 48000).unwrap();
        assert_eq!(buf.len(), 100);
    }

    #[test]
    fn resampling_scales_length_by_rate_ratio() {
        let frames = vec![StereoFrame::mono(1.0); 441];
        let out = resample_linear(&frames, 44100, 88200);
        assert_eq!(out.len(), 882);
        assert!(out.iter().all(|f| (f.left - 1.0).abs() < 1e-6));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SampleBuffer::load(&dir.path().join("nope.wav"), 44100).is_err());
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(SampleBuffer::load(&path, 44100).is_err());
    }
}
