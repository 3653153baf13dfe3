use std::fs::File;
use std::io::{Cursor, ErrorKind};
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::warn;

use super::{format_hint, AudioSegment};
use crate::error::DecodeError;

/// Decodes an in-memory download. `hint` is the file extension the bytes are
/// expected to carry; symphonia still probes the content, so a wrong hint is not
/// necessarily fatal.
pub fn decode_bytes(bytes: Vec<u8>, hint: Option<&str>) -> Result<AudioSegment, DecodeError> {
    decode(Box::new(Cursor::new(bytes)), hint)
}

pub fn decode_file(path: &Path) -> Result<AudioSegment, DecodeError> {
    let file = File::open(path)?;
    decode(Box::new(file), format_hint(path).as_deref())
}

fn decode(source: Box<dyn MediaSource>, ext: Option<&str>) -> Result<AudioSegment, DecodeError> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = ext {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count());
    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = Some(spec.rate);
                channels = Some(spec.channels.count());

                let needed = decoded.capacity() * spec.channels.count();
                if sample_buf.as_ref().map_or(true, |b| b.capacity() < needed) {
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                warn!("skipping undecodable packet: {}", msg);
            }
            Err(err) => return Err(err.into()),
        }
    }

    match (sample_rate, channels) {
        (Some(rate), Some(ch)) if ch > 0 => Ok(AudioSegment::new(samples, rate, ch)),
        _ => Err(DecodeError::UnknownSpec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tone_wav;

    #[test]
    fn decodes_wav_bytes() {
        let bytes = tone_wav(440.0, 0.25, 8_000, 2);
        let seg = decode_bytes(bytes, Some("wav")).unwrap();
        assert_eq!(seg.sample_rate(), 8_000);
        assert_eq!(seg.channels(), 2);
        assert_eq!(seg.frames(), 2_000);
    }

    #[test]
    fn content_probe_survives_a_wrong_hint() {
        let bytes = tone_wav(440.0, 0.1, 8_000, 1);
        let seg = decode_bytes(bytes, Some("mp3")).unwrap();
        assert_eq!(seg.frames(), 800);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_bytes(b"definitely not audio".to_vec(), Some("mp3")).unwrap_err();
        assert!(matches!(err, DecodeError::Symphonia(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = decode_file(Path::new("does/not/exist.wav")).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
