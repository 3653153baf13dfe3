use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::info;

use super::AudioSegment;
use crate::error::EncodeError;

/// Writes `segment` to `output` in the container named by `format`.
///
/// WAV is written directly as 16-bit PCM. Every other format is handed to
/// `ffmpeg`, which reads raw PCM from stdin and muxes it into `output`.
pub fn export(
    segment: &AudioSegment,
    output: &Path,
    format: &str,
    ffmpeg: &str,
) -> Result<(), EncodeError> {
    info!(
        "exporting {:.2}s of audio to {} as {}",
        segment.duration().as_secs_f64(),
        output.display(),
        format
    );

    match format {
        "wav" | "wave" => write_wav(segment, output),
        other => run_ffmpeg(segment, output, ffmpeg_muxer(other), ffmpeg),
    }
}

fn write_wav(segment: &AudioSegment, output: &Path) -> Result<(), EncodeError> {
    let spec = hound::WavSpec {
        channels: segment.channels() as u16,
        sample_rate: segment.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(output, spec)?;
    for &sample in segment.samples() {
        writer.write_sample(to_i16(sample))?;
    }
    writer.finalize()?;
    Ok(())
}

fn run_ffmpeg(
    segment: &AudioSegment,
    output: &Path,
    muxer: &str,
    ffmpeg: &str,
) -> Result<(), EncodeError> {
    let rate = segment.sample_rate().to_string();
    let channels = segment.channels().to_string();
    let args = [
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "s16le",
        "-ar",
        rate.as_str(),
        "-ac",
        channels.as_str(),
        "-i",
        "pipe:0",
        "-f",
        muxer,
    ];

    let mut child = Command::new(ffmpeg)
        .args(args)
        .arg(output)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(EncodeError::Spawn)?;

    let pcm: Vec<u8> = segment
        .samples()
        .iter()
        .flat_map(|&s| to_i16(s).to_le_bytes())
        .collect();

    // Feed stdin from its own thread so stderr is drained and the child is
    // always reaped, even when ffmpeg quits before reading everything.
    let stdin = child.stdin.take();
    let feeder = thread::spawn(move || -> io::Result<()> {
        if let Some(mut stdin) = stdin {
            stdin.write_all(&pcm)?;
        }
        Ok(())
    });

    let out = child.wait_with_output()?;
    let fed = feeder
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("ffmpeg stdin writer panicked")));

    if !out.status.success() {
        return Err(EncodeError::Ffmpeg {
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    fed?;
    Ok(())
}

/// Maps a file extension to the ffmpeg muxer that produces it.
fn ffmpeg_muxer(format: &str) -> &str {
    match format {
        "m4a" | "aac" => "ipod",
        "oga" => "ogg",
        other => other,
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode_file;

    #[test]
    fn wav_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let seg = AudioSegment::new(vec![0.0, 0.5, -0.5, -1.0, 0.25, 0.125], 16_000, 2);

        export(&seg, &path, "wav", "ffmpeg").unwrap();

        let back = decode_file(&path).unwrap();
        assert_eq!(back.sample_rate(), seg.sample_rate());
        assert_eq!(back.channels(), seg.channels());
        assert_eq!(back.samples().len(), seg.samples().len());
        for (got, want) in back.samples().iter().zip(seg.samples()) {
            assert!((got - want).abs() < 1e-4, "{got} vs {want}");
        }
    }

    #[test]
    fn missing_ffmpeg_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp3");
        let seg = AudioSegment::new(vec![0.0; 16], 8_000, 1);

        let err = export(&seg, &path, "mp3", "/nonexistent/bin/ffmpeg").unwrap_err();
        assert!(matches!(err, EncodeError::Spawn(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn ffmpeg_exiting_early_reports_its_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp3");
        let seg = AudioSegment::new(vec![0.1; 88_200], 44_100, 2);

        let err = export(&seg, &path, "mp3", "/bin/false").unwrap_err();
        assert!(matches!(err, EncodeError::Ffmpeg { .. }), "got {err:?}");
    }

    #[test]
    fn sample_conversion_clamps() {
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(-1.0), i16::MIN);
        assert_eq!(to_i16(0.5), 16_384);
    }
}
