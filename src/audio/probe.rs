use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Facts about an uploaded audio file that end up in recording metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioInfo {
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: u64,
    pub file_size: u64,
    pub file_type: String,
}

/// Size and extension of an upload, known without decoding it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadInfo {
    pub file_size: u64,
    pub file_type: String,
}

pub fn upload_info<P: AsRef<Path>>(path: P) -> Result<UploadInfo> {
    let path = path.as_ref();
    let file_size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat audio file: {}", path.display()))?
        .len();
    Ok(UploadInfo {
        file_size,
        file_type: file_type(path),
    })
}

/// Decode an audio file far enough to learn its length and layout.
pub fn probe_file<P: AsRef<Path>>(path: P) -> Result<AudioInfo> {
    let path = path.as_ref();

    let UploadInfo {
        file_size,
        file_type,
    } = upload_info(path)?;
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if file_type != "unknown" {
        hint.with_extension(&file_type);
    }

    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe audio format")?;

    let mut format = probe_result.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found in file")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate not specified in audio file")?;
    let mut channels = track
        .codec_params
        .channels
        .map(|layout| layout.count())
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut frames: u64 = 0;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(err).context("Failed to read packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .context("Failed to decode audio packet")?;
        if channels == 0 {
            channels = decoded.spec().channels.count();
        }
        frames += decoded.frames() as u64;
    }

    let duration_secs = frames as f64 / sample_rate as f64;
    debug!(
        path = %path.display(),
        sample_rate,
        channels,
        frames,
        duration_secs,
        "probed audio file"
    );

    Ok(AudioInfo {
        duration_secs,
        sample_rate,
        channels,
        frames,
        file_size,
        file_type,
    })
}

fn file_type(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
