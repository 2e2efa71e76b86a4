//! Symphonia Probe - 基于 symphonia 的音频探测
//!
//! 只解析容器，不解码样本

use std::io::Cursor;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioInfo, AudioProbeError, AudioProbePort};

/// 基于 symphonia 的 WAV 探测器
#[derive(Debug, Default, Clone)]
pub struct SymphoniaProbe;

impl SymphoniaProbe {
    pub fn new() -> Self {
        Self
    }
}

impl AudioProbePort for SymphoniaProbe {
    fn probe(&self, data: &[u8]) -> Result<AudioInfo, AudioProbeError> {
        if data.is_empty() {
            return Err(AudioProbeError::Empty);
        }

        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioProbeError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioProbeError::DecodingError("No audio track found".to_string()))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| AudioProbeError::DecodingError("Unknown sample rate".to_string()))?;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u8)
            .ok_or_else(|| AudioProbeError::DecodingError("Unknown channel count".to_string()))?;
        let n_frames = track.codec_params.n_frames;

        let frames = match n_frames {
            Some(n) => n,
            None => {
                // 头部未给出帧数时逐包累加
                let mut total = 0u64;
                loop {
                    match format.next_packet() {
                        Ok(packet) if packet.track_id() == track_id => total += packet.dur(),
                        Ok(_) => continue,
                        Err(symphonia::core::errors::Error::IoError(e))
                            if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                        {
                            break;
                        }
                        Err(e) => {
                            return Err(AudioProbeError::DecodingError(format!(
                                "Packet read error: {}",
                                e
                            )));
                        }
                    }
                }
                total
            }
        };

        Ok(AudioInfo {
            frames,
            duration_ms: frames * 1000 / sample_rate as u64,
            sample_rate,
            channels,
        })
    }
}
