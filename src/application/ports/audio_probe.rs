//! Audio Probe Port - 音频探测
//!
//! 校验引擎产出的音频并读取时长

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioProbeError {
    #[error("Audio data is empty")]
    Empty,

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// 音频信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInfo {
    /// 每声道帧数
    pub frames: u64,
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
}

/// Audio Probe Port
pub trait AudioProbePort: Send + Sync {
    /// 探测音频数据，无法解析时返回错误
    fn probe(&self, data: &[u8]) -> Result<AudioInfo, AudioProbeError>;
}
