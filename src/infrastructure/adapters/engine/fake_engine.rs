//! Fake Synthesis Engine - 进程内的确定性引擎
//!
//! 不调用模型，按文本长度生成静音 WAV。用于测试和无模型的本地运行

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{
    SynthesisEnginePort, SynthesisError, SynthesisOutput, SynthesisRequest,
};

/// 生成的音频采样率
const FAKE_SAMPLE_RATE: u32 = 24000;

/// 估算语速（词/秒）
const WORDS_PER_SECOND: f64 = 2.5;

/// Fake 引擎的行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeEngineMode {
    /// 正常返回静音 WAV
    Succeed,
    /// 返回引擎错误
    Fail,
    /// 在合成过程中 panic
    Panic,
    /// 返回空音频
    Empty,
    /// 永不返回
    Hang,
}

/// Fake 引擎配置
#[derive(Debug, Clone)]
pub struct FakeSynthesisEngineConfig {
    /// 模拟的推理延迟
    pub delay: Duration,
    pub mode: FakeEngineMode,
}

impl Default for FakeSynthesisEngineConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(200),
            mode: FakeEngineMode::Succeed,
        }
    }
}

/// Fake Synthesis Engine
pub struct FakeSynthesisEngine {
    config: FakeSynthesisEngineConfig,
}

impl FakeSynthesisEngine {
    pub fn new(config: FakeSynthesisEngineConfig) -> Self {
        tracing::info!(
            delay_ms = config.delay.as_millis() as u64,
            mode = ?config.mode,
            "FakeSynthesisEngine initialized"
        );
        Self { config }
    }

    pub fn with_mode(mode: FakeEngineMode) -> Self {
        Self::new(FakeSynthesisEngineConfig {
            delay: Duration::from_millis(10),
            mode,
        })
    }

    /// 按词数估算的帧数，至少半秒
    fn frames_for(text: &str) -> u32 {
        let words = text.split_whitespace().count().max(1) as f64;
        let secs = (words / WORDS_PER_SECOND).max(0.5);
        (secs * FAKE_SAMPLE_RATE as f64) as u32
    }
}

#[async_trait]
impl SynthesisEnginePort for FakeSynthesisEngine {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisOutput, SynthesisError> {
        tracing::debug!(
            text_len = request.text.len(),
            language = request.language.code(),
            mode = ?self.config.mode,
            "FakeSynthesisEngine: synthesizing"
        );

        if !request.reference_audio.exists() {
            return Err(SynthesisError::ReferenceAudio(
                request.reference_audio.display().to_string(),
            ));
        }

        tokio::time::sleep(self.config.delay).await;

        match self.config.mode {
            FakeEngineMode::Succeed => Ok(SynthesisOutput {
                audio_data: silent_wav(FAKE_SAMPLE_RATE, 1, Self::frames_for(&request.text)),
                sample_rate: Some(FAKE_SAMPLE_RATE),
            }),
            FakeEngineMode::Fail => Err(SynthesisError::ServiceError(
                "fake engine failure".to_string(),
            )),
            FakeEngineMode::Panic => panic!("fake engine panicked"),
            FakeEngineMode::Empty => Ok(SynthesisOutput {
                audio_data: Vec::new(),
                sample_rate: None,
            }),
            FakeEngineMode::Hang => {
                std::future::pending::<()>().await;
                Err(SynthesisError::Timeout)
            }
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// 生成 16 位 PCM 静音 WAV
pub fn silent_wav(sample_rate: u32, num_channels: u16, frames: u32) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let data_size = frames as usize * block_align as usize;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    let byte_rate = sample_rate * block_align as u32;
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());
    wav.resize(44 + data_size, 0);

    wav
}
