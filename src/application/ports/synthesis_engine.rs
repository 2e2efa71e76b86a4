//! Synthesis Engine Port - 语音克隆引擎抽象
//!
//! 外部声音克隆模型的窄接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Language;

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Reference audio unavailable: {0}")]
    ReferenceAudio(String),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 参考音频路径
    pub reference_audio: PathBuf,
    /// 要合成的文本
    pub text: String,
    /// 目标语言
    pub language: Language,
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// 生成的音频数据（WAV）
    pub audio_data: Vec<u8>,
    /// 采样率（引擎提供时）
    pub sample_rate: Option<u32>,
}

/// Synthesis Engine Port
///
/// 一次调用合成一段音频。调用耗时较长（数十秒）且不可中途取消；
/// 实现方若不可重入，需要自行串行化
#[async_trait]
pub trait SynthesisEnginePort: Send + Sync {
    /// 执行声音克隆合成
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisOutput, SynthesisError>;

    /// 检查引擎是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }

    /// 引擎名称（用于日志和健康检查）
    fn name(&self) -> &'static str;
}
