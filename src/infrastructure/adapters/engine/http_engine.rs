//! HTTP Synthesis Engine - 调用外部声音克隆模型服务
//!
//! 实现 SynthesisEnginePort trait
//!
//! 外部模型 API:
//! POST http://localhost:8020/api/tts/clone
//! Request: multipart/form-data {text, language, speaker_wav}
//! Response: audio/wav binary

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{
    SynthesisEnginePort, SynthesisError, SynthesisOutput, SynthesisRequest,
};

/// HTTP 引擎配置
#[derive(Debug, Clone)]
pub struct HttpSynthesisEngineConfig {
    /// 模型服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSynthesisEngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8020".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpSynthesisEngineConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 合成引擎
pub struct HttpSynthesisEngine {
    client: Client,
    config: HttpSynthesisEngineConfig,
}

impl HttpSynthesisEngine {
    /// 创建新的 HTTP 引擎客户端
    pub fn new(config: HttpSynthesisEngineConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn clone_url(&self) -> String {
        format!("{}/api/tts/clone", self.config.base_url.trim_end_matches('/'))
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SynthesisEnginePort for HttpSynthesisEngine {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisOutput, SynthesisError> {
        let reference = tokio::fs::read(&request.reference_audio)
            .await
            .map_err(|e| {
                SynthesisError::ReferenceAudio(format!(
                    "{}: {}",
                    request.reference_audio.display(),
                    e
                ))
            })?;

        let file_name = request
            .reference_audio
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "reference.wav".to_string());

        let form = Form::new()
            .text("text", request.text.clone())
            .text("language", request.language.code())
            .part("speaker_wav", Part::bytes(reference).file_name(file_name));

        tracing::debug!(
            url = %self.clone_url(),
            text_len = request.text.len(),
            language = request.language.code(),
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(self.clone_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout
                } else if e.is_connect() {
                    SynthesisError::NetworkError(format!(
                        "Cannot connect to synthesis service: {}",
                        e
                    ))
                } else {
                    SynthesisError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let sample_rate = response
            .headers()
            .get("X-Sample-Rate")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        tracing::debug!(
            sample_rate = ?sample_rate,
            audio_size = audio_data.len(),
            "Synthesis response received"
        );

        Ok(SynthesisOutput {
            audio_data,
            sample_rate,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Language;
    use std::path::PathBuf;

    #[test]
    fn test_config_default() {
        let config = HttpSynthesisEngineConfig::default();
        assert_eq!(config.base_url, "http://localhost:8020");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpSynthesisEngineConfig::new("http://example.com:9000/").with_timeout(60);
        assert_eq!(config.timeout_secs, 60);

        let engine = HttpSynthesisEngine::new(config).unwrap();
        assert_eq!(engine.clone_url(), "http://example.com:9000/api/tts/clone");
        assert_eq!(engine.health_url(), "http://example.com:9000/health");
    }

    #[tokio::test]
    async fn test_missing_reference_audio() {
        let engine = HttpSynthesisEngine::new(HttpSynthesisEngineConfig::default()).unwrap();
        let result = engine
            .synthesize(SynthesisRequest {
                reference_audio: PathBuf::from("/nonexistent/reference.wav"),
                text: "Hello world".to_string(),
                language: Language::English,
            })
            .await;
        assert!(matches!(result, Err(SynthesisError::ReferenceAudio(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unhealthy() {
        let engine =
            HttpSynthesisEngine::new(HttpSynthesisEngineConfig::new("http://127.0.0.1:1"))
                .unwrap();
        assert!(!engine.health_check().await);
    }
}
