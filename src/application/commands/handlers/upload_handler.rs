//! Upload Handler - 上传校验与持久化
//!
//! 校验在任务创建之前完成：任何违规都直接返回 InvalidInput，不产生任务记录

use std::sync::Arc;

use crate::application::commands::clone_commands::{SubmitClone, UploadedAudio};
use crate::application::error::ApplicationError;
use crate::application::ports::JobStoragePort;
use crate::domain::{AudioFormat, AudioRef, CloneInput, JobId, Language};

/// 上传限制
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// 文本最少字符数
    pub min_text_chars: usize,
    /// 文本最多字符数
    pub max_text_chars: usize,
    /// 参考音频最大字节数
    pub max_upload_bytes: u64,
    /// 启用的语言
    pub languages: Vec<Language>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            min_text_chars: 3,
            max_text_chars: 2000,
            max_upload_bytes: 10 * 1024 * 1024,
            languages: Language::ALL.to_vec(),
        }
    }
}

/// 校验通过的上传
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub text: String,
    pub language: Language,
    pub format: AudioFormat,
    pub audio_data: Vec<u8>,
}

impl ValidatedUpload {
    pub fn to_input(&self) -> CloneInput {
        CloneInput {
            text: self.text.clone(),
            language: self.language,
            reference_format: self.format,
        }
    }
}

pub struct UploadHandler {
    policy: UploadPolicy,
    storage: Arc<dyn JobStoragePort>,
}

impl UploadHandler {
    pub fn new(policy: UploadPolicy, storage: Arc<dyn JobStoragePort>) -> Self {
        Self { policy, storage }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// 校验提交内容
    pub fn validate(&self, cmd: SubmitClone) -> Result<ValidatedUpload, ApplicationError> {
        let text = self.validate_text(cmd.text.as_deref())?;
        let language = self.validate_language(cmd.language.as_deref())?;
        let audio = cmd
            .audio
            .ok_or_else(|| ApplicationError::invalid_input("Reference audio file is required"))?;
        let format = self.validate_audio(&audio)?;

        Ok(ValidatedUpload {
            text,
            language,
            format,
            audio_data: audio.data,
        })
    }

    /// 将参考音频写入任务目录
    pub async fn persist(
        &self,
        job_id: JobId,
        upload: &ValidatedUpload,
    ) -> Result<AudioRef, ApplicationError> {
        let audio_ref = self
            .storage
            .save_reference(job_id, upload.format, &upload.audio_data)
            .await?;

        tracing::debug!(
            job_id = %job_id,
            path = %audio_ref.path().display(),
            size = upload.audio_data.len(),
            "Reference audio stored"
        );
        Ok(audio_ref)
    }

    fn validate_text(&self, text: Option<&str>) -> Result<String, ApplicationError> {
        let text = text.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(ApplicationError::invalid_input("Text is required"));
        }

        let chars = text.chars().count();
        if chars > self.policy.max_text_chars {
            return Err(ApplicationError::invalid_input(format!(
                "Text too long ({} chars). Maximum: {} characters",
                chars, self.policy.max_text_chars
            )));
        }
        if chars < self.policy.min_text_chars {
            return Err(ApplicationError::invalid_input(format!(
                "Text too short. Please enter at least {} characters",
                self.policy.min_text_chars
            )));
        }

        Ok(text.to_string())
    }

    fn validate_language(&self, language: Option<&str>) -> Result<Language, ApplicationError> {
        let language = language.unwrap_or("English");
        Language::parse(language)
            .filter(|lang| self.policy.languages.contains(lang))
            .ok_or_else(|| {
                let supported: Vec<&str> = self.policy.languages.iter().map(|l| l.name()).collect();
                ApplicationError::invalid_input(format!(
                    "Unsupported language '{}'. Use one of: {}",
                    language,
                    supported.join(", ")
                ))
            })
    }

    fn validate_audio(&self, audio: &UploadedAudio) -> Result<AudioFormat, ApplicationError> {
        let file_name = audio
            .file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApplicationError::invalid_input("No filename provided"))?;

        let format = AudioFormat::from_file_name(file_name).ok_or_else(|| {
            ApplicationError::invalid_input(
                "Unsupported audio format. Use: WAV, MP3, FLAC, OGG, or M4A",
            )
        })?;

        if let Some(content_type) = audio.content_type.as_deref() {
            let content_type = content_type.to_ascii_lowercase();
            if content_type != "application/octet-stream" && !content_type.starts_with("audio/") {
                return Err(ApplicationError::invalid_input(format!(
                    "Unsupported content type: {}",
                    content_type
                )));
            }
        }

        if audio.data.is_empty() {
            return Err(ApplicationError::invalid_input("Reference audio file is empty"));
        }
        if audio.data.len() as u64 > self.policy.max_upload_bytes {
            return Err(ApplicationError::invalid_input(format!(
                "Reference audio too large ({} bytes). Maximum: {} bytes",
                audio.data.len(),
                self.policy.max_upload_bytes
            )));
        }

        Ok(format)
    }
}
