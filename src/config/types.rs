//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::Language;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 合成引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// Worker 池配置
    #[serde(default)]
    pub workers: WorkersConfig,

    /// 上传限制
    #[serde(default)]
    pub upload: UploadConfig,

    /// 同步克隆配置
    #[serde(default)]
    pub clone: CloneConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 过期清理配置
    #[serde(default)]
    pub retention: RetentionConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 对外访问的 Base URL（用于响应中的 status_url / result_url）
    /// 未设置时返回相对路径
    #[serde(default)]
    pub base_url: Option<String>,

    /// 是否允许跨域
    #[serde(default = "default_true")]
    pub cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            cors: true,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 响应中 URL 的前缀
    pub fn public_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_default()
    }
}

/// 引擎实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineBackend {
    /// 外部模型服务
    Http,
    /// 进程内静音引擎
    Fake,
}

impl std::fmt::Display for EngineBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineBackend::Http => f.write_str("http"),
            EngineBackend::Fake => f.write_str("fake"),
        }
    }
}

/// 合成引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_backend")]
    pub backend: EngineBackend,

    /// 模型服务基础 URL
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// 单次推理时间上限（秒）
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,

    /// fake 引擎的模拟延迟（毫秒）
    #[serde(default = "default_fake_delay")]
    pub fake_delay_ms: u64,
}

fn default_backend() -> EngineBackend {
    EngineBackend::Http
}

fn default_engine_url() -> String {
    "http://localhost:8020".to_string()
}

fn default_engine_timeout() -> u64 {
    120
}

fn default_fake_delay() -> u64 {
    200
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_engine_url(),
            timeout_secs: default_engine_timeout(),
            fake_delay_ms: default_fake_delay(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Worker 池配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkersConfig {
    /// worker 数量
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_pool_size() -> usize {
    1
}

fn default_queue_capacity() -> usize {
    32
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// 上传限制
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// 文本最多字符数
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// 文本最少字符数
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// 参考音频最大字节数
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// 启用的语言（显示名或代码），为空表示全部
    #[serde(default)]
    pub languages: Vec<String>,
}

fn default_max_text_chars() -> usize {
    2000
}

fn default_min_text_chars() -> usize {
    3
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024 // 10MB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            min_text_chars: default_min_text_chars(),
            max_upload_bytes: default_max_upload_bytes(),
            languages: Vec::new(),
        }
    }
}

impl UploadConfig {
    /// 解析启用的语言，无法识别的名称被忽略（加载时已校验）
    pub fn enabled_languages(&self) -> Vec<Language> {
        if self.languages.is_empty() {
            return Language::ALL.to_vec();
        }

        let mut languages: Vec<Language> = Vec::new();
        for language in self.languages.iter().filter_map(|s| Language::parse(s)) {
            if !languages.contains(&language) {
                languages.push(language);
            }
        }
        languages
    }
}

/// 同步克隆配置
#[derive(Debug, Clone, Deserialize)]
pub struct CloneConfig {
    /// 同步接口最长等待时间（秒）
    #[serde(default = "default_sync_wait_timeout")]
    pub sync_wait_timeout_secs: u64,
}

fn default_sync_wait_timeout() -> u64 {
    300
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            sync_wait_timeout_secs: default_sync_wait_timeout(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 任务目录根路径
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data/jobs")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// 过期清理配置
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// 是否启用定期清理
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 任务结束后保留时间（秒）
    #[serde(default = "default_retention_window")]
    pub window_secs: u64,

    /// 清理间隔（秒）
    #[serde(default = "default_retention_interval")]
    pub interval_secs: u64,

    /// 内存中最多保留的任务数
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
}

fn default_retention_window() -> u64 {
    4 * 3600 // 4 小时
}

fn default_retention_interval() -> u64 {
    600 // 10 分钟
}

fn default_max_jobs() -> usize {
    1000
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: default_retention_window(),
            interval_secs: default_retention_interval(),
            max_jobs: default_max_jobs(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
