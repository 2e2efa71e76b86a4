//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, EngineBackend};
use crate::domain::Language;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "VOXCLONE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXCLONE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXCLONE_SERVER__PORT=8080`
/// - `VOXCLONE_ENGINE__URL=http://xtts:8020`
/// - `VOXCLONE_ENGINE__BACKEND=fake`
/// - `VOXCLONE_WORKERS__POOL_SIZE=2`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("server.cors", true)?
        .set_default("engine.backend", "http")?
        .set_default("engine.url", "http://localhost:8020")?
        .set_default("engine.timeout_secs", 120)?
        .set_default("engine.fake_delay_ms", 200)?
        .set_default("workers.pool_size", 1)?
        .set_default("workers.queue_capacity", 32)?
        .set_default("upload.max_text_chars", 2000)?
        .set_default("upload.min_text_chars", 3)?
        .set_default("upload.max_upload_bytes", 10 * 1024 * 1024)?
        .set_default("clone.sync_wait_timeout_secs", 300)?
        .set_default("storage.root", "data/jobs")?
        .set_default("retention.enabled", true)?
        .set_default("retention.window_secs", 4 * 3600)?
        .set_default("retention.interval_secs", 600)?
        .set_default("retention.max_jobs", 1000)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: VOXCLONE_ENGINE__URL=http://xtts:8020
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("upload.languages")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.server.port == 0 {
        return invalid("Server port cannot be 0");
    }

    if config.engine.backend == EngineBackend::Http && config.engine.url.is_empty() {
        return invalid("Engine URL cannot be empty");
    }
    if config.engine.timeout_secs == 0 {
        return invalid("Engine timeout cannot be 0");
    }

    if config.workers.pool_size == 0 {
        return invalid("Worker pool size cannot be 0");
    }
    if config.workers.queue_capacity == 0 {
        return invalid("Queue capacity cannot be 0");
    }

    if config.upload.max_text_chars == 0 {
        return invalid("Max text length cannot be 0");
    }
    if config.upload.min_text_chars > config.upload.max_text_chars {
        return invalid("Min text length cannot exceed max text length");
    }
    if config.upload.max_upload_bytes == 0 {
        return invalid("Max upload size cannot be 0");
    }
    if let Some(unknown) = config
        .upload
        .languages
        .iter()
        .find(|name| Language::parse(name).is_none())
    {
        return Err(ConfigError::ValidationError(format!(
            "Unknown language in upload.languages: {}",
            unknown
        )));
    }

    if config.clone.sync_wait_timeout_secs == 0 {
        return invalid("Sync wait timeout cannot be 0");
    }

    if config.storage.root.as_os_str().is_empty() {
        return invalid("Storage root cannot be empty");
    }

    if config.retention.enabled && config.retention.interval_secs == 0 {
        return invalid("Retention interval cannot be 0 when retention is enabled");
    }
    if config.retention.max_jobs == 0 {
        return invalid("Max jobs cannot be 0");
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    if let Some(base_url) = &config.server.base_url {
        tracing::info!("Public Base URL: {}", base_url);
    }
    tracing::info!("Engine: {} ({})", config.engine.backend, config.engine.url);
    tracing::info!("Engine Timeout: {}s", config.engine.timeout_secs);
    tracing::info!(
        "Workers: {} (queue capacity {})",
        config.workers.pool_size,
        config.workers.queue_capacity
    );
    tracing::info!(
        "Text Length: {}..={} chars",
        config.upload.min_text_chars,
        config.upload.max_text_chars
    );
    tracing::info!("Max Upload: {} bytes", config.upload.max_upload_bytes);
    tracing::info!("Languages: {}", config.upload.enabled_languages().len());
    tracing::info!("Sync Wait Timeout: {}s", config.clone.sync_wait_timeout_secs);
    tracing::info!("Storage Root: {:?}", config.storage.root);
    tracing::info!("Retention Enabled: {}", config.retention.enabled);
    if config.retention.enabled {
        tracing::info!("Retention Window: {}s", config.retention.window_secs);
        tracing::info!("Retention Interval: {}s", config.retention.interval_secs);
    }
    tracing::info!("Max Jobs: {}", config.retention.max_jobs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
