//! VoxClone - 语音克隆服务
//!
//! 组装各层组件:
//! - Domain: job/, language
//! - Application: commands, queries, ports
//! - Infrastructure: http, memory, worker, adapters, events

use std::sync::Arc;
use std::time::Duration;

use voxclone::application::{SynthesisEnginePort, UploadPolicy};
use voxclone::config::{load_config, print_config, EngineBackend};
use voxclone::infrastructure::adapters::{
    FakeSynthesisEngine, FakeSynthesisEngineConfig, FileJobStorage, HttpSynthesisEngine,
    HttpSynthesisEngineConfig, SymphoniaProbe,
};
use voxclone::infrastructure::events::JobEventPublisher;
use voxclone::infrastructure::http::{AppState, HttpServer, ServerConfig, StateOptions};
use voxclone::infrastructure::memory::{BoundedJobQueue, InMemoryJobStore};
use voxclone::infrastructure::worker::{
    CloneWorkerConfig, CloneWorkerPool, RetentionConfig, RetentionSweeper,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},voxclone={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("VoxClone - 语音克隆服务 v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 任务目录
    let storage = Arc::new(FileJobStorage::new(&config.storage.root).await?);

    // 合成引擎
    let engine: Arc<dyn SynthesisEnginePort> = match config.engine.backend {
        EngineBackend::Http => Arc::new(HttpSynthesisEngine::new(
            HttpSynthesisEngineConfig::new(&config.engine.url)
                .with_timeout(config.engine.timeout_secs),
        )?),
        EngineBackend::Fake => Arc::new(FakeSynthesisEngine::new(FakeSynthesisEngineConfig {
            delay: Duration::from_millis(config.engine.fake_delay_ms),
            ..Default::default()
        })),
    };

    if !engine.health_check().await {
        tracing::warn!(
            engine = engine.name(),
            "Synthesis engine is not reachable yet, jobs will fail until it is"
        );
    }

    // 事件、任务表与队列
    let event_publisher = Arc::new(JobEventPublisher::new());
    let job_store = InMemoryJobStore::new(config.retention.max_jobs).arc();
    let (job_queue, queue_rx) = BoundedJobQueue::new(config.workers.queue_capacity);
    let job_queue = job_queue.arc();

    // Worker 池
    let worker_pool = CloneWorkerPool::new(
        CloneWorkerConfig {
            pool_size: config.workers.pool_size,
            engine_timeout: config.engine.timeout(),
        },
        queue_rx,
        job_store.clone(),
        storage.clone(),
        engine.clone(),
        Arc::new(SymphoniaProbe::new()),
        event_publisher.clone(),
    );
    let worker_stats = worker_pool.stats();
    let _workers = worker_pool.start();

    // 过期清理
    if config.retention.enabled {
        let sweeper = RetentionSweeper::new(
            RetentionConfig {
                window: Duration::from_secs(config.retention.window_secs),
                interval: Duration::from_secs(config.retention.interval_secs),
            },
            job_store.clone(),
            storage.clone(),
            event_publisher.clone(),
        );
        sweeper.start();
    }

    // HTTP 服务器
    let state = AppState::new(
        job_store,
        job_queue,
        storage,
        engine,
        event_publisher,
        worker_stats,
        StateOptions {
            upload_policy: UploadPolicy {
                min_text_chars: config.upload.min_text_chars,
                max_text_chars: config.upload.max_text_chars,
                max_upload_bytes: config.upload.max_upload_bytes,
                languages: config.upload.enabled_languages(),
            },
            sync_wait_timeout: Duration::from_secs(config.clone.sync_wait_timeout_secs),
            base_url: config.server.public_base_url(),
        },
    );

    let server_config = ServerConfig {
        max_upload_bytes: config.upload.max_upload_bytes as usize,
        cors: config.server.cors,
        ..ServerConfig::new(&config.server.host, config.server.port)
    };
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
