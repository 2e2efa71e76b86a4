//! VoxClone - 语音克隆异步任务服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Job: 克隆任务聚合根与状态机
//! - Language: 支持的合成语言
//!
//! 应用层 (application/):
//! - Ports: 端口定义（JobStore, JobQueue, JobStorage, SynthesisEngine, AudioProbe）
//! - Commands: 上传校验、提交任务、同步等待、删除任务
//! - Queries: 任务状态、结果、健康检查、语言列表
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: 任务表与有界队列
//! - Worker: 克隆 Worker 池与过期清理
//! - Adapters: 合成引擎客户端、文件存储、音频探测
//! - Events: 任务事件广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
