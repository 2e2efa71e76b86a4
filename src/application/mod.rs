//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（JobStore、JobQueue、SynthesisEngine、JobStorage、AudioProbe）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    DeleteJob,
    SubmitClone,
    SubmitCloneResponse,
    UploadedAudio,
    // Handlers
    handlers::{
        CloneAndWaitHandler, DeleteJobHandler, JobHold, SubmitCloneHandler, UploadHandler,
        UploadPolicy, ValidatedUpload,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Audio probe
    AudioInfo,
    AudioProbeError,
    AudioProbePort,
    // Job queue
    JobQueuePort,
    QueueError,
    QueueSlot,
    // Job storage
    JobStorageError,
    JobStoragePort,
    StorageStats,
    // Job store
    CreatedJob,
    JobStats,
    JobStoreError,
    JobStorePort,
    // Synthesis engine
    SynthesisEnginePort,
    SynthesisError,
    SynthesisOutput,
    SynthesisRequest,
};

pub use queries::{
    GetHealth,
    GetJob,
    GetJobResult,
    HealthReport,
    JobList,
    JobResultFile,
    ListJobs,
    ListLanguages,
    // Handlers
    handlers::{
        GetHealthHandler, GetJobHandler, GetJobResultHandler, ListJobsHandler,
        ListLanguagesHandler,
    },
};
