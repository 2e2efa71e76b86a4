//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_probe;
mod job_queue;
mod job_storage;
mod job_store;
mod synthesis_engine;

pub use audio_probe::{AudioInfo, AudioProbeError, AudioProbePort};
pub use job_queue::{JobQueuePort, QueueError, QueueSlot};
pub use job_storage::{JobStorageError, JobStoragePort, StorageStats};
pub use job_store::{CreatedJob, JobStats, JobStoreError, JobStorePort};
pub use synthesis_engine::{
    SynthesisEnginePort, SynthesisError, SynthesisOutput, SynthesisRequest,
};
