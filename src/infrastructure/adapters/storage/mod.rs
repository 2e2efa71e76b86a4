//! Storage Adapter - 任务文件存储

mod file_storage;

pub use file_storage::FileJobStorage;
