//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod engine;
pub mod probe;
pub mod storage;

pub use engine::*;
pub use probe::*;
pub use storage::*;
