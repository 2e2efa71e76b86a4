//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod clone_handlers;
mod upload_handler;

pub use clone_handlers::*;
pub use upload_handler::*;
