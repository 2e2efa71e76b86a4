//! HTTP Handlers

mod clone;
mod health;
mod jobs;
mod languages;
mod websocket;

pub use clone::*;
pub use health::*;
pub use jobs::*;
pub use languages::*;
pub use websocket::*;
