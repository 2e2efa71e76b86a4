//! Engine Adapter - 声音克隆引擎实现

mod fake_engine;
mod http_engine;

pub use fake_engine::{
    silent_wav, FakeEngineMode, FakeSynthesisEngine, FakeSynthesisEngineConfig,
};
pub use http_engine::{HttpSynthesisEngine, HttpSynthesisEngineConfig};
