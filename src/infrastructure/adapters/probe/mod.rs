//! Probe Adapter - 音频探测

mod symphonia_probe;

pub use symphonia_probe::SymphoniaProbe;
