//! Worker Pool Stats - worker 池运行指标

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 实时率滑动窗口大小
const RTF_WINDOW: usize = 5;

/// Worker 池运行指标
#[derive(Debug)]
pub struct WorkerPoolStats {
    pool_size: usize,
    busy: AtomicUsize,
    /// 最近几次成功合成的实时率
    rtf_history: Mutex<VecDeque<f64>>,
}

impl WorkerPoolStats {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            busy: AtomicUsize::new(0),
            rtf_history: Mutex::new(VecDeque::with_capacity(RTF_WINDOW)),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// 正在处理任务的 worker 数
    pub fn busy(&self) -> usize {
        self.busy.load(Ordering::Relaxed)
    }

    /// 标记一个 worker 开始处理，返回的守卫释放时自动复位
    pub fn track_busy(&self) -> BusyGuard<'_> {
        self.busy.fetch_add(1, Ordering::Relaxed);
        BusyGuard { stats: self }
    }

    /// 记录一次合成的实时率；音频时长为 0 时忽略
    pub fn record_rtf(&self, processing_ms: u64, audio_ms: u64) {
        if audio_ms == 0 {
            return;
        }

        let rtf = processing_ms as f64 / audio_ms as f64;
        let mut history = self.rtf_history.lock().unwrap_or_else(|e| e.into_inner());
        if history.len() == RTF_WINDOW {
            history.pop_front();
        }
        history.push_back(rtf);
    }

    /// 滑动窗口内的平均实时率
    pub fn average_rtf(&self) -> Option<f64> {
        let history = self.rtf_history.lock().unwrap_or_else(|e| e.into_inner());
        if history.is_empty() {
            return None;
        }
        Some(history.iter().sum::<f64>() / history.len() as f64)
    }
}

pub struct BusyGuard<'a> {
    stats: &'a WorkerPoolStats,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.stats.busy.fetch_sub(1, Ordering::Relaxed);
    }
}
