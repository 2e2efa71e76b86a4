//! Bounded Job Queue Implementation

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::application::ports::{JobQueuePort, QueueError, QueueSlot};
use crate::domain::JobId;

/// 基于 tokio mpsc 的有界 FIFO 队列
///
/// 预留位置使用 `OwnedPermit`，投递时不会再失败
pub struct BoundedJobQueue {
    sender: mpsc::Sender<JobId>,
}

impl BoundedJobQueue {
    /// 创建队列，返回接收端供 worker 池消费
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<JobId>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl JobQueuePort for BoundedJobQueue {
    fn try_reserve(&self) -> Result<QueueSlot, QueueError> {
        let permit = self
            .sender
            .clone()
            .try_reserve_owned()
            .map_err(|e| match e {
                TrySendError::Full(_) => QueueError::Full {
                    capacity: self.sender.max_capacity(),
                },
                TrySendError::Closed(_) => QueueError::Closed,
            })?;

        Ok(QueueSlot::new(move |job_id| {
            permit.send(job_id);
            tracing::debug!(job_id = %job_id, "Job enqueued");
        }))
    }

    fn depth(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let (queue, mut rx) = BoundedJobQueue::new(4);
        let ids: Vec<JobId> = (0..3).map(|_| JobId::new()).collect();

        for id in &ids {
            queue.try_reserve().unwrap().dispatch(*id);
        }
        assert_eq!(queue.depth(), 3);

        for id in &ids {
            assert_eq!(rx.recv().await, Some(*id));
        }
        assert_eq!(queue.depth(), 0);
    }

    #[tokio::test]
    async fn test_full_queue_rejects() {
        let (queue, _rx) = BoundedJobQueue::new(2);
        let _a = queue.try_reserve().unwrap();
        let _b = queue.try_reserve().unwrap();

        let result = queue.try_reserve();
        assert!(matches!(result, Err(QueueError::Full { capacity: 2 })));
        assert_eq!(queue.depth(), 2);
        assert_eq!(queue.capacity(), 2);
    }

    #[tokio::test]
    async fn test_dropped_slot_releases_capacity() {
        let (queue, _rx) = BoundedJobQueue::new(1);
        let slot = queue.try_reserve().unwrap();
        assert!(queue.try_reserve().is_err());

        drop(slot);
        assert!(queue.try_reserve().is_ok());
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (queue, rx) = BoundedJobQueue::new(1);
        drop(rx);
        assert!(matches!(queue.try_reserve(), Err(QueueError::Closed)));
    }
}
