//! WebSocket Handler - 任务状态推送

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::JobId;
use crate::infrastructure::events::JobEvent;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobEventsParams {
    /// 只推送该任务的事件
    pub job_id: Option<JobId>,
}

/// 任务事件 WebSocket
pub async fn job_events_websocket(
    ws: WebSocketUpgrade,
    Query(params): Query<JobEventsParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_job_socket(socket, params.job_id, state))
}

async fn handle_job_socket(socket: WebSocket, filter: Option<JobId>, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 先订阅，再发送当前快照，避免漏掉中间的状态变更
    let mut event_rx = state.event_publisher.subscribe();

    tracing::info!(job_id = ?filter, "Job WebSocket connected");

    if let Some(job_id) = filter {
        if let Ok(job) = state.job_store.get(job_id) {
            let snapshot = JobEvent::JobStatusChanged {
                job_id,
                status: job.status(),
                duration_ms: job.result().and_then(|r| r.duration_ms),
                error: job.error().cloned(),
            };
            if let Ok(json) = serde_json::to_string(&snapshot) {
                if sender.send(Message::Text(json)).await.is_err() {
                    return;
                }
            }
        }
    }

    // 事件转发任务
    let forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped = skipped, "Job WebSocket lagged behind");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if filter.map_or(false, |id| id != event.job_id()) {
                continue;
            }

            let msg = match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Job WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Job WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!(job_id = ?filter, "Job WebSocket disconnected");
}
