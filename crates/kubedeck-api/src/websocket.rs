use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use tokio::time::{self, Instant, MissedTickBehavior};

use kubedeck_logs::LogStream;
use kubedeck_types::StreamFrame;

use crate::handlers::LogsQuery;
use crate::state::AppState;

/// GET /ws
///
/// Pushes `{"type":"update","data":{...}}` count frames on a fixed
/// interval. Refresh failures become error frames and the connection
/// stays open for the next tick.
pub async fn cluster_updates(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| update_loop(socket, state))
}

async fn update_loop(mut socket: WebSocket, state: AppState) {
    let kube = match state.kube() {
        Ok(kube) => kube.clone(),
        Err(e) => {
            // One error frame, then drop the connection
            let _ = send_frame(&mut socket, &StreamFrame::error(e.message())).await;
            return;
        }
    };

    let mut ticker = update_ticker(state.settings().update_interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = match kube.cluster_counts().await {
                    Ok(counts) => StreamFrame::update(counts),
                    Err(e) => {
                        tracing::warn!("Cluster count refresh failed: {e:#}");
                        StreamFrame::error(format!("{e:#}"))
                    }
                };
                if send_frame(&mut socket, &frame).await.is_err() {
                    break;
                }
            }
            message = socket.recv() => {
                match message {
                    // Clients do not speak on this channel
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// The first frame goes out one full period after connect. Ticks that
/// fall behind are delayed, not bursted.
fn update_ticker(period: Duration) -> time::Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// GET /api/pods/{namespace}/{name}/logs/stream
///
/// Follows one pod's logs over a WebSocket, one
/// `{"type":"log","data":{...}}` frame per line.
pub async fn pod_log_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
    Query(query): Query<LogsQuery>,
) -> Response {
    ws.on_upgrade(move |socket| log_stream_loop(socket, state, namespace, name, query))
}

async fn log_stream_loop(
    mut socket: WebSocket,
    state: AppState,
    namespace: String,
    name: String,
    query: LogsQuery,
) {
    let kube = match state.kube() {
        Ok(kube) => kube.clone(),
        Err(e) => {
            let _ = send_frame(&mut socket, &StreamFrame::error(e.message())).await;
            return;
        }
    };
    let filter = match query.filter() {
        Ok(filter) => filter,
        Err(e) => {
            let _ = send_frame(&mut socket, &StreamFrame::error(e.message())).await;
            return;
        }
    };

    let options = query.options(state.settings().tail_lines);
    let mut stream = LogStream::spawn(kube.inner().clone(), &namespace, &name, options, filter);

    loop {
        tokio::select! {
            entry = stream.recv() => {
                match entry {
                    Some(Ok(entry)) => {
                        if send_frame(&mut socket, &StreamFrame::log(entry)).await.is_err() {
                            break;
                        }
                    }
                    // Open or read failure, reported before closing
                    Some(Err(e)) => {
                        let frame = StreamFrame::error(format!("{e:#}"));
                        let _ = send_frame(&mut socket, &frame).await;
                        break;
                    }
                    // Pod gone or the follow stream closed upstream
                    None => break,
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &StreamFrame) -> Result<(), axum::Error> {
    let payload = serde_json::to_string(frame).unwrap_or_default();
    socket.send(Message::Text(payload.into())).await
}
