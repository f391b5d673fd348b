//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{ArenaHandle, ArenaSession};
use crate::util::rate_limit::InputThrottle;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Host one arena for the lifetime of the connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let arena_id = Uuid::new_v4();
    let seed: u64 = rand::random();
    info!(arena_id = %arena_id, seed, "New WebSocket connection");

    let (session, handle) = ArenaSession::new(arena_id, seed, state.clock.clone());
    // Subscribe before the loop starts so the first snapshot is not missed
    let snapshot_rx = handle.snapshot_tx.subscribe();
    state.arena_registry.insert(handle.clone());
    let session_task = tokio::spawn(session.run());

    let (mut ws_sink, ws_stream) = socket.split();

    let welcome = ServerMsg::Welcome {
        arena_id,
        seed,
        server_time: unix_millis(),
    };

    if let Err(e) = send_msg(&mut ws_sink, &welcome).await {
        error!(arena_id = %arena_id, error = %e, "Failed to send welcome");
        drop(handle);
    } else {
        run_session(handle, ws_sink, ws_stream, snapshot_rx).await;
    }

    // Dropping the registry's sender stops the session loop
    state.arena_registry.remove(&arena_id);
    if let Err(e) = session_task.await {
        error!(arena_id = %arena_id, error = %e, "Arena session task failed");
    }

    info!(arena_id = %arena_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    handle: ArenaHandle,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut snapshot_rx: broadcast::Receiver<ServerMsg>,
) {
    let arena_id = handle.id;
    let throttle = InputThrottle::new();

    // Writer task: session broadcasts -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            match snapshot_rx.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(arena_id = %arena_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        arena_id = %arena_id,
                        lagged_count = n,
                        "Client lagged, skipping {} snapshots", n
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(arena_id = %arena_id, "Snapshot channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> session
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !throttle.admit() {
                    warn!(arena_id = %arena_id, dropped = throttle.dropped(), "Throttled input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        if handle.input_tx.send(msg).await.is_err() {
                            debug!(arena_id = %arena_id, "Input channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(arena_id = %arena_id, error = %e, "Failed to parse client message");
                        let _ = handle.snapshot_tx.send(ServerMsg::Error {
                            code: "bad_message".to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(arena_id = %arena_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(arena_id = %arena_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(arena_id = %arena_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();

    if throttle.dropped() > 0 {
        info!(arena_id = %arena_id, dropped = throttle.dropped(), "Throttled inputs this session");
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
