use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::AppState;
use crate::session::{ClientMessage, ServerMessage, Session, SessionInput};

/// GET /ws/transcribe-translate
/// Upgrade to a WebSocket and run a streaming session over it
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Bridge a WebSocket onto the session driver: one reader loop parsing text
/// frames into client messages, one writer task serializing responses. The
/// single writer is what guarantees per-session response ordering.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    let (inbound_tx, inbound_rx) = mpsc::channel::<SessionInput>(64);
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerMessage>(64);

    let session = Session::new(state.dispatcher.clone(), state.stream.clone(), outbound_tx);
    let session_id = session.id().to_string();
    info!("WebSocket connected, starting {}", session_id);

    let session_task = tokio::spawn(session.run(inbound_rx));

    let writer_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let frame = match serde_json::to_string(&msg) {
                Ok(text) => Message::Text(text),
                Err(e) => {
                    warn!("Failed to serialize response: {}", e);
                    continue;
                }
            };
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                // Parse failures are forwarded as session input, not sent
                // to the client directly, so the resulting error keeps its
                // place in the per-session response order.
                let input = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => SessionInput::Message(msg),
                    Err(e) => {
                        debug!("{}: unparseable frame: {}", session_id, e);
                        SessionInput::Malformed(format!("invalid message: {}", e))
                    }
                };
                let closing = matches!(input, SessionInput::Message(ClientMessage::Close));
                if inbound_tx.send(input).await.is_err() || closing {
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            // Pings are answered by axum; binary frames are not part of the
            // protocol (audio travels base64 inside text frames).
            Ok(_) => {}
        }
    }

    // Dropping the inbound sender stops the session loop, which drops the
    // last outbound sender and lets the writer drain and exit.
    drop(inbound_tx);

    if let Err(e) = session_task.await {
        warn!("{}: session task panicked: {}", session_id, e);
    }
    let _ = writer_task.await;

    info!("WebSocket disconnected ({})", session_id);
}
