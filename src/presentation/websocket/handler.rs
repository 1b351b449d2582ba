//! WebSocket Connection Handler
//!
//! One task per connection. It owns the socket sink, so status, broadcast and
//! reply events are written from a single place; frames go to the
//! connection's frame lane so a slow detection never stalls the read loop.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use uuid::Uuid;

use super::messages::ClientEvent;
use crate::application::dto::{AdminFramesPayload, ServerEvent};
use crate::application::services::{FrameLane, FramePipeline, Subscription};
use crate::startup::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let limits = &state.settings.websocket;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Result of one turn of the connection loop
enum Turn {
    Inbound(Option<Result<Message, axum::Error>>),
    Broadcast(Option<Arc<ServerEvent>>),
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4().to_string();
    let (sender, receiver) = socket.split();
    serve_connection(state, client_id, sender, receiver).await;
}

/// Run one connection until its inbound stream ends.
///
/// Registers the session, acknowledges with a `status` event, then serves
/// inbound events and admin broadcasts. The session is removed on exit.
pub async fn serve_connection<Tx, Rx>(state: AppState, client_id: String, mut sender: Tx, mut receiver: Rx)
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let pipeline = state.pipeline.clone();

    pipeline.open_session(&client_id);
    tracing::info!(client_id = %client_id, "Client connected");

    if let Err(e) = send_event(&mut sender, &ServerEvent::connected(&client_id)).await {
        tracing::debug!(client_id = %client_id, error = %e, "Failed to send status");
        pipeline.close_session(&client_id);
        return;
    }

    let (lane, _worker) = pipeline.open_lane(&client_id, state.settings.detection.pending_frames);
    let mut subscription: Option<Subscription> = None;

    loop {
        let turn = tokio::select! {
            msg = receiver.next() => Turn::Inbound(msg),
            event = next_broadcast(&mut subscription) => Turn::Broadcast(event),
        };

        match turn {
            Turn::Inbound(Some(Ok(Message::Text(text)))) => {
                let reply = handle_message(text.as_str(), &client_id, &pipeline, &lane, &mut subscription);
                if let Some(reply) = reply {
                    if let Err(e) = send_event(&mut sender, &reply).await {
                        tracing::debug!(client_id = %client_id, error = %e, "Failed to send reply");
                        break;
                    }
                }
            }
            Turn::Inbound(Some(Ok(Message::Close(_)))) | Turn::Inbound(None) => {
                tracing::debug!(client_id = %client_id, "Connection closed");
                break;
            }
            Turn::Inbound(Some(Err(e))) => {
                tracing::debug!(client_id = %client_id, error = %e, "WebSocket error");
                break;
            }
            // Ping/pong are handled by axum; binary frames are not part of the protocol
            Turn::Inbound(Some(Ok(_))) => {}
            Turn::Broadcast(Some(event)) => {
                if let Err(e) = send_event(&mut sender, &event).await {
                    tracing::debug!(client_id = %client_id, error = %e, "Failed to deliver broadcast");
                    break;
                }
            }
            Turn::Broadcast(None) => {
                // The relay dropped this subscriber
                subscription = None;
            }
        }
    }

    // Queued frames left in the lane are discarded once the session is gone.
    pipeline.close_session(&client_id);
    tracing::info!(client_id = %client_id, "Client disconnected");
}

/// Next event for an admin; pending forever when not subscribed.
async fn next_broadcast(subscription: &mut Option<Subscription>) -> Option<Arc<ServerEvent>> {
    match subscription {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Handle incoming WebSocket message. Returns an event to send back to this
/// connection only.
fn handle_message(
    text: &str,
    client_id: &str,
    pipeline: &Arc<FramePipeline>,
    lane: &FrameLane,
    subscription: &mut Option<Subscription>,
) -> Option<ServerEvent> {
    let event = match ClientEvent::parse(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(client_id = %client_id, error = %e, "Malformed message ignored");
            return None;
        }
    };

    match event {
        ClientEvent::Frame(Some(frame)) => {
            lane.submit(frame, Instant::now());
        }
        ClientEvent::Frame(None) => {
            tracing::warn!(client_id = %client_id, "Frame event without frame data");
        }
        ClientEvent::JoinAdmin => {
            if subscription.is_none() {
                *subscription = pipeline.relay().subscribe(client_id);
            }
        }
        ClientEvent::LeaveAdmin => {
            pipeline.relay().unsubscribe(client_id);
            *subscription = None;
        }
        ClientEvent::RequestAdminFrames => {
            let frames = pipeline.registry().latest_frames();
            return Some(ServerEvent::AdminFrames(AdminFramesPayload { frames }));
        }
        ClientEvent::Unknown(name) => {
            tracing::debug!(client_id = %client_id, event = %name, "Unknown event ignored");
        }
    }
    None
}

/// Serialize and send one event.
async fn send_event<Tx>(sender: &mut Tx, event: &ServerEvent) -> Result<(), Tx::Error>
where
    Tx: Sink<Message> + Unpin,
{
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(event = event.event_name(), error = %e, "Failed to serialize event");
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await
}
