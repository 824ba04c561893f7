use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing::{debug, warn};

use crate::{
    api::{SharedState, extract::LoggedinUser},
    notify::PushEvent,
};

pub async fn ws_handler(
    State(state): State<SharedState>,
    user: Option<LoggedinUser>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let user_id = user.map(|LoggedinUser(user)| user.id);
    let events = state.push.subscribe();

    upgrade.on_upgrade(move |socket| forward_events(socket, events, user_id))
}

/// Relays events addressed to `user_id` until either side goes away.
async fn forward_events(mut socket: WebSocket, mut events: Receiver<PushEvent>, user_id: Option<String>) {
    debug!(user_id = user_id.as_deref(), "push socket connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            event = events.recv() => match event {
                Ok(event) if event.is_for(user_id.as_deref()) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(error = %e, kind = %event.kind, "cannot encode push event");
                            continue;
                        }
                    };

                    if socket.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user_id = user_id.as_deref(), skipped, "push socket lagging, events skipped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    debug!(user_id = user_id.as_deref(), "push socket closed");
}
