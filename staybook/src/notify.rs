//! Best-effort event push to connected websocket clients.
//!
//! Handlers enqueue a [`PushEvent`] on the [`PushHub`] once their response is ready; each
//! websocket task holds a receiver and forwards the events addressed to its user.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

/// Who an event is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    User(String),
    /// Every connection except the one belonging to `except`, if given.
    Everyone { except: Option<String> },
}

#[derive(Debug, Clone, Serialize)]
pub struct PushEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
    #[serde(skip)]
    pub target: Target,
}

impl PushEvent {
    /// Whether a connection authenticated as `user_id` should receive this event.
    pub fn is_for(&self, user_id: Option<&str>) -> bool {
        match &self.target {
            Target::User(target) => user_id == Some(target.as_str()),
            Target::Everyone { except: Some(except) } => user_id != Some(except.as_str()),
            Target::Everyone { except: None } => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushHub {
    sender: broadcast::Sender<PushEvent>,
}

impl PushHub {
    /// Creates a hub buffering up to `capacity` events per lagging receiver.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.sender.subscribe()
    }

    /// Sends an event to every connection of `user_id`.
    pub fn emit_to_user(&self, kind: &str, data: impl Serialize, user_id: &str) {
        self.send(kind, data, Target::User(user_id.to_string()));
    }

    /// Sends an event to all connections, skipping those of `except`.
    pub fn broadcast(&self, kind: &str, data: impl Serialize, except: Option<&str>) {
        self.send(kind, data, Target::Everyone { except: except.map(str::to_string) });
    }

    fn send(&self, kind: &str, data: impl Serialize, target: Target) {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(e) => {
                debug!(kind, error = %e, "push payload not serializable, dropped");
                return;
            }
        };

        let event = PushEvent { kind: kind.to_string(), data, target };
        if self.sender.send(event).is_err() {
            debug!(kind, "no push subscribers");
        }
    }
}
