use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Free-form status record for one agent. Replaced wholesale on every update.
pub type StatusRecord = Map<String, Value>;

pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentState {
    Idle,
    Busy,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InteractionKind {
    AgentRegistered,
    TaskStart,
    TaskComplete,
    TaskError,
    ChatRequest,
    ChatResponse,
    ChatError,
}

/// Keys owned by the typed fields; they never survive in the flattened payload.
const RESERVED_KEYS: [&str; 4] = ["id", "agent_id", "type", "timestamp"];

/// One observable event in the interaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default)]
    pub id: String,
    pub agent_id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Interaction {
    pub fn new(agent_id: impl Into<String>, kind: InteractionKind) -> Self {
        Self {
            id: String::new(),
            agent_id: agent_id.into(),
            kind,
            timestamp: None,
            payload: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn at(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Drop payload entries that would shadow the typed fields once flattened.
    pub fn strip_reserved(&mut self) {
        self.payload.retain(|key, _| {
            let reserved = RESERVED_KEYS.contains(&key.as_str());
            if reserved {
                log::debug!("Ignoring reserved payload key '{}' on {} interaction", key, self.kind);
            }
            !reserved
        });
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub agents: BTreeMap<String, StatusRecord>,
    pub interactions: Vec<Interaction>,
}

/// Messages pushed from the server to websocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    InitialState {
        data: Snapshot,
    },
    Heartbeat {
        timestamp: String,
    },
    AgentUpdate {
        agent_id: String,
        data: StatusRecord,
    },
    NewInteraction {
        data: Interaction,
    },
    Pong,
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitialState { .. } => "initial_state",
            Self::Heartbeat { .. } => "heartbeat",
            Self::AgentUpdate { .. } => "agent_update",
            Self::NewInteraction { .. } => "new_interaction",
            Self::Pong => "pong",
        }
    }
}

/// Messages accepted from websocket clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    Subscribe {
        #[serde(default)]
        agents: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interaction_flattens_payload() {
        let interaction = Interaction::new("search", InteractionKind::TaskStart)
            .with("task", "lookup")
            .at("2025-01-01T00:00:00+00:00");
        let value = serde_json::to_value(&interaction).unwrap();
        assert_eq!(value["type"], "task_start");
        assert_eq!(value["task"], "lookup");
        assert_eq!(value["agent_id"], "search");
    }

    #[test]
    fn reserved_payload_keys_are_stripped() {
        let mut interaction = Interaction::new("search", InteractionKind::TaskStart)
            .with("id", "forged")
            .with("type", "chat_error")
            .with("agent_id", "other")
            .with("timestamp", "yesterday")
            .with("task", "lookup");
        interaction.strip_reserved();
        assert_eq!(interaction.payload.len(), 1);
        assert_eq!(interaction.payload["task"], "lookup");
    }

    #[test]
    fn server_event_tags() {
        let value = serde_json::to_value(ServerEvent::Pong).unwrap();
        assert_eq!(value, json!({"type": "pong"}));

        let value = serde_json::to_value(ServerEvent::Heartbeat { timestamp: "t".into() }).unwrap();
        assert_eq!(value, json!({"type": "heartbeat", "timestamp": "t"}));
    }

    #[test]
    fn client_message_parsing() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"subscribe"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Subscribe { agents: vec![] });

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"dance"}"#).is_err());
    }

    #[test]
    fn agent_state_names() {
        assert_eq!(AgentState::Busy.to_string(), "busy");
        assert_eq!(InteractionKind::ChatError.to_string(), "chat_error");
    }
}
