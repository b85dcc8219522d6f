use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A text message extracted from a WhatsApp Cloud API webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppMessage {
    pub from_number: String,
    pub message_id: String,
    pub timestamp: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookReply {
    pub to: String,
    pub body: String,
}

impl WhatsAppMessage {
    /// `None` for status callbacks and non-text messages.
    pub fn from_webhook(payload: &Value) -> Option<Self> {
        let message = payload
            .pointer("/entry/0/changes/0/value/messages/0")?;
        let field = |path: &str| message.pointer(path).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            from_number: field("/from")?,
            message_id: field("/id")?,
            timestamp: field("/timestamp")?,
            text: field("/text/body")?,
        })
    }

    pub fn reply(&self, body: impl Into<String>) -> WebhookReply {
        WebhookReply {
            to: self.from_number.clone(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn webhook(message: Value) -> Value {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {"messages": [message]}}]}]
        })
    }

    #[test]
    fn parses_text_message() {
        let payload = webhook(json!({
            "from": "33612345678",
            "id": "wamid.1",
            "timestamp": "1700000000",
            "text": {"body": "Bonjour"}
        }));
        let message = WhatsAppMessage::from_webhook(&payload).unwrap();
        assert_eq!(message.from_number, "33612345678");
        assert_eq!(message.text, "Bonjour");

        let reply = message.reply("Salut");
        assert_eq!(reply.to, "33612345678");
    }

    #[test]
    fn ignores_non_text_and_status_payloads() {
        let image = webhook(json!({
            "from": "1", "id": "2", "timestamp": "3", "image": {"id": "x"}
        }));
        assert!(WhatsAppMessage::from_webhook(&image).is_none());

        let status = json!({"entry": [{"changes": [{"value": {"statuses": []}}]}]});
        assert!(WhatsAppMessage::from_webhook(&status).is_none());
        assert!(WhatsAppMessage::from_webhook(&json!({})).is_none());
    }
}
