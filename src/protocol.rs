//! Hooks-handler wire protocol.
//!
//! Every message is a single JSON object followed by `\n`. The handler
//! answers each message with the same `uuid` and `event` and the
//! (possibly modified) `data`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::hooks::HookEvent;

/// Message delimiter.
pub const DELIMITER: u8 = b'\n';

/// A single protocol message, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookMessage {
    /// Correlation id chosen by the runner.
    pub uuid: String,
    pub event: HookEvent,
    /// One transaction, or a list of them for suite-level events.
    #[serde(default)]
    pub data: Value,
}

impl HookMessage {
    /// Decodes one line, without its delimiter.
    pub fn decode(line: &str) -> Result<Self> {
        serde_json::from_str(line.trim())
            .map_err(|e| Error::Protocol(format!("malformed message: {}", e)))
    }

    /// Encodes the message as one delimited line.
    ///
    /// Compact JSON escapes newlines inside strings, so the only raw `\n`
    /// is the delimiter.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(DELIMITER);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_runner_message() {
        let line = r#"{"uuid":"1234-abcd","event":"beforeEach","data":{"name":"Health > /__gtg"}}"#;
        let message = HookMessage::decode(line).unwrap();
        assert_eq!(message.uuid, "1234-abcd");
        assert_eq!(message.event, HookEvent::BeforeEach);
        assert_eq!(message.data["name"], "Health > /__gtg");
    }

    #[test]
    fn encoded_message_is_a_single_line() {
        let message = HookMessage {
            uuid: "u".to_string(),
            event: HookEvent::BeforeEach,
            data: json!({ "name": "multi\nline", "request": { "body": "a\nb" } }),
        };
        let bytes = message.encode().unwrap();

        assert_eq!(bytes.last(), Some(&DELIMITER));
        assert_eq!(bytes.iter().filter(|b| **b == DELIMITER).count(), 1);

        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(HookMessage::decode(&text).unwrap(), message);
    }

    #[test]
    fn rejects_unknown_event() {
        let err = HookMessage::decode(r#"{"uuid":"x","event":"beforeLunch","data":{}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            HookMessage::decode("not json").unwrap_err(),
            Error::Protocol(_)
        ));
    }
}
