//! Transaction model shared with the test runner.
//!
//! Only the fields the hooks touch are typed. Everything else the runner
//! sends is kept in `extra` so it goes back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request half of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Request body sent to the API under test.
    #[serde(default)]
    pub body: String,

    /// Method, uri, headers and whatever else the runner provides.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single request/response exchange owned by the runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Display name, e.g. `Health > /__gtg > Good to go > 200`.
    pub name: String,

    /// Whether the runner should skip this transaction.
    #[serde(default)]
    pub skip: bool,

    #[serde(default)]
    pub request: Request,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// Creates a transaction with the given display name and an empty request.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the skip flag.
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.request.body = body.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transaction_keeps_unknown_fields() {
        let raw = json!({
            "name": "Health > /__gtg > 200",
            "host": "localhost",
            "port": "8080",
            "skip": false,
            "request": {
                "method": "GET",
                "uri": "/__gtg",
                "headers": {},
                "body": ""
            },
            "expected": { "statusCode": "200" }
        });

        let transaction: Transaction = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(transaction.name, "Health > /__gtg > 200");
        assert_eq!(transaction.request.extra["method"], "GET");
        assert_eq!(transaction.extra["expected"]["statusCode"], "200");

        let back = serde_json::to_value(&transaction).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn transaction_defaults_missing_fields() {
        let transaction: Transaction =
            serde_json::from_value(json!({ "name": "Other > endpoint" })).unwrap();
        assert!(!transaction.skip);
        assert!(transaction.request.body.is_empty());
        assert!(transaction.extra.is_empty());
    }
}
