use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

/// Errors reported by a transport sink.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport no longer accepts messages.
    #[error("transport closed")]
    Closed,

    /// The transport refused the message.
    #[error("transport rejected message: {0}")]
    Rejected(String),

    /// An I/O error occurred while handing the message over.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sink for validated messages.
///
/// A sender calls [`Transport::accept`] at most once per successful send and
/// never for a rejected message. Implementations own their concurrency;
/// `accept` takes `&self` so one transport can serve concurrent senders.
pub trait Transport: Send + Sync {
    fn accept(&self, message: &str, value: &Value) -> Result<(), TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&str, &Value) -> Result<(), TransportError> + Send + Sync,
{
    fn accept(&self, message: &str, value: &Value) -> Result<(), TransportError> {
        self(message, value)
    }
}

/// A message as handed to a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outbound {
    #[serde(rename = "type")]
    pub message: String,
    pub payload: Value,
}

/// Transport that keeps every accepted message in memory.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Outbound>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<Outbound> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Transport for RecordingTransport {
    fn accept(&self, message: &str, value: &Value) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Outbound {
                message: message.to_string(),
                payload: value.clone(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn recording_transport_keeps_order() {
        let transport = RecordingTransport::new();
        assert!(transport.is_empty());

        transport.accept("join", &json!({ "id": "1" })).unwrap();
        transport.accept("leave", &json!({ "userId": "u" })).unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].message, "join");
        assert_eq!(sent[1].payload, json!({ "userId": "u" }));
    }

    #[test]
    fn closures_are_transports() {
        let refuse = |_: &str, _: &Value| -> Result<(), TransportError> {
            Err(TransportError::Rejected("queue full".into()))
        };
        assert!(matches!(
            refuse.accept("join", &json!({})),
            Err(TransportError::Rejected(_))
        ));
    }

    #[test]
    fn outbound_serializes_as_envelope() {
        let outbound = Outbound {
            message: "leave".into(),
            payload: json!({ "userId": "u" }),
        };
        assert_eq!(
            serde_json::to_value(&outbound).unwrap(),
            json!({ "type": "leave", "payload": { "userId": "u" } })
        );
    }
}
