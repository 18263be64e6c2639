use msgpact_contract::ContractError;
use msgpact_schema::Violation;

use crate::transport::TransportError;

/// Errors that can occur when sending a message.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The message is unknown for the direction or its payload is invalid.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// The transport refused a validated message.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A typed message could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SendError {
    /// The payload violation, when validation rejected the message.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            SendError::Contract(err) => err.violation(),
            _ => None,
        }
    }

    /// True when the message name is not part of the sender's direction.
    pub fn is_unknown_message(&self) -> bool {
        matches!(
            self,
            SendError::Contract(ContractError::UnknownMessage { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, SendError>;
