use std::fmt;
use std::sync::Arc;

use msgpact_contract::{
    Contracts, Direction, DirectionContract, DirectionKind, Message, ToHost, ToPeer, Validated,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::transport::Transport;

/// Sends messages in one direction, validating each one first.
///
/// The direction is part of the type, so a typed message can only be sent
/// through a sender of its own direction:
///
/// ```compile_fail
/// use msgpact_contract::{MessageDeclaration, MessageRegistry, Message, ToHost};
/// use msgpact_schema::Branch;
/// use msgpact_sender::{RecordingTransport, Sender};
///
/// #[derive(serde::Serialize)]
/// struct Leave {}
///
/// impl Message for Leave {
///     type Direction = ToHost;
///     const NAME: &'static str = "leave";
/// }
///
/// let registry = MessageRegistry::new([MessageDeclaration::new("leave").to_host(Branch::new())]).unwrap();
/// let contracts = registry.project();
/// let to_peer = Sender::to_peer(&contracts, RecordingTransport::new());
/// // A to-host message cannot go through a to-peer sender.
/// to_peer.send_message(&Leave {});
/// ```
pub struct Sender<D: Direction, T> {
    contract: Arc<DirectionContract<D>>,
    transport: T,
}

impl<D: Direction, T: Transport> Sender<D, T> {
    /// Bind a sender to a contract and a transport.
    pub fn new(contract: Arc<DirectionContract<D>>, transport: T) -> Self {
        Self {
            contract,
            transport,
        }
    }

    /// Validate `payload` as `message` and hand it to the transport.
    ///
    /// Unknown names and invalid payloads are returned as errors and never
    /// reach the transport.
    pub fn send(&self, message: &str, payload: &Value) -> Result<Validated<D>> {
        let validated = match self.contract.validate(message, payload) {
            Ok(validated) => validated,
            Err(err) => {
                warn!(
                    direction = %D::KIND,
                    message,
                    error = %err,
                    "rejecting outbound message"
                );
                return Err(err.into());
            }
        };

        self.transport
            .accept(validated.message(), validated.value())?;
        debug!(direction = %D::KIND, message, "message handed to transport");
        Ok(validated)
    }

    /// Send a typed message of this sender's direction.
    pub fn send_message<M>(&self, message: &M) -> Result<Validated<D>>
    where
        M: Message<Direction = D>,
    {
        let payload = serde_json::to_value(message)?;
        self.send(M::NAME, &payload)
    }

    /// Direction this sender is bound to.
    pub fn direction(&self) -> DirectionKind {
        D::KIND
    }

    /// The bound contract.
    pub fn contract(&self) -> &DirectionContract<D> {
        &self.contract
    }

    /// The transport validated messages are handed to.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Sender<ToHost, T> {
    /// Sender for messages the peer sends to the host.
    pub fn to_host(contracts: &Contracts, transport: T) -> Self {
        Self::new(Arc::clone(&contracts.to_host), transport)
    }
}

impl<T: Transport> Sender<ToPeer, T> {
    /// Sender for messages the host sends to the peer.
    pub fn to_peer(contracts: &Contracts, transport: T) -> Self {
        Self::new(Arc::clone(&contracts.to_peer), transport)
    }
}

impl<D: Direction, T> fmt::Debug for Sender<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("direction", &D::KIND)
            .field("messages", &self.contract.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use msgpact_contract::{ContractError, MessageDeclaration, MessageRegistry};
    use msgpact_schema::leaf::string;
    use msgpact_schema::Branch;
    use serde::Serialize;
    use serde_json::json;

    use super::*;
    use crate::error::SendError;
    use crate::transport::{RecordingTransport, TransportError};

    fn contracts() -> Contracts {
        MessageRegistry::new([
            MessageDeclaration::new("leave")
                .to_host(Branch::new().field("userId", string().unwrap())),
            MessageDeclaration::new("kick")
                .to_peer(Branch::new().field("reason", string().unwrap())),
        ])
        .unwrap()
        .project()
    }

    #[derive(Serialize)]
    struct Leave {
        #[serde(rename = "userId")]
        user_id: String,
    }

    impl Message for Leave {
        type Direction = ToHost;
        const NAME: &'static str = "leave";
    }

    #[test]
    fn valid_message_reaches_transport_once() {
        let sender = Sender::to_host(&contracts(), RecordingTransport::new());

        let validated = sender.send("leave", &json!({ "userId": "u1" })).unwrap();
        assert_eq!(validated.value(), &json!({ "userId": "u1" }));
        assert_eq!(sender.transport().len(), 1);
        assert_eq!(sender.transport().sent()[0].message, "leave");
    }

    #[test]
    fn invalid_message_never_reaches_transport() {
        let sender = Sender::to_host(&contracts(), RecordingTransport::new());

        let err = sender.send("leave", &json!({ "userId": 5 })).unwrap_err();
        assert_eq!(err.violation().unwrap().path.to_string(), "userId");
        assert!(sender.transport().is_empty());
    }

    #[test]
    fn unknown_message_for_direction() {
        let sender = Sender::to_host(&contracts(), RecordingTransport::new());

        let err = sender.send("kick", &json!({ "reason": "spam" })).unwrap_err();
        assert!(err.is_unknown_message());
        assert!(matches!(
            err,
            SendError::Contract(ContractError::UnknownMessage {
                direction: DirectionKind::ToHost,
                ..
            })
        ));
        assert!(sender.transport().is_empty());
    }

    #[test]
    fn typed_message_is_serialized_and_checked() {
        let sender = Sender::to_host(&contracts(), RecordingTransport::new());

        let validated = sender
            .send_message(&Leave {
                user_id: "u2".into(),
            })
            .unwrap();
        assert_eq!(validated.message(), "leave");
        assert_eq!(sender.direction(), DirectionKind::ToHost);
    }

    #[test]
    fn transport_failure_is_reported() {
        let calls = AtomicUsize::new(0);
        let sender = Sender::to_peer(&contracts(), |_: &str, _: &Value| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TransportError::Closed)
        });

        let err = sender.send("kick", &json!({ "reason": "spam" })).unwrap_err();
        assert!(matches!(err, SendError::Transport(TransportError::Closed)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
