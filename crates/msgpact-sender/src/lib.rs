//! Direction-bound senders.
//!
//! A [`Sender`] is tied to exactly one direction contract. Every call is
//! validated against that contract before the message reaches the
//! [`Transport`], and a rejected message never reaches it.

pub mod error;
pub mod sender;
pub mod transport;

pub use error::{Result, SendError};
pub use sender::Sender;
pub use transport::{Outbound, RecordingTransport, Transport, TransportError};
