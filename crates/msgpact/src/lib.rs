//! Direction-typed message contracts for bidirectional channels.
//!
//! Declare every message once, with an optional to-host and an optional
//! to-peer body. The registry derives one contract per direction, and a
//! sender bound to a direction validates every message against its own
//! contract before handing it to a transport.
//!
//! # Crate Structure
//!
//! - [`schema`]: schema nodes, leaf validators, shape inference, runtime validation
//! - [`contract`]: directions, declarations, the registry and its projection
//! - [`sender`]: direction-bound senders and the transport boundary

/// Re-export schema types.
pub mod schema {
    pub use msgpact_schema::*;
}

/// Re-export contract types.
pub mod contract {
    pub use msgpact_contract::*;
}

/// Re-export sender types.
pub mod sender {
    pub use msgpact_sender::*;
}
