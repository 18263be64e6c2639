//! Direction-typed message contracts.
//!
//! Every message that may cross the channel is declared once, as a
//! [`MessageDeclaration`] with an optional to-host and an optional to-peer
//! body. A [`MessageRegistry`] checks the whole declaration set up front and
//! is immutable afterwards. [`project`] splits it into two
//! [`DirectionContract`]s whose types carry the direction, so a to-peer
//! contract or a [`Validated`] to-peer message can never stand in for a
//! to-host one.

pub mod config;
pub mod contract;
pub mod declaration;
pub mod direction;
pub mod error;
pub mod loader;
pub mod message;
pub mod projector;
pub mod registry;

pub use config::RegistryConfig;
pub use contract::DirectionContract;
pub use declaration::MessageDeclaration;
pub use direction::{Direction, DirectionKind, ToHost, ToPeer};
pub use error::{ContractError, DeclarationDefect, DeclarationError, LoadError, Result};
pub use loader::{load_file, load_str, load_value};
pub use message::{Message, Validated};
pub use projector::{project, Contracts};
pub use registry::MessageRegistry;
