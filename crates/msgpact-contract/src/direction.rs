use std::fmt;

use serde::{Deserialize, Serialize};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::ToHost {}
    impl Sealed for super::ToPeer {}
}

/// Type-level message direction.
///
/// Only [`ToHost`] and [`ToPeer`] implement this trait.
pub trait Direction: sealed::Sealed + fmt::Debug + Send + Sync + 'static {
    const KIND: DirectionKind;
}

/// Messages the peer sends to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToHost {}

/// Messages the host sends to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToPeer {}

impl Direction for ToHost {
    const KIND: DirectionKind = DirectionKind::ToHost;
}

impl Direction for ToPeer {
    const KIND: DirectionKind = DirectionKind::ToPeer;
}

/// Runtime name of a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionKind {
    ToHost,
    ToPeer,
}

impl DirectionKind {
    pub const ALL: [DirectionKind; 2] = [DirectionKind::ToHost, DirectionKind::ToPeer];

    pub fn as_str(self) -> &'static str {
        match self {
            DirectionKind::ToHost => "to-host",
            DirectionKind::ToPeer => "to-peer",
        }
    }
}

impl fmt::Display for DirectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
