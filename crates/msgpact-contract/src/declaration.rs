use msgpact_schema::SchemaNode;

use crate::direction::DirectionKind;

/// A named message and the body it carries in each direction.
#[derive(Debug, Clone)]
pub struct MessageDeclaration {
    name: String,
    to_host: Option<SchemaNode>,
    to_peer: Option<SchemaNode>,
}

impl MessageDeclaration {
    /// Start a declaration with no directions.
    ///
    /// At least one direction must be added before the declaration is
    /// accepted by a registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            to_host: None,
            to_peer: None,
        }
    }

    /// Body the peer may send to the host.
    pub fn to_host(mut self, node: impl Into<SchemaNode>) -> Self {
        self.to_host = Some(node.into());
        self
    }

    /// Body the host may send to the peer.
    pub fn to_peer(mut self, node: impl Into<SchemaNode>) -> Self {
        self.to_peer = Some(node.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared body for `direction`.
    pub fn node(&self, direction: DirectionKind) -> Option<&SchemaNode> {
        match direction {
            DirectionKind::ToHost => self.to_host.as_ref(),
            DirectionKind::ToPeer => self.to_peer.as_ref(),
        }
    }

    /// Directions this declaration supplies, to-host first.
    pub fn directions(&self) -> Vec<DirectionKind> {
        DirectionKind::ALL
            .into_iter()
            .filter(|direction| self.node(*direction).is_some())
            .collect()
    }
}
