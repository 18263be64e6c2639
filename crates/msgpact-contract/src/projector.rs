use std::sync::Arc;

use msgpact_schema::infer_with;
use tracing::debug;

use crate::contract::DirectionContract;
use crate::direction::{DirectionKind, ToHost, ToPeer};
use crate::registry::MessageRegistry;

/// The two contracts derived from one registry.
///
/// Each side is shared read-only; cloning `Contracts` clones the handles,
/// not the shapes.
#[derive(Debug, Clone)]
pub struct Contracts {
    pub to_host: Arc<DirectionContract<ToHost>>,
    pub to_peer: Arc<DirectionContract<ToPeer>>,
}

/// Split a registry into its to-host and to-peer contracts.
///
/// A message participates in a direction only when its declaration supplies
/// that direction, and each direction's shape is inferred on its own. In
/// strict mode leaves are inferred through their strict variants.
pub fn project(registry: &MessageRegistry) -> Contracts {
    let validation = registry.config().validation();
    let mut to_host = DirectionContract::<ToHost>::new(validation);
    let mut to_peer = DirectionContract::<ToPeer>::new(validation);

    for declaration in registry {
        if let Some(node) = declaration.node(DirectionKind::ToHost) {
            to_host.insert(declaration.name(), infer_with(node, &validation));
        }
        if let Some(node) = declaration.node(DirectionKind::ToPeer) {
            to_peer.insert(declaration.name(), infer_with(node, &validation));
        }
    }

    debug!(
        to_host = to_host.len(),
        to_peer = to_peer.len(),
        "projected direction contracts"
    );
    Contracts {
        to_host: Arc::new(to_host),
        to_peer: Arc::new(to_peer),
    }
}
