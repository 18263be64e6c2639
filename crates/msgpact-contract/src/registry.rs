use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::declaration::MessageDeclaration;
use crate::direction::DirectionKind;
use crate::error::{DeclarationDefect, DeclarationError, LoadError};
use crate::loader::load_file;
use crate::projector::{project, Contracts};

/// The checked, immutable set of message declarations.
///
/// A registry can only be obtained through a constructor that validates
/// every declaration, and it offers no way to add, remove or change one
/// afterwards.
#[derive(Debug)]
pub struct MessageRegistry {
    declarations: Vec<MessageDeclaration>,
    index: HashMap<String, usize>,
    config: RegistryConfig,
}

impl MessageRegistry {
    /// Build a registry with default config.
    pub fn new(
        declarations: impl IntoIterator<Item = MessageDeclaration>,
    ) -> Result<Self, DeclarationError> {
        Self::with_config(declarations, RegistryConfig::default())
    }

    /// Build a registry with explicit config.
    ///
    /// Every defect in the set is reported, not only the first.
    pub fn with_config(
        declarations: impl IntoIterator<Item = MessageDeclaration>,
        config: RegistryConfig,
    ) -> Result<Self, DeclarationError> {
        let declarations: Vec<MessageDeclaration> = declarations.into_iter().collect();

        let defects = find_defects(&declarations);
        if !defects.is_empty() {
            warn!(defects = defects.len(), "rejecting message declarations");
            return Err(DeclarationError { defects });
        }

        let index = declarations
            .iter()
            .enumerate()
            .map(|(position, declaration)| (declaration.name().to_string(), position))
            .collect();

        debug!(
            messages = declarations.len(),
            strict = config.strict_mode,
            "built message registry"
        );
        Ok(Self {
            declarations,
            index,
            config,
        })
    }

    /// Load a declaration document from a file.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        Self::from_file_with_config(path, RegistryConfig::default())
    }

    /// Load a declaration document from a file with explicit config.
    pub fn from_file_with_config(path: &Path, config: RegistryConfig) -> Result<Self, LoadError> {
        load_file(path, config)
    }

    /// Look up a declaration by message name.
    pub fn get(&self, name: &str) -> Option<&MessageDeclaration> {
        self.index
            .get(name)
            .map(|position| &self.declarations[*position])
    }

    /// Check if a message name is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declarations in the order they were supplied.
    pub fn iter(&self) -> std::slice::Iter<'_, MessageDeclaration> {
        self.declarations.iter()
    }

    /// Declared message names in the order they were supplied.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(MessageDeclaration::name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Derive the to-host and to-peer contracts.
    pub fn project(&self) -> Contracts {
        project(self)
    }
}

impl<'a> IntoIterator for &'a MessageRegistry {
    type Item = &'a MessageDeclaration;
    type IntoIter = std::slice::Iter<'a, MessageDeclaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn find_defects(declarations: &[MessageDeclaration]) -> Vec<DeclarationDefect> {
    let mut defects = Vec::new();
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for declaration in declarations {
        let name = declaration.name();

        if name.is_empty() {
            defects.push(DeclarationDefect::EmptyName);
        } else if !seen.insert(name) && reported.insert(name) {
            defects.push(DeclarationDefect::DuplicateName {
                name: name.to_string(),
            });
        }

        if declaration.directions().is_empty() {
            defects.push(DeclarationDefect::NoDirection {
                name: name.to_string(),
            });
        }

        for direction in DirectionKind::ALL {
            let Some(node) = declaration.node(direction) else {
                continue;
            };
            for path in node.duplicate_fields() {
                defects.push(DeclarationDefect::DuplicateField {
                    name: name.to_string(),
                    direction,
                    path,
                });
            }
        }
    }

    defects
}

#[cfg(test)]
mod tests {
    use msgpact_schema::leaf::string;
    use msgpact_schema::Branch;
    use serde_json::json;

    use super::*;

    fn user_branch() -> Branch {
        Branch::new().field("userId", string().unwrap())
    }

    #[test]
    fn builds_and_looks_up() {
        let registry = MessageRegistry::new([
            MessageDeclaration::new("join")
                .to_host(user_branch())
                .to_peer(user_branch()),
            MessageDeclaration::new("leave").to_host(user_branch()),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("leave"));
        assert!(!registry.contains("kick"));
        assert_eq!(registry.get("join").unwrap().name(), "join");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["join", "leave"]);
        assert_eq!(registry.iter().count(), 2);
    }

    #[test]
    fn declaration_without_direction_is_rejected() {
        let err = MessageRegistry::new([MessageDeclaration::new("ghost")]).unwrap_err();
        assert_eq!(
            err.defects,
            vec![DeclarationDefect::NoDirection {
                name: "ghost".into()
            }]
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = MessageRegistry::new([
            MessageDeclaration::new("join").to_host(user_branch()),
            MessageDeclaration::new("join").to_peer(user_branch()),
            MessageDeclaration::new("join").to_peer(user_branch()),
        ])
        .unwrap_err();

        assert_eq!(
            err.defects,
            vec![DeclarationDefect::DuplicateName {
                name: "join".into()
            }]
        );
    }

    #[test]
    fn every_defect_is_reported() {
        let err = MessageRegistry::new([
            MessageDeclaration::new("ghost"),
            MessageDeclaration::new(""),
            MessageDeclaration::new("join").to_host(user_branch()),
            MessageDeclaration::new("join").to_host(user_branch()),
            MessageDeclaration::new("echo").to_peer(
                Branch::new()
                    .field("text", json!("x"))
                    .field("text", json!("y")),
            ),
            MessageDeclaration::new("phantom"),
        ])
        .unwrap_err();

        assert_eq!(err.defects.len(), 6);
        assert!(err.defects.contains(&DeclarationDefect::EmptyName));
        assert!(err.defects.contains(&DeclarationDefect::NoDirection {
            name: String::new()
        }));
        assert_eq!(err.names(), vec!["ghost", "join", "echo", "phantom"]);
        assert!(matches!(
            &err.defects[4],
            DeclarationDefect::DuplicateField { direction: DirectionKind::ToPeer, path, .. }
                if path.to_string() == "text"
        ));
    }

    #[test]
    fn config_is_kept() {
        let config = RegistryConfig {
            strict_mode: true,
            ..RegistryConfig::default()
        };
        let registry = MessageRegistry::with_config(
            [MessageDeclaration::new("leave").to_host(user_branch())],
            config,
        )
        .unwrap();
        assert_eq!(registry.config(), &config);
    }
}
