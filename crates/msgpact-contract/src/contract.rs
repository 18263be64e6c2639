use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use msgpact_schema::{Shape, ValidationConfig, Validator};
use serde_json::Value;

use crate::direction::{Direction, DirectionKind};
use crate::error::{ContractError, Result};
use crate::message::Validated;

/// Message name to shape mapping for one direction.
///
/// `DirectionContract<ToHost>` and `DirectionContract<ToPeer>` are distinct
/// types; a name declared in both directions has an independent entry in
/// each.
pub struct DirectionContract<D: Direction> {
    entries: Vec<(String, Shape)>,
    index: HashMap<String, usize>,
    validator: Validator,
    _direction: PhantomData<D>,
}

impl<D: Direction> DirectionContract<D> {
    pub(crate) fn new(config: ValidationConfig) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            validator: Validator::new(config),
            _direction: PhantomData,
        }
    }

    pub(crate) fn insert(&mut self, name: &str, shape: Shape) {
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), shape));
    }

    /// Direction this contract governs.
    pub fn direction(&self) -> DirectionKind {
        D::KIND
    }

    /// Shape declared for `name` in this direction.
    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.index
            .get(name)
            .map(|position| &self.entries[*position].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Message names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Shape)> {
        self.entries
            .iter()
            .map(|(name, shape)| (name.as_str(), shape))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validation settings applied to every message.
    pub fn config(&self) -> &ValidationConfig {
        self.validator.config()
    }

    /// Check `payload` against the shape declared for `message`.
    pub fn validate(&self, message: &str, payload: &Value) -> Result<Validated<D>> {
        let shape = self
            .get(message)
            .ok_or_else(|| ContractError::UnknownMessage {
                direction: D::KIND,
                message: message.to_string(),
            })?;

        let value = self
            .validator
            .validate(shape, payload)
            .map_err(|violation| ContractError::Invalid {
                direction: D::KIND,
                message: message.to_string(),
                violation,
            })?;

        Ok(Validated::new(message, value))
    }
}

impl<D: Direction> fmt::Debug for DirectionContract<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectionContract")
            .field("direction", &D::KIND)
            .field("entries", &self.entries)
            .field("config", self.validator.config())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use msgpact_schema::{infer, Branch, SchemaNode, ViolationKind};
    use serde_json::json;

    use super::*;
    use crate::direction::ToHost;

    fn contract() -> DirectionContract<ToHost> {
        let mut contract = DirectionContract::new(ValidationConfig::default());
        contract.insert(
            "leave",
            infer(&SchemaNode::from(
                Branch::new().field("userId", json!("id")),
            )),
        );
        contract
    }

    #[test]
    fn validates_known_message() {
        let validated = contract()
            .validate("leave", &json!({ "userId": "u1" }))
            .unwrap();
        assert_eq!(validated.message(), "leave");
        assert_eq!(validated.value(), &json!({ "userId": "u1" }));
    }

    #[test]
    fn unknown_message_is_distinct_error() {
        let err = contract().validate("join", &json!({})).unwrap_err();
        assert!(matches!(
            err,
            ContractError::UnknownMessage {
                direction: DirectionKind::ToHost,
                ref message,
            } if message == "join"
        ));
        assert_eq!(
            err.to_string(),
            "unknown message for direction to-host: 'join'"
        );
    }

    #[test]
    fn invalid_payload_carries_message_path_and_reason() {
        let err = contract()
            .validate("leave", &json!({ "userId": 7 }))
            .unwrap_err();
        let violation = err.violation().unwrap();
        assert_eq!(violation.path.to_string(), "userId");
        assert!(matches!(violation.kind, ViolationKind::KindMismatch { .. }));
        assert!(err.to_string().starts_with("message 'leave' (to-host) rejected"));
    }

    #[test]
    fn accessors() {
        let contract = contract();
        assert_eq!(contract.direction(), DirectionKind::ToHost);
        assert_eq!(contract.len(), 1);
        assert!(contract.contains("leave"));
        assert_eq!(contract.names().collect::<Vec<_>>(), vec!["leave"]);
        assert_eq!(contract.iter().count(), 1);
        assert!(!contract.config().strict_mode);
    }
}
