use std::fmt;

use msgpact_schema::{FieldPath, Violation};

use crate::direction::DirectionKind;

/// One problem found in a declaration set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationDefect {
    /// A declaration has an empty name.
    #[error("message name must not be empty")]
    EmptyName,

    /// More than one declaration uses the same name.
    #[error("duplicate message name '{name}'")]
    DuplicateName { name: String },

    /// A declaration supplies no body for either direction.
    #[error("message '{name}' declares neither to-host nor to-peer")]
    NoDirection { name: String },

    /// A branch repeats a field name.
    #[error("message '{name}' ({direction}) repeats field '{path}'")]
    DuplicateField {
        name: String,
        direction: DirectionKind,
        path: FieldPath,
    },

    /// A declaration document entry could not be turned into schema nodes.
    #[error("message '{name}' is malformed: {reason}")]
    Malformed { name: String, reason: String },
}

impl DeclarationDefect {
    /// Message name the defect refers to, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            DeclarationDefect::EmptyName => None,
            DeclarationDefect::DuplicateName { name }
            | DeclarationDefect::NoDirection { name }
            | DeclarationDefect::DuplicateField { name, .. }
            | DeclarationDefect::Malformed { name, .. } => Some(name.as_str()),
        }
    }
}

/// Every defect found while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid message declarations: {}", DefectList(.defects))]
pub struct DeclarationError {
    pub defects: Vec<DeclarationDefect>,
}

impl DeclarationError {
    /// Names of the offending messages, in report order, without repeats.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.defects.iter().filter_map(DeclarationDefect::name) {
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

struct DefectList<'a>(&'a [DeclarationDefect]);

impl fmt::Display for DefectList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, defect) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{defect}")?;
        }
        Ok(())
    }
}

/// Errors raised when a message is checked against a direction contract.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// The message name has no entry in this direction.
    #[error("unknown message for direction {direction}: '{message}'")]
    UnknownMessage {
        direction: DirectionKind,
        message: String,
    },

    /// The payload does not match the declared shape.
    #[error("message '{message}' ({direction}) rejected: {violation}")]
    Invalid {
        direction: DirectionKind,
        message: String,
        violation: Violation,
    },

    /// A validated message was decoded as a different message type.
    #[error("validated message '{found}' cannot be decoded as '{expected}'")]
    NameMismatch {
        expected: &'static str,
        found: String,
    },

    /// A validated value did not deserialize into the message type.
    #[error("failed to decode message '{message}': {source}")]
    Decode {
        message: String,
        source: serde_json::Error,
    },
}

impl ContractError {
    /// The violation behind an `Invalid` error.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ContractError::Invalid { violation, .. } => Some(violation),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContractError>;

/// Errors that can occur while loading a declaration document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document could not be read.
    #[error("failed to load declarations: {0}")]
    Read(String),

    /// The document is not valid JSON.
    #[error("declaration document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document exceeds the configured size limit.
    #[error("declaration document too large ({size} bytes, max {max})")]
    TooLarge { size: u64, max: usize },

    /// The document parsed but its declarations are invalid.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
}
