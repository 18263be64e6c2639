use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::direction::{Direction, DirectionKind};
use crate::error::{ContractError, Result};

/// A statically typed message body.
///
/// Implement it once per message and direction; the associated
/// `Direction` keeps a to-peer body out of a to-host sender at compile time.
///
/// ```
/// use msgpact_contract::{Message, ToHost};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Leave {
///     #[serde(rename = "userId")]
///     user_id: String,
/// }
///
/// impl Message for Leave {
///     type Direction = ToHost;
///     const NAME: &'static str = "leave";
/// }
/// ```
pub trait Message: Serialize {
    type Direction: Direction;
    const NAME: &'static str;
}

/// A message that passed its direction's contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated<D: Direction> {
    message: String,
    value: Value,
    _direction: PhantomData<D>,
}

impl<D: Direction> Validated<D> {
    pub(crate) fn new(message: &str, value: Value) -> Self {
        Self {
            message: message.to_string(),
            value,
            _direction: PhantomData,
        }
    }

    /// Message name.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Validated body.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn direction(&self) -> DirectionKind {
        D::KIND
    }

    /// Consume into the validated body.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Consume into message name and body.
    pub fn into_parts(self) -> (String, Value) {
        (self.message, self.value)
    }

    /// Deserialize the body into its typed message.
    pub fn decode<M>(&self) -> Result<M>
    where
        M: Message<Direction = D> + DeserializeOwned,
    {
        if self.message != M::NAME {
            return Err(ContractError::NameMismatch {
                expected: M::NAME,
                found: self.message.clone(),
            });
        }

        serde_json::from_value(self.value.clone()).map_err(|source| ContractError::Decode {
            message: self.message.clone(),
            source,
        })
    }
}
