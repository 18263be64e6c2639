//! Opaque leaf validators.
//!
//! A leaf is the single integration point with an external validation
//! library. The core only ever calls [`Leaf::infer_shape`] and
//! [`Leaf::validate`]; everything else about the leaf stays private to it.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::Result;
use crate::json_schema::JsonSchemaLeaf;
use crate::node::SchemaNode;
use crate::path::FieldPath;
use crate::shape::infer;

/// Capability interface for externally validated schema leaves.
pub trait Leaf: Send + Sync + fmt::Debug {
    /// Describe the value shape this leaf accepts.
    ///
    /// Descriptors are JSON Schema fragments by convention. Two leaves with
    /// equal descriptors are treated as the same shape.
    fn infer_shape(&self) -> Value;

    /// Check a candidate value, returning the validated value on success.
    fn validate(&self, value: &Value) -> std::result::Result<Value, LeafFailure>;

    /// This leaf with undeclared object fields forbidden.
    ///
    /// `None` means the leaf has nothing to tighten and is used as is.
    fn strict(&self) -> Option<Arc<dyn Leaf>> {
        None
    }
}

/// Failure reported by a leaf validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafFailure {
    /// Location inside the leaf's own value, empty when the whole value failed.
    pub path: FieldPath,
    /// Human-readable cause.
    pub reason: String,
}

impl LeafFailure {
    /// Failure of the leaf value as a whole.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            path: FieldPath::root(),
            reason: reason.into(),
        }
    }

    /// Failure at a location inside the leaf value.
    pub fn at(path: FieldPath, reason: impl Into<String>) -> Self {
        Self {
            path,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LeafFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            f.write_str(&self.reason)
        } else {
            write!(f, "{} (at {})", self.reason, self.path)
        }
    }
}

/// Any JSON string.
pub fn string() -> Result<SchemaNode> {
    json_schema(json!({ "type": "string" }))
}

/// Any JSON number.
pub fn number() -> Result<SchemaNode> {
    json_schema(json!({ "type": "number" }))
}

/// A JSON number without a fractional part.
pub fn integer() -> Result<SchemaNode> {
    json_schema(json!({ "type": "integer" }))
}

/// `true` or `false`.
pub fn boolean() -> Result<SchemaNode> {
    json_schema(json!({ "type": "boolean" }))
}

/// Exactly one of the listed values.
pub fn enumeration<I, V>(values: I) -> Result<SchemaNode>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    json_schema(json!({ "enum": values }))
}

/// A value accepted by at least one of the member nodes.
///
/// Members are flattened into a single leaf; branch members are rendered
/// through their inferred shape.
pub fn union<I>(members: I) -> Result<SchemaNode>
where
    I: IntoIterator<Item = SchemaNode>,
{
    let any_of: Vec<Value> = members
        .into_iter()
        .map(|member| infer(&member).to_json_schema(false))
        .collect();
    json_schema(json!({ "anyOf": any_of }))
}

/// A homogeneous array whose elements all match `item`.
pub fn array_of(item: &SchemaNode) -> Result<SchemaNode> {
    json_schema(json!({
        "type": "array",
        "items": infer(item).to_json_schema(false),
    }))
}

/// A leaf backed by an arbitrary JSON Schema document.
pub fn json_schema(schema: Value) -> Result<SchemaNode> {
    Ok(SchemaNode::leaf(JsonSchemaLeaf::new(schema)?))
}
