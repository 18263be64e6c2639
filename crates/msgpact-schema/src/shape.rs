//! Canonical value shapes and their inference from schema trees.
//!
//! Inference is total: every [`SchemaNode`] has a shape. Leaves contribute
//! their own descriptor as an atomic unit, branches become [`Structure`]s,
//! and literals are walked recursively until a scalar is reached.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::config::ValidationConfig;
use crate::leaf::Leaf;
use crate::node::SchemaNode;

/// Primitive category of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// Kind of a runtime value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// JSON Schema type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of values acceptable for a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A scalar of one kind.
    Primitive(Kind),
    /// A fixed-length array with one shape per position.
    Tuple(Vec<Shape>),
    /// A keyed aggregate.
    Structure(Structure),
    /// Delegated to an external validator.
    Leaf(LeafShape),
}

/// Fields of a structural shape.
///
/// Declaration order is kept for deterministic error reporting but does not
/// take part in equality.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    fields: Vec<FieldShape>,
}

/// A named field of a [`Structure`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    pub name: String,
    pub shape: Shape,
    pub optional: bool,
}

impl Structure {
    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for Structure {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|field| other.field(&field.name) == Some(field))
    }
}

/// Shape of a leaf: its descriptor plus the validator that enforces it.
#[derive(Clone)]
pub struct LeafShape {
    descriptor: Value,
    leaf: Arc<dyn Leaf>,
}

impl LeafShape {
    /// The descriptor reported by the leaf.
    pub fn descriptor(&self) -> &Value {
        &self.descriptor
    }

    /// The leaf validator.
    pub fn leaf(&self) -> &dyn Leaf {
        self.leaf.as_ref()
    }
}

impl PartialEq for LeafShape {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
    }
}

impl fmt::Debug for LeafShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LeafShape").field(&self.descriptor).finish()
    }
}

/// Compute the shape denoted by a schema node.
pub fn infer(node: &SchemaNode) -> Shape {
    infer_with(node, &ValidationConfig::default())
}

/// Compute the shape of a node for a validation config.
///
/// In strict mode every leaf is replaced by its strict variant, so leaves
/// that wrap structures apply the same excess-field policy as branches.
pub fn infer_with(node: &SchemaNode, config: &ValidationConfig) -> Shape {
    match node {
        SchemaNode::Leaf(leaf) => {
            let leaf = config
                .strict_mode
                .then(|| leaf.strict())
                .flatten()
                .unwrap_or_else(|| Arc::clone(leaf));
            Shape::Leaf(LeafShape {
                descriptor: leaf.infer_shape(),
                leaf,
            })
        }
        SchemaNode::Branch(branch) => Shape::Structure(Structure {
            fields: branch
                .fields()
                .iter()
                .map(|field| FieldShape {
                    name: field.name.clone(),
                    shape: infer_with(&field.node, config),
                    optional: field.optional,
                })
                .collect(),
        }),
        SchemaNode::Passthrough(value) => infer_literal(value),
    }
}

fn infer_literal(value: &Value) -> Shape {
    match value {
        Value::Object(map) => Shape::Structure(Structure {
            fields: map
                .iter()
                .map(|(name, child)| FieldShape {
                    name: name.clone(),
                    shape: infer_literal(child),
                    optional: false,
                })
                .collect(),
        }),
        Value::Array(items) => Shape::Tuple(items.iter().map(infer_literal).collect()),
        scalar => Shape::Primitive(Kind::of(scalar)),
    }
}

impl Shape {
    /// Render the shape as a JSON Schema document.
    ///
    /// With `strict`, structures forbid undeclared properties.
    pub fn to_json_schema(&self, strict: bool) -> Value {
        match self {
            Shape::Primitive(kind) => json!({ "type": kind.as_str() }),
            Shape::Tuple(items) => {
                let prefix: Vec<Value> = items
                    .iter()
                    .map(|item| item.to_json_schema(strict))
                    .collect();
                json!({
                    "type": "array",
                    "prefixItems": prefix,
                    "items": false,
                    "minItems": items.len(),
                })
            }
            Shape::Structure(structure) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in structure.fields() {
                    properties.insert(field.name.clone(), field.shape.to_json_schema(strict));
                    if !field.optional {
                        required.push(Value::String(field.name.clone()));
                    }
                }

                let mut schema = Map::new();
                schema.insert("type".to_string(), Value::String("object".to_string()));
                schema.insert("properties".to_string(), Value::Object(properties));
                schema.insert("required".to_string(), Value::Array(required));
                if strict {
                    schema.insert("additionalProperties".to_string(), Value::Bool(false));
                }
                Value::Object(schema)
            }
            Shape::Leaf(leaf) => leaf.descriptor.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::leaf::{array_of, enumeration, string};
    use crate::node::Branch;

    #[test]
    fn leaf_shape_is_its_descriptor() {
        let shape = infer(&string().unwrap());
        match &shape {
            Shape::Leaf(leaf) => assert_eq!(leaf.descriptor(), &json!({ "type": "string" })),
            other => panic!("expected leaf shape, got {other:?}"),
        }
    }

    #[test]
    fn branch_becomes_structure_in_order() {
        let node = SchemaNode::from(
            Branch::new()
                .field("id", string().unwrap())
                .optional("etc", Branch::new().field("key", string().unwrap())),
        );

        let Shape::Structure(structure) = infer(&node) else {
            panic!("expected structure");
        };
        let names: Vec<&str> = structure.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "etc"]);
        assert!(structure.field("etc").unwrap().optional);
        assert!(matches!(
            structure.field("etc").unwrap().shape,
            Shape::Structure(_)
        ));
    }

    #[test]
    fn literals_are_walked_to_scalars() {
        let node = SchemaNode::literal(json!({
            "count": 1,
            "flags": [true, "x"],
            "nested": { "deep": { "value": null } }
        }));

        let expected = Shape::Structure(Structure {
            fields: vec![
                FieldShape {
                    name: "count".into(),
                    shape: Shape::Primitive(Kind::Number),
                    optional: false,
                },
                FieldShape {
                    name: "flags".into(),
                    shape: Shape::Tuple(vec![
                        Shape::Primitive(Kind::Boolean),
                        Shape::Primitive(Kind::String),
                    ]),
                    optional: false,
                },
                FieldShape {
                    name: "nested".into(),
                    shape: infer_literal(&json!({ "deep": { "value": null } })),
                    optional: false,
                },
            ],
        });
        assert_eq!(infer(&node), expected);
    }

    #[test]
    fn empty_branch_is_empty_structure() {
        let shape = infer(&SchemaNode::from(Branch::new()));
        assert_eq!(shape, Shape::Structure(Structure::default()));
        assert_eq!(shape, infer(&SchemaNode::literal(json!({}))));
    }

    #[test]
    fn equality_is_structural_and_order_insensitive() {
        let first = SchemaNode::from(
            Branch::new()
                .field("a", string().unwrap())
                .field("b", enumeration(["x", "y"]).unwrap()),
        );
        let second = SchemaNode::from(
            Branch::new()
                .field("b", enumeration(["x", "y"]).unwrap())
                .field("a", string().unwrap()),
        );
        assert_eq!(infer(&first), infer(&second));

        let different = SchemaNode::from(
            Branch::new()
                .field("a", string().unwrap())
                .optional("b", enumeration(["x", "y"]).unwrap()),
        );
        assert_ne!(infer(&first), infer(&different));
    }

    #[test]
    fn strict_inference_tightens_leaves() {
        let node = SchemaNode::from(Branch::new().field(
            "items",
            array_of(&SchemaNode::from(Branch::new().field("key", string().unwrap()))).unwrap(),
        ));
        let strict = ValidationConfig { strict_mode: true };

        let tolerant_shape = infer(&node);
        let strict_shape = infer_with(&node, &strict);
        assert_ne!(tolerant_shape, strict_shape);
        assert_eq!(
            strict_shape.to_json_schema(true)["properties"]["items"]["items"]
                ["additionalProperties"],
            json!(false)
        );
        assert_eq!(infer_with(&node, &ValidationConfig::default()), tolerant_shape);
    }

    #[test]
    fn renders_json_schema() {
        let node = SchemaNode::from(
            Branch::new()
                .field("id", string().unwrap())
                .optional("tags", json!(["a"])),
        );
        let schema = infer(&node).to_json_schema(true);
        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "tags": {
                        "type": "array",
                        "prefixItems": [{ "type": "string" }],
                        "items": false,
                        "minItems": 1
                    }
                },
                "required": ["id"],
                "additionalProperties": false
            })
        );
    }
}
