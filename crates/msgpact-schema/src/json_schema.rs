use std::fmt;
use std::sync::Arc;

use jsonschema::paths::{Location, LocationSegment};
use jsonschema::Validator;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SchemaError};
use crate::leaf::{Leaf, LeafFailure};
use crate::path::{FieldPath, PathSegment};
use crate::strict::forbid_undeclared_properties;

/// Extra error messages appended after the first one.
const MAX_EXTRA_ERRORS: usize = 3;

/// Leaf validator backed by a compiled JSON Schema.
pub struct JsonSchemaLeaf {
    schema: Value,
    validator: Validator,
}

impl JsonSchemaLeaf {
    /// Compile a JSON Schema document into a leaf.
    pub fn new(schema: Value) -> Result<Self> {
        let validator = jsonschema::validator_for(&schema).map_err(|err| {
            debug!(error = %err, "rejecting leaf schema");
            SchemaError::CompileFailed(err.to_string())
        })?;
        Ok(Self { schema, validator })
    }

    /// Compile a leaf from a JSON Schema string.
    pub fn from_json_str(schema_json: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(schema_json).map_err(|err| {
            SchemaError::CompileFailed(format!("schema is not valid JSON: {err}"))
        })?;
        Self::new(schema)
    }

    /// The schema document this leaf was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl Leaf for JsonSchemaLeaf {
    fn infer_shape(&self) -> Value {
        self.schema.clone()
    }

    fn validate(&self, value: &Value) -> std::result::Result<Value, LeafFailure> {
        let mut errors = self.validator.iter_errors(value);
        if let Some(first) = errors.next() {
            let path = field_path(first.instance_path());
            let mut message = first.to_string();
            for err in errors.take(MAX_EXTRA_ERRORS) {
                message.push_str("; ");
                message.push_str(&err.to_string());
                let extra_path = field_path(err.instance_path());
                if extra_path != path && !extra_path.is_root() {
                    message.push_str(&format!(" (at {extra_path})"));
                }
            }
            return Err(LeafFailure::at(path, message));
        }

        Ok(value.clone())
    }

    fn strict(&self) -> Option<Arc<dyn Leaf>> {
        let mut schema = self.schema.clone();
        forbid_undeclared_properties(&mut schema);
        if schema == self.schema {
            return None;
        }

        match JsonSchemaLeaf::new(schema) {
            Ok(leaf) => Some(Arc::new(leaf)),
            Err(err) => {
                warn!(error = %err, "strict leaf schema did not compile, keeping the declared one");
                None
            }
        }
    }
}

/// Convert a JSON pointer into the instance to a field path.
fn field_path(location: &Location) -> FieldPath {
    location
        .iter()
        .map(|segment| match segment {
            LocationSegment::Property(name) => PathSegment::Field(name.into_owned()),
            LocationSegment::Index(index) => PathSegment::Index(index),
        })
        .collect()
}

impl fmt::Debug for JsonSchemaLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaLeaf")
            .field("schema", &self.schema)
            .finish()
    }
}
