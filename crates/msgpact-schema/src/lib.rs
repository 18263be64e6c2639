//! Schema trees, shape inference and runtime validation.
//!
//! A message body is declared as a [`SchemaNode`] tree: opaque [`Leaf`]
//! validators, nested [`Branch`] structures, and plain JSON literals. The
//! tree is turned into a [`Shape`] once with [`infer`], and every candidate
//! value is checked against that shape by the [`Validator`].
//!
//! Leaf validation is delegated through the [`Leaf`] trait. The bundled
//! [`JsonSchemaLeaf`] adapter backs leaves with JSON Schema.

pub mod config;
pub mod error;
pub mod json_schema;
pub mod leaf;
pub mod node;
pub mod path;
pub mod shape;
mod strict;
pub mod validator;

pub use config::ValidationConfig;
pub use error::{Result, SchemaError};
pub use json_schema::JsonSchemaLeaf;
pub use leaf::{Leaf, LeafFailure};
pub use node::{Branch, BranchField, SchemaNode};
pub use path::{FieldPath, PathSegment};
pub use shape::{infer, infer_with, FieldShape, Kind, LeafShape, Shape, Structure};
pub use validator::{validate, ValidationOutcome, Validator, Violation, ViolationKind};
