use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::path::{FieldPath, PathSegment};
use crate::shape::{Kind, Shape, Structure};

/// Validated value, or the first violation found.
pub type ValidationOutcome = std::result::Result<Value, Violation>;

/// First offending location of a rejected value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {path}")]
pub struct Violation {
    pub path: FieldPath,
    pub kind: ViolationKind,
}

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViolationKind {
    /// The value is of a different primitive kind than declared.
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: Kind, found: Kind },

    /// A required field is absent.
    #[error("missing required field")]
    MissingField,

    /// A field is not declared (strict mode only).
    #[error("unexpected field")]
    UnexpectedField,

    /// A fixed-length array has the wrong number of elements.
    #[error("length mismatch: expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// The leaf validator rejected the value.
    #[error("{0}")]
    Leaf(String),
}

impl Violation {
    fn new(path: FieldPath, kind: ViolationKind) -> Self {
        Self { path, kind }
    }

    /// Human-readable cause, without the path.
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }

    fn within(mut self, segment: PathSegment) -> Self {
        self.path = self.path.prepend(segment);
        self
    }
}

/// Checks runtime values against inferred shapes.
///
/// Validation never mutates its inputs; the same shape and value always
/// produce the same outcome. Declared fields are checked in declaration
/// order, while a validated object keeps the key order of its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate `value` against `shape`.
    pub fn validate(&self, shape: &Shape, value: &Value) -> ValidationOutcome {
        match shape {
            Shape::Primitive(expected) => {
                let found = Kind::of(value);
                if found == *expected {
                    Ok(value.clone())
                } else {
                    Err(Violation::new(
                        FieldPath::root(),
                        ViolationKind::KindMismatch {
                            expected: *expected,
                            found,
                        },
                    ))
                }
            }
            Shape::Tuple(items) => self.validate_tuple(items, value),
            Shape::Structure(structure) => self.validate_structure(structure, value),
            Shape::Leaf(leaf) => leaf.leaf().validate(value).map_err(|failure| {
                Violation::new(failure.path, ViolationKind::Leaf(failure.reason))
            }),
        }
    }

    fn validate_tuple(&self, items: &[Shape], value: &Value) -> ValidationOutcome {
        let Value::Array(elements) = value else {
            return Err(mismatch(Kind::Array, value));
        };
        if elements.len() != items.len() {
            return Err(Violation::new(
                FieldPath::root(),
                ViolationKind::LengthMismatch {
                    expected: items.len(),
                    found: elements.len(),
                },
            ));
        }

        let mut validated = Vec::with_capacity(elements.len());
        for (index, (shape, element)) in items.iter().zip(elements).enumerate() {
            let element = self
                .validate(shape, element)
                .map_err(|violation| violation.within(PathSegment::Index(index)))?;
            validated.push(element);
        }
        Ok(Value::Array(validated))
    }

    fn validate_structure(&self, structure: &Structure, value: &Value) -> ValidationOutcome {
        let Value::Object(object) = value else {
            return Err(mismatch(Kind::Object, value));
        };

        let mut declared = Map::new();
        for field in structure.fields() {
            match object.get(&field.name) {
                Some(child) => {
                    let child = self.validate(&field.shape, child).map_err(|violation| {
                        violation.within(PathSegment::Field(field.name.clone()))
                    })?;
                    declared.insert(field.name.clone(), child);
                }
                None if field.optional => {}
                None => {
                    return Err(Violation::new(
                        FieldPath::root().child(field.name.as_str()),
                        ViolationKind::MissingField,
                    ));
                }
            }
        }

        if self.config.strict_mode {
            if let Some(name) = object.keys().find(|name| structure.field(name).is_none()) {
                return Err(Violation::new(
                    FieldPath::root().child(name.as_str()),
                    ViolationKind::UnexpectedField,
                ));
            }
        }

        let mut validated = Map::new();
        for (name, child) in object {
            let child = declared.remove(name).unwrap_or_else(|| child.clone());
            validated.insert(name.clone(), child);
        }
        Ok(Value::Object(validated))
    }
}

/// Validate with the default (tolerant) configuration.
pub fn validate(shape: &Shape, value: &Value) -> ValidationOutcome {
    Validator::default().validate(shape, value)
}

fn mismatch(expected: Kind, value: &Value) -> Violation {
    Violation::new(
        FieldPath::root(),
        ViolationKind::KindMismatch {
            expected,
            found: Kind::of(value),
        },
    )
}
