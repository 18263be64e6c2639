//! Declaration documents.
//!
//! A document lists every message once, keyed by name:
//!
//! ```json
//! {
//!   "messages": {
//!     "leave": {
//!       "to_host": { "branch": { "fields": { "userId": { "leaf": { "type": "string" } } } } }
//!     }
//!   }
//! }
//! ```
//!
//! A node is exactly one of `{"leaf": <JSON Schema>}`,
//! `{"branch": {"fields": {..}, "optional": [..]}}` or `{"literal": <JSON>}`.
//! Every malformed entry is reported together with the registry defects.
//! Keys repeated inside the document text are defects too, even though the
//! parsed JSON keeps only one of them.

use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

use msgpact_schema::{Branch, FieldPath, JsonSchemaLeaf, SchemaNode};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::RegistryConfig;
use crate::declaration::MessageDeclaration;
use crate::direction::DirectionKind;
use crate::error::{DeclarationDefect, DeclarationError, LoadError};
use crate::registry::MessageRegistry;

const TO_HOST_KEY: &str = "to_host";
const TO_PEER_KEY: &str = "to_peer";

/// Build a registry from a declaration document string.
pub fn load_str(document: &str, config: RegistryConfig) -> Result<MessageRegistry, LoadError> {
    if document.len() > config.max_document_size {
        return Err(LoadError::TooLarge {
            size: document.len() as u64,
            max: config.max_document_size,
        });
    }
    let value: Value = serde_json::from_str(document)?;

    let mut repeats = Vec::new();
    let mut deserializer = serde_json::Deserializer::from_str(document);
    KeyScan {
        path: Vec::new(),
        repeats: &mut repeats,
    }
    .deserialize(&mut deserializer)?;
    deserializer.end()?;

    let mut defects: Vec<DeclarationDefect> = Vec::new();
    for path in &repeats {
        let defect = repeat_defect(path)?;
        if !defects.contains(&defect) {
            defects.push(defect);
        }
    }
    if !defects.is_empty() {
        debug!(repeats = repeats.len(), "declaration document repeats keys");
    }
    build(&value, config, defects)
}

/// Build a registry from a parsed declaration document.
///
/// Repeated keys are already collapsed in a parsed [`Value`]; use
/// [`load_str`] to have them reported.
pub fn load_value(document: &Value, config: RegistryConfig) -> Result<MessageRegistry, LoadError> {
    build(document, config, Vec::new())
}

fn build(
    document: &Value,
    config: RegistryConfig,
    mut defects: Vec<DeclarationDefect>,
) -> Result<MessageRegistry, LoadError> {
    let messages = document
        .get("messages")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            LoadError::Read("document must contain a \"messages\" object".to_string())
        })?;

    let mut declarations = Vec::with_capacity(messages.len());
    for (name, entry) in messages {
        match parse_declaration(name, entry) {
            Ok(declaration) => declarations.push(declaration),
            Err(reasons) => defects.extend(reasons.into_iter().map(|reason| {
                DeclarationDefect::Malformed {
                    name: name.clone(),
                    reason,
                }
            })),
        }
    }

    match MessageRegistry::with_config(declarations, config) {
        Ok(registry) if defects.is_empty() => Ok(registry),
        Ok(_) => Err(DeclarationError { defects }.into()),
        Err(err) => {
            defects.extend(err.defects);
            Err(DeclarationError { defects }.into())
        }
    }
}

/// Build a registry from a declaration document file.
///
/// Symlinks are refused and the file size is capped by
/// [`RegistryConfig::max_document_size`].
pub fn load_file(path: &Path, config: RegistryConfig) -> Result<MessageRegistry, LoadError> {
    let path_metadata = std::fs::symlink_metadata(path)
        .map_err(|err| LoadError::Read(format!("{}: {err}", path.display())))?;
    if path_metadata.file_type().is_symlink() {
        return Err(LoadError::Read(format!(
            "refusing to load declaration symlink: {}",
            path.display()
        )));
    }
    if !path_metadata.is_file() {
        return Err(LoadError::Read(format!(
            "not a regular file: {}",
            path.display()
        )));
    }

    let file = std::fs::File::open(path).map_err(|err| {
        LoadError::Read(format!("failed opening {}: {err}", path.display()))
    })?;
    let opened_metadata = file
        .metadata()
        .map_err(|err| LoadError::Read(err.to_string()))?;

    #[cfg(unix)]
    {
        if !same_file_identity(&path_metadata, &opened_metadata) {
            return Err(LoadError::Read(format!(
                "declaration file changed during load: {}",
                path.display()
            )));
        }
    }

    let max_bytes = config.max_document_size;
    if opened_metadata.len() > max_bytes as u64 {
        return Err(LoadError::TooLarge {
            size: opened_metadata.len(),
            max: max_bytes,
        });
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| LoadError::Read(format!("failed reading {}: {err}", path.display())))?;

    debug!(path = %path.display(), bytes = content.len(), "loading message declarations");
    load_str(&content, config)
}

fn parse_declaration(name: &str, entry: &Value) -> Result<MessageDeclaration, Vec<String>> {
    let Some(entry) = entry.as_object() else {
        return Err(vec!["declaration must be an object".to_string()]);
    };

    let mut reasons = Vec::new();
    for key in entry.keys() {
        if key != TO_HOST_KEY && key != TO_PEER_KEY {
            reasons.push(format!("unknown key '{key}'"));
        }
    }

    let mut declaration = MessageDeclaration::new(name);
    for (key, direction) in [
        (TO_HOST_KEY, DirectionKind::ToHost),
        (TO_PEER_KEY, DirectionKind::ToPeer),
    ] {
        let Some(raw) = entry.get(key) else {
            continue;
        };
        match parse_node(raw, &FieldPath::root()) {
            Ok(node) => {
                declaration = match direction {
                    DirectionKind::ToHost => declaration.to_host(node),
                    DirectionKind::ToPeer => declaration.to_peer(node),
                };
            }
            Err(errors) => reasons.extend(
                errors
                    .into_iter()
                    .map(|reason| format!("{direction} {reason}")),
            ),
        }
    }

    if reasons.is_empty() {
        Ok(declaration)
    } else {
        Err(reasons)
    }
}

fn parse_node(raw: &Value, at: &FieldPath) -> Result<SchemaNode, Vec<String>> {
    let Some(object) = raw.as_object().filter(|object| object.len() == 1) else {
        return Err(vec![format!(
            "node at {at} must be an object with exactly one of \"leaf\", \"branch\", \"literal\""
        )]);
    };

    match object.iter().next() {
        Some((kind, body)) if kind == "leaf" => JsonSchemaLeaf::new(body.clone())
            .map(SchemaNode::leaf)
            .map_err(|err| vec![format!("node at {at}: {err}")]),
        Some((kind, body)) if kind == "branch" => parse_branch(body, at),
        Some((kind, body)) if kind == "literal" => Ok(SchemaNode::literal(body.clone())),
        Some((kind, _)) => Err(vec![format!("node at {at} has unknown kind '{kind}'")]),
        None => Err(vec![format!("node at {at} is empty")]),
    }
}

fn parse_branch(body: &Value, at: &FieldPath) -> Result<SchemaNode, Vec<String>> {
    let empty = Map::new();
    let fields = match body.get("fields") {
        Some(Value::Object(fields)) => fields,
        None => &empty,
        Some(_) => return Err(vec![format!("branch at {at}: \"fields\" must be an object")]),
    };

    let mut errors = Vec::new();
    let optional: Vec<&str> = match body.get("optional") {
        None => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(|name| {
                let name = name.as_str();
                if name.is_none() {
                    errors.push(format!("branch at {at}: \"optional\" entries must be strings"));
                }
                name
            })
            .collect(),
        Some(_) => return Err(vec![format!("branch at {at}: \"optional\" must be an array")]),
    };
    for name in &optional {
        if !fields.contains_key(*name) {
            errors.push(format!("branch at {at}: optional field '{name}' is not declared"));
        }
    }

    let mut branch = Branch::new();
    for (name, raw) in fields {
        match parse_node(raw, &at.child(name.as_str())) {
            Ok(node) if optional.contains(&name.as_str()) => branch = branch.optional(name, node),
            Ok(node) => branch = branch.field(name, node),
            Err(nested) => errors.extend(nested),
        }
    }

    if errors.is_empty() {
        Ok(SchemaNode::Branch(branch))
    } else {
        Err(errors)
    }
}

/// Walks raw document text and records the path of every object key that
/// appears twice in the same object.
struct KeyScan<'a> {
    path: Vec<String>,
    repeats: &'a mut Vec<Vec<String>>,
}

impl<'de> DeserializeSeed<'de> for KeyScan<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for KeyScan<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<(), E> {
        Ok(())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<(), E> {
        Ok(())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<(), E> {
        Ok(())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<(), E> {
        Ok(())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<(), E> {
        Ok(())
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Ok(())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        let KeyScan { path, repeats } = self;
        for index in 0usize.. {
            let mut child = path.clone();
            child.push(index.to_string());
            let scan = KeyScan {
                path: child,
                repeats: &mut *repeats,
            };
            if seq.next_element_seed(scan)?.is_none() {
                break;
            }
        }
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let KeyScan { path, repeats } = self;
        let mut seen = HashSet::new();
        while let Some(key) = map.next_key::<String>()? {
            let mut child = path.clone();
            child.push(key.clone());
            if !seen.insert(key) {
                repeats.push(child.clone());
            }
            map.next_value_seed(KeyScan {
                path: child,
                repeats: &mut *repeats,
            })?;
        }
        Ok(())
    }
}

/// Classify one repeated key by where it sits in the document.
fn repeat_defect(path: &[String]) -> Result<DeclarationDefect, LoadError> {
    let (name, rest) = match path {
        [messages, name, rest @ ..] if messages == "messages" => (name, rest),
        _ => {
            return Err(LoadError::Read(format!(
                "document repeats key '{}'",
                path.join(".")
            )))
        }
    };

    let direction = match rest.first().map(String::as_str) {
        None => return Ok(DeclarationDefect::DuplicateName { name: name.clone() }),
        Some(TO_HOST_KEY) => Some(DirectionKind::ToHost),
        Some(TO_PEER_KEY) => Some(DirectionKind::ToPeer),
        Some(_) => None,
    };
    if let Some(direction) = direction {
        if let Some(field_path) = branch_field_path(&rest[1..]) {
            return Ok(DeclarationDefect::DuplicateField {
                name: name.clone(),
                direction,
                path: field_path,
            });
        }
    }

    Ok(DeclarationDefect::Malformed {
        name: name.clone(),
        reason: format!("repeats key '{}'", rest.join(".")),
    })
}

/// `branch.fields.a.branch.fields.b` is the field path `a.b`.
fn branch_field_path(segments: &[String]) -> Option<FieldPath> {
    if segments.is_empty() || segments.len() % 3 != 0 {
        return None;
    }
    let mut field_path = FieldPath::root();
    for step in segments.chunks(3) {
        match step {
            [branch, fields, field] if branch == "branch" && fields == "fields" => {
                field_path = field_path.child(field.as_str());
            }
            _ => return None,
        }
    }
    Some(field_path)
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}
