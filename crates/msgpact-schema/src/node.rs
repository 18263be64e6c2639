use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::leaf::Leaf;
use crate::path::FieldPath;

/// A node of a declared message schema.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Opaque externally validated value.
    Leaf(Arc<dyn Leaf>),
    /// Keyed aggregate of child nodes.
    Branch(Branch),
    /// A JSON literal whose own structure is the shape.
    Passthrough(Value),
}

impl SchemaNode {
    /// Wrap a leaf validator.
    pub fn leaf(leaf: impl Leaf + 'static) -> Self {
        Self::Leaf(Arc::new(leaf))
    }

    /// Use a JSON literal as its own shape.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Passthrough(value.into())
    }

    /// Paths of branch fields whose name repeats an earlier sibling.
    ///
    /// Leaves are opaque and literals cannot repeat keys, so only branches
    /// contribute.
    pub fn duplicate_fields(&self) -> Vec<FieldPath> {
        let mut duplicates = Vec::new();
        collect_duplicates(self, &FieldPath::root(), &mut duplicates);
        duplicates
    }
}

impl From<Branch> for SchemaNode {
    fn from(branch: Branch) -> Self {
        Self::Branch(branch)
    }
}

impl From<Value> for SchemaNode {
    fn from(value: Value) -> Self {
        Self::Passthrough(value)
    }
}

/// Ordered field declarations of a structural node.
#[derive(Debug, Clone, Default)]
pub struct Branch {
    fields: Vec<BranchField>,
}

/// One named child of a [`Branch`].
#[derive(Debug, Clone)]
pub struct BranchField {
    pub name: String,
    pub node: SchemaNode,
    /// Absent values are accepted for optional fields.
    pub optional: bool,
}

impl Branch {
    /// An empty branch, the shape of a structurally empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a required field.
    pub fn field(self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.push(name.into(), node.into(), false)
    }

    /// Append an optional field.
    pub fn optional(self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.push(name.into(), node.into(), true)
    }

    fn push(mut self, name: String, node: SchemaNode, optional: bool) -> Self {
        self.fields.push(BranchField {
            name,
            node,
            optional,
        });
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[BranchField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn collect_duplicates(node: &SchemaNode, at: &FieldPath, out: &mut Vec<FieldPath>) {
    let SchemaNode::Branch(branch) = node else {
        return;
    };

    let mut seen = HashSet::new();
    for field in branch.fields() {
        let path = at.child(field.name.as_str());
        if !seen.insert(field.name.as_str()) {
            out.push(path);
            continue;
        }
        collect_duplicates(&field.node, &path, out);
    }
}
