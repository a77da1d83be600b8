// Owned copy of an FBX node tree, detached from the parser's arena

use fbxcel::low::v7400::AttributeValue;
use fbxcel::tree::any::AnyTree;
use fbxcel::tree::v7400::NodeHandle;
use std::io::Cursor;

use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Bool(bool),
    Int(i64),
    Float(f64),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    Str(String),
    Binary,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FbxNode {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub children: Vec<FbxNode>,
}

impl FbxNode {
    pub fn new(name: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self {
            name: name.into(),
            attrs,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<FbxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn child(&self, name: &str) -> Option<&FbxNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FbxNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn int(&self, index: usize) -> Option<i64> {
        match self.attrs.get(index)? {
            Attr::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, index: usize) -> Option<f64> {
        match self.attrs.get(index)? {
            Attr::Float(v) => Some(*v),
            Attr::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn str(&self, index: usize) -> Option<&str> {
        match self.attrs.get(index)? {
            Attr::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// First attribute of child `name` as a float array.
    pub fn float_array(&self, name: &str) -> Option<&[f64]> {
        match self.child(name)?.attrs.first()? {
            Attr::FloatArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// First attribute of child `name` as an integer array.
    pub fn int_array(&self, name: &str) -> Option<&[i64]> {
        match self.child(name)?.attrs.first()? {
            Attr::IntArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// A `P` record of the node's `Properties70` block.
    pub fn property(&self, name: &str) -> Option<&FbxNode> {
        self.child("Properties70")?
            .children_named("P")
            .find(|p| p.str(0) == Some(name))
    }

    /// Three float values of a `P` record (they start at attribute 4).
    pub fn vec3_property(&self, name: &str) -> Option<[f64; 3]> {
        let p = self.property(name)?;
        Some([p.float(4)?, p.float(5)?, p.float(6)?])
    }

    pub fn int_property(&self, name: &str) -> Option<i64> {
        self.property(name)?.int(4)
    }
}

/// Parse binary FBX bytes into an owned tree. The returned node is the
/// implicit root whose children are the top-level sections.
pub fn read_document(bytes: &[u8]) -> Result<FbxNode, LoadError> {
    let tree = AnyTree::from_seekable_reader(Cursor::new(bytes))
        .map_err(|e| LoadError::Parse(e.to_string()))?;

    match tree {
        AnyTree::V7400(version, tree, _footer) => {
            log::debug!("FBX version {:?}", version);
            Ok(convert(tree.root()))
        }
        _ => Err(LoadError::Unsupported("non-7.4 tree".to_string())),
    }
}

fn convert(node: NodeHandle<'_>) -> FbxNode {
    FbxNode {
        name: node.name().to_string(),
        attrs: node.attributes().iter().map(convert_attr).collect(),
        children: node.children().map(convert).collect(),
    }
}

fn convert_attr(value: &AttributeValue) -> Attr {
    match value {
        AttributeValue::Bool(v) => Attr::Bool(*v),
        AttributeValue::I16(v) => Attr::Int(i64::from(*v)),
        AttributeValue::I32(v) => Attr::Int(i64::from(*v)),
        AttributeValue::I64(v) => Attr::Int(*v),
        AttributeValue::F32(v) => Attr::Float(f64::from(*v)),
        AttributeValue::F64(v) => Attr::Float(*v),
        AttributeValue::ArrI32(v) => Attr::IntArray(v.iter().map(|&x| i64::from(x)).collect()),
        AttributeValue::ArrI64(v) => Attr::IntArray(v.clone()),
        AttributeValue::ArrF32(v) => Attr::FloatArray(v.iter().map(|&x| f64::from(x)).collect()),
        AttributeValue::ArrF64(v) => Attr::FloatArray(v.clone()),
        AttributeValue::String(v) => Attr::Str(v.clone()),
        _ => Attr::Binary,
    }
}
