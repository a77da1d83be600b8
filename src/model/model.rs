use crate::model::animation::Clip;
use crate::model::mesh::Mesh;
use crate::model::skeleton::{Node, NodeKind};
use std::sync::Arc;

/// Everything a loaded asset contributes: node hierarchy, meshes and clips.
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    pub name: String,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub clips: Vec<Arc<Clip>>,
}

impl LoadedModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn bone_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind == NodeKind::LimbNode).count()
    }

    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }
}
