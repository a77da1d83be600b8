// Local node transforms of a model at one instant, and their resolution into
// global matrices (parents first, like the bone hierarchy pass)

use crate::model::skeleton::euler_degrees_to_quat;
use crate::model::{LoadedModel, Node};
use nalgebra_glm as glm;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePose {
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scaling: glm::Vec3,
}

impl NodePose {
    pub fn from_bind(node: &Node) -> Self {
        Self {
            translation: node.bind.translation,
            rotation: Self::rotation_of(&node.bind.pre_rotation, &node.bind.rotation),
            scaling: node.bind.scaling,
        }
    }

    pub fn rotation_of(pre_rotation: &glm::Vec3, rotation: &glm::Vec3) -> glm::Quat {
        euler_degrees_to_quat(pre_rotation) * euler_degrees_to_quat(rotation)
    }

    pub fn matrix(&self) -> glm::Mat4 {
        glm::translation(&self.translation)
            * glm::quat_to_mat4(&self.rotation)
            * glm::scaling(&self.scaling)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pose {
    pub locals: Vec<NodePose>,
}

impl Pose {
    pub fn bind(model: &LoadedModel) -> Self {
        Self {
            locals: model.nodes.iter().map(NodePose::from_bind).collect(),
        }
    }

    /// Global matrix of every node. Root nodes are placed under `root`.
    /// A parent cycle in malformed data is cut by treating the offending node
    /// as a root.
    pub fn global_matrices(&self, model: &LoadedModel, root: &glm::Mat4) -> Vec<glm::Mat4> {
        let count = model.nodes.len().min(self.locals.len());
        let mut globals: Vec<Option<glm::Mat4>> = vec![None; count];
        let mut visiting = vec![false; count];

        for i in 0..count {
            resolve(i, model, &self.locals, root, &mut globals, &mut visiting);
        }

        globals
            .into_iter()
            .map(|m| m.unwrap_or_else(|| *root))
            .collect()
    }
}

fn resolve(
    index: usize,
    model: &LoadedModel,
    locals: &[NodePose],
    root: &glm::Mat4,
    globals: &mut [Option<glm::Mat4>],
    visiting: &mut [bool],
) -> glm::Mat4 {
    if let Some(m) = globals[index] {
        return m;
    }

    visiting[index] = true;
    let parent = match model.nodes[index].parent {
        Some(p) if p < globals.len() && !visiting[p] => {
            resolve(p, model, locals, root, globals, visiting)
        }
        _ => *root,
    };
    visiting[index] = false;

    let global = parent * locals[index].matrix();
    globals[index] = Some(global);
    global
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    fn chain() -> LoadedModel {
        let mut model = LoadedModel::new("chain");
        // child listed before its parents on purpose
        let mut head = Node::new("Head", NodeKind::LimbNode);
        head.parent = Some(2);
        head.bind.translation = glm::vec3(0.0, 0.25, 0.0);
        let mut hips = Node::new("Hips", NodeKind::LimbNode);
        hips.bind.translation = glm::vec3(0.0, 1.0, 0.0);
        let mut spine = Node::new("Spine", NodeKind::LimbNode);
        spine.parent = Some(1);
        spine.bind.translation = glm::vec3(0.0, 0.5, 0.0);
        model.nodes = vec![head, hips, spine];
        model
    }

    fn origin(m: &glm::Mat4) -> glm::Vec3 {
        glm::vec3(m[(0, 3)], m[(1, 3)], m[(2, 3)])
    }

    #[test]
    fn globals_compose_parent_chain() {
        let model = chain();
        let globals = Pose::bind(&model).global_matrices(&model, &glm::identity());
        assert!((origin(&globals[0]).y - 1.75).abs() < 1e-5);
        assert!((origin(&globals[2]).y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn root_transform_is_applied_to_roots() {
        let model = chain();
        let root = glm::scaling(&glm::vec3(0.01, 0.01, 0.01));
        let globals = Pose::bind(&model).global_matrices(&model, &root);
        assert!((origin(&globals[1]).y - 0.01).abs() < 1e-6);
    }

    #[test]
    fn parent_cycle_does_not_recurse_forever() {
        let mut model = chain();
        model.nodes[1].parent = Some(0);
        let globals = Pose::bind(&model).global_matrices(&model, &glm::identity());
        assert_eq!(globals.len(), 3);
    }

    #[test]
    fn rotation_of_applies_x_before_z() {
        let q = NodePose::rotation_of(&glm::vec3(0.0, 0.0, 0.0), &glm::vec3(90.0, 0.0, 90.0));
        let v = glm::quat_rotate_vec3(&q, &glm::vec3(0.0, 1.0, 0.0));
        // Rx(90) takes +Y to +Z, Rz(90) leaves +Z alone
        assert!((v - glm::vec3(0.0, 0.0, 1.0)).norm() < 1e-5);
    }
}
