// Line-list geometry: ground grid, posed skeleton and skinned wireframe

use nalgebra_glm as glm;

use crate::animation::skin_positions;
use crate::model::LoadedModel;
use crate::renderer::line_vertex::{LineVertex, push_line};

const GRID_MAJOR: [f32; 3] = [0.35, 0.35, 0.35];
const GRID_MINOR: [f32; 3] = [0.18, 0.18, 0.18];
const AXIS_X: [f32; 3] = [0.8, 0.2, 0.2];
const AXIS_Z: [f32; 3] = [0.2, 0.4, 0.8];
const BONE: [f32; 3] = [1.0, 0.8, 0.2];
const WIRE: [f32; 3] = [0.6, 0.75, 0.9];

/// Square grid on the XZ plane, `half_extent` metres each way. Every fifth
/// line is a major line, the two through the origin are the axes.
pub fn grid_lines(half_extent: f32, step: f32) -> Vec<LineVertex> {
    let mut out = Vec::new();
    if step <= 0.0 || half_extent <= 0.0 {
        return out;
    }

    let count = (half_extent / step).floor() as i32;
    for i in -count..=count {
        let offset = i as f32 * step;
        let (color_x, color_z) = if i == 0 {
            (AXIS_X, AXIS_Z)
        } else if i % 5 == 0 {
            (GRID_MAJOR, GRID_MAJOR)
        } else {
            (GRID_MINOR, GRID_MINOR)
        };
        // parallel to X
        push_line(
            &mut out,
            &glm::vec3(-half_extent, 0.0, offset),
            &glm::vec3(half_extent, 0.0, offset),
            color_x,
        );
        // parallel to Z
        push_line(
            &mut out,
            &glm::vec3(offset, 0.0, -half_extent),
            &glm::vec3(offset, 0.0, half_extent),
            color_z,
        );
    }
    out
}

fn origin(m: &glm::Mat4) -> glm::Vec3 {
    glm::vec3(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

/// One segment from every bone to its parent bone.
pub fn skeleton_lines(model: &LoadedModel, globals: &[glm::Mat4], out: &mut Vec<LineVertex>) {
    for (i, node) in model.nodes.iter().enumerate() {
        let Some(parent) = node.parent else {
            continue;
        };
        if !node.is_bone() || !model.nodes.get(parent).is_some_and(|p| p.is_bone()) {
            continue;
        }
        if let (Some(child), Some(parent)) = (globals.get(i), globals.get(parent)) {
            push_line(out, &origin(parent), &origin(child), BONE);
        }
    }
}

/// Wireframe of every mesh, skinned against `globals`.
pub fn mesh_lines(
    model: &LoadedModel,
    globals: &[glm::Mat4],
    root: &glm::Mat4,
    out: &mut Vec<LineVertex>,
) {
    for mesh in &model.meshes {
        let positions = skin_positions(mesh, globals, root);
        for [a, b] in &mesh.edges {
            if let (Some(pa), Some(pb)) = (positions.get(*a as usize), positions.get(*b as usize)) {
                push_line(out, pa, pb, WIRE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Pose;
    use crate::model::{Mesh, Node, NodeKind};

    #[test]
    fn grid_has_two_lines_per_step() {
        let grid = grid_lines(1.0, 0.5);
        // offsets -1, -0.5, 0, 0.5, 1; two lines each, two vertices per line
        assert_eq!(grid.len(), 5 * 2 * 2);
        assert!(grid.iter().all(|v| v.position[1] == 0.0));
        assert!(grid_lines(1.0, 0.0).is_empty());
    }

    fn two_bones_and_a_null() -> LoadedModel {
        let mut model = LoadedModel::new("rig");
        let root = Node::new("Armature", NodeKind::Null);
        let mut hips = Node::new("Hips", NodeKind::LimbNode);
        hips.parent = Some(0);
        let mut spine = Node::new("Spine", NodeKind::LimbNode);
        spine.parent = Some(1);
        spine.bind.translation = glm::vec3(0.0, 1.0, 0.0);
        model.nodes = vec![root, hips, spine];
        model
    }

    #[test]
    fn skeleton_connects_bones_only() {
        let model = two_bones_and_a_null();
        let globals = Pose::bind(&model).global_matrices(&model, &glm::identity());
        let mut out = Vec::new();
        skeleton_lines(&model, &globals, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(out[1].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn mesh_wireframe_uses_edges() {
        let mut model = LoadedModel::new("tri");
        model.meshes.push(Mesh {
            name: "tri".into(),
            positions: vec![
                glm::vec3(0.0, 0.0, 0.0),
                glm::vec3(1.0, 0.0, 0.0),
                glm::vec3(0.0, 1.0, 0.0),
            ],
            edges: vec![[0, 1], [1, 2], [0, 2], [2, 9]],
            polygon_count: 1,
            ..Default::default()
        });
        let mut out = Vec::new();
        mesh_lines(&model, &[], &glm::identity(), &mut out);
        assert_eq!(out.len(), 6);
    }
}
