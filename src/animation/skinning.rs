// CPU skinning of mesh positions against posed bone matrices

use crate::model::Mesh;
use nalgebra_glm as glm;

/// World-space positions of `mesh` for the given global node matrices.
///
/// Each cluster moves its vertices by `bone_now * inverse(bone_bind) *
/// mesh_bind`; contributions are averaged by total weight. Vertices without
/// influences (and meshes without a skin) follow the mesh node.
pub fn skin_positions(mesh: &Mesh, globals: &[glm::Mat4], root: &glm::Mat4) -> Vec<glm::Vec3> {
    let mesh_global = mesh
        .node
        .and_then(|n| globals.get(n))
        .copied()
        .unwrap_or(*root);

    let rigid = |p: &glm::Vec3| transform_point(&mesh_global, p);

    if !mesh.is_skinned() {
        return mesh.positions.iter().map(rigid).collect();
    }

    let mut sums = vec![glm::vec3(0.0, 0.0, 0.0); mesh.positions.len()];
    let mut weights = vec![0.0_f32; mesh.positions.len()];

    for cluster in &mesh.clusters {
        let Some(bone_now) = globals.get(cluster.bone) else {
            continue;
        };
        let Some(link_inverse) = cluster.transform_link.try_inverse() else {
            continue;
        };
        let deform = bone_now * link_inverse * cluster.transform;

        for (&index, &weight) in cluster.indices.iter().zip(&cluster.weights) {
            let index = index as usize;
            if index >= mesh.positions.len() || weight <= 0.0 {
                continue;
            }
            sums[index] += transform_point(&deform, &mesh.positions[index]) * weight;
            weights[index] += weight;
        }
    }

    mesh.positions
        .iter()
        .zip(sums.iter().zip(&weights))
        .map(|(p, (sum, &w))| if w > 0.0 { *sum / w } else { rigid(p) })
        .collect()
}

pub fn transform_point(m: &glm::Mat4, p: &glm::Vec3) -> glm::Vec3 {
    let v = m * glm::vec4(p.x, p.y, p.z, 1.0);
    glm::vec3(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SkinCluster;

    fn one_bone_mesh() -> Mesh {
        Mesh {
            name: "Body".into(),
            node: None,
            positions: vec![glm::vec3(1.0, 0.0, 0.0), glm::vec3(0.0, 2.0, 0.0)],
            edges: vec![[0, 1]],
            polygon_count: 0,
            clusters: vec![SkinCluster {
                bone: 0,
                indices: vec![0],
                weights: vec![1.0],
                transform: glm::identity(),
                transform_link: glm::identity(),
            }],
        }
    }

    #[test]
    fn bind_pose_leaves_vertices_in_place() {
        let mesh = one_bone_mesh();
        let out = skin_positions(&mesh, &[glm::identity()], &glm::identity());
        assert!((out[0] - glm::vec3(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn moved_bone_carries_weighted_vertex_only() {
        let mesh = one_bone_mesh();
        let bone = glm::translation(&glm::vec3(0.0, 0.0, 3.0));
        let out = skin_positions(&mesh, &[bone], &glm::identity());
        assert!((out[0] - glm::vec3(1.0, 0.0, 3.0)).norm() < 1e-6);
        // vertex 1 has no influence and follows the (root) mesh transform
        assert!((out[1] - glm::vec3(0.0, 2.0, 0.0)).norm() < 1e-6);
    }
}
