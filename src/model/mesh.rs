use nalgebra_glm as glm;
use std::collections::HashSet;

/// Vertex influence set of one bone.
#[derive(Debug, Clone)]
pub struct SkinCluster {
    pub bone: usize,
    pub indices: Vec<u32>,
    pub weights: Vec<f32>,
    /// Global transform of the mesh at bind time.
    pub transform: glm::Mat4,
    /// Global transform of the bone at bind time.
    pub transform_link: glm::Mat4,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub node: Option<usize>,
    pub positions: Vec<glm::Vec3>,
    pub edges: Vec<[u32; 2]>,
    pub polygon_count: usize,
    pub clusters: Vec<SkinCluster>,
}

impl Mesh {
    pub fn is_skinned(&self) -> bool {
        !self.clusters.is_empty()
    }
}

/// Splits an FBX polygon index stream (last index of each polygon stored as
/// `!index`) into unique undirected edges. Returns the edges and the number of
/// polygons. Indices outside `vertex_count` are dropped.
pub fn polygon_edges(polygon_vertex_index: &[i64], vertex_count: usize) -> (Vec<[u32; 2]>, usize) {
    let mut seen: HashSet<(u32, u32)> = HashSet::new();
    let mut edges = Vec::new();
    let mut polygon: Vec<u32> = Vec::new();
    let mut polygons = 0;

    let mut push_edge = |a: u32, b: u32, edges: &mut Vec<[u32; 2]>| {
        if a == b {
            return;
        }
        let key = (a.min(b), a.max(b));
        if seen.insert(key) {
            edges.push([key.0, key.1]);
        }
    };

    for &raw in polygon_vertex_index {
        let (index, last) = if raw < 0 { (!raw, true) } else { (raw, false) };
        if (index as usize) < vertex_count {
            polygon.push(index as u32);
        }
        if last {
            if polygon.len() >= 2 {
                for i in 0..polygon.len() {
                    let a = polygon[i];
                    let b = polygon[(i + 1) % polygon.len()];
                    push_edge(a, b, &mut edges);
                }
                polygons += 1;
            }
            polygon.clear();
        }
    }

    (edges, polygons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_and_triangle_share_an_edge() {
        // quad 0-1-2-3 and triangle 2-1-4
        let stream = [0, 1, 2, !3, 2, 1, !4];
        let (edges, polygons) = polygon_edges(&stream, 5);
        assert_eq!(polygons, 2);
        assert_eq!(edges.len(), 6);
        assert!(edges.contains(&[1, 2]));
        assert!(edges.contains(&[0, 3]));
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let stream = [0, 1, !9];
        let (edges, polygons) = polygon_edges(&stream, 2);
        assert_eq!(polygons, 1);
        assert_eq!(edges, vec![[0, 1]]);
    }
}
