// Extraction of nodes, meshes, skins and clips from a parsed FBX tree

use nalgebra_glm as glm;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::LoadError;
use crate::loader::document::{FbxNode, read_document};
use crate::model::mesh::polygon_edges;
use crate::model::{
    Clip, Curve, LoadedModel, LocalTransform, Mesh, Node, NodeKind, SkinCluster, Track,
    TrackProperty,
};

/// FBX `KTime` ticks per second.
pub const KTIME_PER_SECOND: f64 = 46_186_158_000.0;

pub fn parse_fbx(name: &str, bytes: &[u8]) -> Result<LoadedModel, LoadError> {
    let root = read_document(bytes)?;
    build_model(name, &root)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link<'a> {
    Object,
    Property(&'a str),
}

struct Connection<'a> {
    child: i64,
    parent: i64,
    link: Link<'a>,
}

struct Objects<'a> {
    by_id: HashMap<i64, &'a FbxNode>,
    connections: Vec<Connection<'a>>,
}

impl<'a> Objects<'a> {
    fn collect(root: &'a FbxNode) -> Result<Self, LoadError> {
        let objects = root
            .child("Objects")
            .ok_or_else(|| LoadError::Parse("missing Objects section".into()))?;

        let mut by_id = HashMap::new();
        for object in &objects.children {
            if let Some(id) = object.int(0) {
                by_id.insert(id, object);
            }
        }

        let mut connections = Vec::new();
        if let Some(section) = root.child("Connections") {
            for c in section.children_named("C") {
                let (Some(kind), Some(child), Some(parent)) = (c.str(0), c.int(1), c.int(2)) else {
                    continue;
                };
                let link = match kind {
                    "OO" => Link::Object,
                    "OP" => Link::Property(c.str(3).unwrap_or("")),
                    _ => continue,
                };
                connections.push(Connection {
                    child,
                    parent,
                    link,
                });
            }
        }

        Ok(Self { by_id, connections })
    }

    fn of_type(&self, node_name: &'a str) -> impl Iterator<Item = (i64, &'a FbxNode)> + '_ {
        self.by_id
            .iter()
            .filter(move |(_, n)| n.name == node_name)
            .map(|(&id, &n)| (id, n))
    }

    /// Objects of type `node_name` connected below `parent`.
    fn children_of(
        &self,
        parent: i64,
        node_name: &'a str,
    ) -> impl Iterator<Item = (i64, &'a FbxNode, Link<'a>)> + '_ {
        self.connections
            .iter()
            .filter(move |c| c.parent == parent)
            .filter_map(move |c| {
                let node = self.by_id.get(&c.child)?;
                (node.name == node_name).then_some((c.child, *node, c.link))
            })
    }

    /// Objects of type `node_name` that `child` is connected to.
    fn parents_of(
        &self,
        child: i64,
        node_name: &'a str,
    ) -> impl Iterator<Item = (i64, &'a FbxNode, Link<'a>)> + '_ {
        self.connections
            .iter()
            .filter(move |c| c.child == child)
            .filter_map(move |c| {
                let node = self.by_id.get(&c.parent)?;
                (node.name == node_name).then_some((c.parent, *node, c.link))
            })
    }
}

/// `"Hips\0\x01Model"` -> `"Hips"`.
pub fn object_name(node: &FbxNode) -> String {
    let raw = node.str(1).unwrap_or("");
    raw.split('\0').next().unwrap_or("").to_string()
}

fn vec3(v: [f64; 3]) -> glm::Vec3 {
    glm::vec3(v[0] as f32, v[1] as f32, v[2] as f32)
}

fn ktime_to_seconds(ticks: i64) -> f64 {
    ticks as f64 / KTIME_PER_SECOND
}

fn matrix(values: &[f64]) -> Option<glm::Mat4> {
    if values.len() != 16 {
        return None;
    }
    let floats: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    Some(glm::make_mat4(&floats))
}

pub fn build_model(name: &str, root: &FbxNode) -> Result<LoadedModel, LoadError> {
    let objects = Objects::collect(root)?;
    let mut model = LoadedModel::new(name);

    // nodes, sorted by id so indices are stable across runs
    let mut model_ids: Vec<(i64, &FbxNode)> = objects.of_type("Model").collect();
    model_ids.sort_by_key(|(id, _)| *id);

    let mut node_index: HashMap<i64, usize> = HashMap::new();
    for (id, object) in &model_ids {
        let kind = NodeKind::from_class(object.str(2).unwrap_or(""));
        let mut node = Node::new(object_name(object), kind);
        node.bind = read_local_transform(object);
        node_index.insert(*id, model.nodes.len());
        model.nodes.push(node);
    }

    for (id, _) in &model_ids {
        let parent = objects
            .parents_of(*id, "Model")
            .find(|(_, _, link)| *link == Link::Object)
            .and_then(|(pid, _, _)| node_index.get(&pid).copied());
        if let Some(&index) = node_index.get(id) {
            model.nodes[index].parent = parent;
        }
    }

    let mut geometries: Vec<(i64, &FbxNode)> = objects
        .of_type("Geometry")
        .filter(|(_, g)| g.str(2) == Some("Mesh"))
        .collect();
    geometries.sort_by_key(|(id, _)| *id);

    for (id, geometry) in geometries {
        let mut mesh = read_mesh(geometry)?;
        mesh.node = objects
            .parents_of(id, "Model")
            .find_map(|(pid, _, _)| node_index.get(&pid).copied());
        mesh.clusters = read_clusters(&objects, id, &node_index);
        model.meshes.push(mesh);
    }

    let mut stacks: Vec<(i64, &FbxNode)> = objects.of_type("AnimationStack").collect();
    stacks.sort_by_key(|(id, _)| *id);
    for (id, stack) in stacks {
        let clip = read_clip(&objects, id, stack, &node_index);
        log::debug!(
            "clip {:?}: {:.3}s, {} tracks",
            clip.name,
            clip.duration,
            clip.tracks.len()
        );
        model.clips.push(Arc::new(clip));
    }

    log::info!(
        "{}: {} nodes ({} bones), {} meshes, {} clips",
        model.name,
        model.nodes.len(),
        model.bone_count(),
        model.meshes.len(),
        model.clips.len()
    );

    Ok(model)
}

fn read_local_transform(object: &FbxNode) -> LocalTransform {
    let mut t = LocalTransform::default();
    if let Some(v) = object.vec3_property("Lcl Translation") {
        t.translation = vec3(v);
    }
    if let Some(v) = object.vec3_property("PreRotation") {
        t.pre_rotation = vec3(v);
    }
    if let Some(v) = object.vec3_property("Lcl Rotation") {
        t.rotation = vec3(v);
    }
    if let Some(v) = object.vec3_property("Lcl Scaling") {
        t.scaling = vec3(v);
    }
    t
}

fn read_mesh(geometry: &FbxNode) -> Result<Mesh, LoadError> {
    let name = object_name(geometry);
    let vertices = geometry
        .float_array("Vertices")
        .ok_or_else(|| LoadError::Parse(format!("geometry {name} has no Vertices")))?;
    if vertices.len() % 3 != 0 {
        return Err(LoadError::Parse(format!(
            "geometry {name}: {} vertex components",
            vertices.len()
        )));
    }

    let positions: Vec<glm::Vec3> = vertices
        .chunks_exact(3)
        .map(|c| glm::vec3(c[0] as f32, c[1] as f32, c[2] as f32))
        .collect();

    let (edges, polygon_count) = match geometry.int_array("PolygonVertexIndex") {
        Some(indices) => polygon_edges(indices, positions.len()),
        None => (Vec::new(), 0),
    };

    Ok(Mesh {
        name,
        node: None,
        positions,
        edges,
        polygon_count,
        clusters: Vec::new(),
    })
}

fn read_clusters(
    objects: &Objects<'_>,
    geometry: i64,
    node_index: &HashMap<i64, usize>,
) -> Vec<SkinCluster> {
    let mut clusters = Vec::new();

    for (skin_id, skin, _) in objects.children_of(geometry, "Deformer") {
        if skin.str(2) != Some("Skin") {
            continue;
        }
        for (cluster_id, cluster, _) in objects.children_of(skin_id, "Deformer") {
            if cluster.str(2) != Some("Cluster") {
                continue;
            }
            let Some(bone) = objects
                .children_of(cluster_id, "Model")
                .find_map(|(bid, _, _)| node_index.get(&bid).copied())
            else {
                log::debug!("cluster {} has no bone", object_name(cluster));
                continue;
            };

            let indices: Vec<u32> = cluster
                .int_array("Indexes")
                .unwrap_or(&[])
                .iter()
                .filter(|&&i| i >= 0)
                .map(|&i| i as u32)
                .collect();
            let weights: Vec<f32> = cluster
                .float_array("Weights")
                .unwrap_or(&[])
                .iter()
                .map(|&w| w as f32)
                .collect();
            let transform = cluster
                .float_array("Transform")
                .and_then(matrix)
                .unwrap_or_else(glm::identity);
            let transform_link = cluster
                .float_array("TransformLink")
                .and_then(matrix)
                .unwrap_or_else(glm::identity);

            clusters.push(SkinCluster {
                bone,
                indices,
                weights,
                transform,
                transform_link,
            });
        }
    }

    clusters
}

fn read_clip(
    objects: &Objects<'_>,
    stack_id: i64,
    stack: &FbxNode,
    node_index: &HashMap<i64, usize>,
) -> Clip {
    let start = stack.int_property("LocalStart").unwrap_or(0);
    let stop = stack.int_property("LocalStop");

    let mut clip = Clip::new(object_name(stack), 0.0);

    for (layer_id, _, _) in objects.children_of(stack_id, "AnimationLayer") {
        for (curve_node_id, _, _) in objects.children_of(layer_id, "AnimationCurveNode") {
            let target = objects.parents_of(curve_node_id, "Model").find_map(|(mid, _, link)| {
                let Link::Property(prop) = link else {
                    return None;
                };
                Some((node_index.get(&mid).copied()?, TrackProperty::from_fbx(prop)?))
            });
            let Some((node, property)) = target else {
                continue;
            };

            let mut channels: [Option<Curve>; 3] = [None, None, None];
            for (_, curve, link) in objects.children_of(curve_node_id, "AnimationCurve") {
                let axis = match link {
                    Link::Property("d|X") => 0,
                    Link::Property("d|Y") => 1,
                    Link::Property("d|Z") => 2,
                    _ => continue,
                };
                channels[axis] = read_curve(curve, start);
            }

            if channels.iter().any(Option::is_some) {
                clip.tracks.push(Track {
                    node,
                    property,
                    channels,
                });
            }
        }
    }

    let keyed_end = clip
        .tracks
        .iter()
        .flat_map(|t| t.channels.iter().flatten())
        .map(Curve::end_time)
        .fold(0.0_f32, f32::max);

    clip.duration = match stop {
        Some(stop) if stop > start => ktime_to_seconds(stop - start) as f32,
        _ => keyed_end,
    };
    clip
}

fn read_curve(curve: &FbxNode, start: i64) -> Option<Curve> {
    let times = curve.int_array("KeyTime")?;
    let values = curve.float_array("KeyValueFloat")?;
    if times.is_empty() || times.len() != values.len() {
        return None;
    }
    Some(Curve::new(
        times
            .iter()
            .map(|&t| ktime_to_seconds(t - start) as f32)
            .collect(),
        values.iter().map(|&v| v as f32).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::document::Attr;

    const SECOND: i64 = 46_186_158_000;

    fn s(v: &str) -> Attr {
        Attr::Str(v.to_string())
    }

    fn object(kind: &str, id: i64, name: &str, class: &str) -> FbxNode {
        FbxNode::new(
            kind,
            vec![Attr::Int(id), s(&format!("{name}\0\x01{kind}")), s(class)],
        )
    }

    fn p70(props: Vec<FbxNode>) -> FbxNode {
        FbxNode::new("Properties70", vec![]).with_children(props)
    }

    fn p_vec3(name: &str, v: [f64; 3]) -> FbxNode {
        FbxNode::new(
            "P",
            vec![
                s(name),
                s(name),
                s(""),
                s("A"),
                Attr::Float(v[0]),
                Attr::Float(v[1]),
                Attr::Float(v[2]),
            ],
        )
    }

    fn p_time(name: &str, ticks: i64) -> FbxNode {
        FbxNode::new(
            "P",
            vec![s(name), s("KTime"), s("Time"), s(""), Attr::Int(ticks)],
        )
    }

    fn oo(child: i64, parent: i64) -> FbxNode {
        FbxNode::new("C", vec![s("OO"), Attr::Int(child), Attr::Int(parent)])
    }

    fn op(child: i64, parent: i64, prop: &str) -> FbxNode {
        FbxNode::new(
            "C",
            vec![s("OP"), Attr::Int(child), Attr::Int(parent), s(prop)],
        )
    }

    fn array_f(name: &str, v: Vec<f64>) -> FbxNode {
        FbxNode::new(name, vec![Attr::FloatArray(v)])
    }

    fn array_i(name: &str, v: Vec<i64>) -> FbxNode {
        FbxNode::new(name, vec![Attr::IntArray(v)])
    }

    fn identity16() -> Vec<f64> {
        let mut m = vec![0.0; 16];
        for i in 0..4 {
            m[i * 5] = 1.0;
        }
        m
    }

    /// Hips (root) -> Spine, a triangle skinned to Spine, one 2 s clip that
    /// slides Spine along X.
    fn document() -> FbxNode {
        let hips = object("Model", 10, "Hips", "LimbNode").with_children(vec![p70(vec![
            p_vec3("Lcl Translation", [0.0, 100.0, 0.0]),
        ])]);
        let spine = object("Model", 11, "Spine", "LimbNode").with_children(vec![p70(vec![
            p_vec3("Lcl Translation", [0.0, 10.0, 0.0]),
            p_vec3("Lcl Rotation", [0.0, 0.0, 45.0]),
        ])]);
        let body = object("Model", 12, "Body", "Mesh");
        let geometry = object("Geometry", 20, "BodyGeo", "Mesh").with_children(vec![
            array_f("Vertices", vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            array_i("PolygonVertexIndex", vec![0, 1, !2]),
        ]);
        let skin = object("Deformer", 30, "Skin", "Skin");
        let cluster = object("Deformer", 31, "Cluster Spine", "Cluster").with_children(vec![
            array_i("Indexes", vec![0, 1, 2]),
            array_f("Weights", vec![1.0, 1.0, 0.5]),
            array_f("Transform", identity16()),
            array_f("TransformLink", identity16()),
        ]);
        let stack = object("AnimationStack", 40, "mixamo.com", "").with_children(vec![p70(vec![
            p_time("LocalStart", 0),
            p_time("LocalStop", 2 * SECOND),
        ])]);
        let layer = object("AnimationLayer", 41, "BaseLayer", "");
        let curve_node = object("AnimationCurveNode", 42, "T", "");
        let curve_x = object("AnimationCurve", 43, "", "").with_children(vec![
            array_i("KeyTime", vec![0, 2 * SECOND]),
            array_f("KeyValueFloat", vec![0.0, 20.0]),
        ]);

        let objects = FbxNode::new("Objects", vec![]).with_children(vec![
            hips, spine, body, geometry, skin, cluster, stack, layer, curve_node, curve_x,
        ]);
        let connections = FbxNode::new("Connections", vec![]).with_children(vec![
            oo(10, 0),
            oo(11, 10),
            oo(12, 0),
            oo(20, 12),
            oo(30, 20),
            oo(31, 30),
            oo(11, 31),
            oo(41, 40),
            oo(42, 41),
            op(42, 11, "Lcl Translation"),
            op(43, 42, "d|X"),
        ]);

        FbxNode::new("", vec![]).with_children(vec![objects, connections])
    }

    #[test]
    fn nodes_and_hierarchy() {
        let model = build_model("test", &document()).unwrap();
        assert_eq!(model.nodes.len(), 3);
        assert_eq!(model.bone_count(), 2);

        let hips = model.find_node("Hips").unwrap();
        let spine = model.find_node("Spine").unwrap();
        assert_eq!(model.nodes[hips].parent, None);
        assert_eq!(model.nodes[spine].parent, Some(hips));
        assert_eq!(model.nodes[spine].bind.rotation, glm::vec3(0.0, 0.0, 45.0));
        assert_eq!(model.nodes[model.find_node("Body").unwrap()].kind, NodeKind::Mesh);
    }

    #[test]
    fn mesh_geometry_and_skin() {
        let model = build_model("test", &document()).unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "BodyGeo");
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.polygon_count, 1);
        assert_eq!(mesh.edges.len(), 3);
        assert_eq!(mesh.node, model.find_node("Body"));

        assert_eq!(mesh.clusters.len(), 1);
        let cluster = &mesh.clusters[0];
        assert_eq!(Some(cluster.bone), model.find_node("Spine"));
        assert_eq!(cluster.indices, vec![0, 1, 2]);
        assert_eq!(cluster.weights, vec![1.0, 1.0, 0.5]);
    }

    #[test]
    fn stack_becomes_clip_with_interpolated_track() {
        let model = build_model("test", &document()).unwrap();
        assert_eq!(model.clips.len(), 1);
        let clip = &model.clips[0];
        assert_eq!(clip.name, "mixamo.com");
        assert!((clip.duration - 2.0).abs() < 1e-6);

        assert_eq!(clip.tracks.len(), 1);
        let track = &clip.tracks[0];
        assert_eq!(Some(track.node), model.find_node("Spine"));
        assert_eq!(track.property, TrackProperty::Translation);
        assert!(track.channels[1].is_none());
        let x = track.channels[0].as_ref().unwrap();
        assert!((x.sample(0.5).unwrap() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn clip_without_stop_uses_last_key() {
        let mut doc = document();
        let objects = doc.children.iter_mut().find(|c| c.name == "Objects").unwrap();
        let stack = objects
            .children
            .iter_mut()
            .find(|c| c.name == "AnimationStack")
            .unwrap();
        stack.children.clear();

        let model = build_model("test", &doc).unwrap();
        assert!((model.clips[0].duration - 2.0).abs() < 1e-6);
    }

    #[test]
    fn model_without_stacks_has_no_clips() {
        let mut doc = document();
        let objects = doc.children.iter_mut().find(|c| c.name == "Objects").unwrap();
        objects.children.retain(|c| !c.name.starts_with("Animation"));

        let model = build_model("static", &doc).unwrap();
        assert!(model.clips.is_empty());
        assert_eq!(model.meshes.len(), 1);
    }

    #[test]
    fn missing_objects_section_is_a_parse_error() {
        let err = build_model("empty", &FbxNode::default()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn object_names_drop_the_class_suffix() {
        let node = object("Model", 1, "mixamorig:Hips", "LimbNode");
        assert_eq!(object_name(&node), "mixamorig:Hips");
    }
}
