use nalgebra_glm as glm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mesh,
    LimbNode,
    Null,
    Other,
}

impl NodeKind {
    pub fn from_class(class: &str) -> Self {
        match class {
            "Mesh" => NodeKind::Mesh,
            "LimbNode" => NodeKind::LimbNode,
            "Null" | "Root" => NodeKind::Null,
            _ => NodeKind::Other,
        }
    }
}

/// Local bind transform of a node, as authored.
/// Rotations are XYZ Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub translation: glm::Vec3,
    pub pre_rotation: glm::Vec3,
    pub rotation: glm::Vec3,
    pub scaling: glm::Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            translation: glm::vec3(0.0, 0.0, 0.0),
            pre_rotation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::vec3(0.0, 0.0, 0.0),
            scaling: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<usize>,
    pub bind: LocalTransform,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            bind: LocalTransform::default(),
        }
    }

    pub fn is_bone(&self) -> bool {
        self.kind == NodeKind::LimbNode
    }
}

/// Euler XYZ (degrees) to quaternion: X is applied first, then Y, then Z.
pub fn euler_degrees_to_quat(angles: &glm::Vec3) -> glm::Quat {
    let qx = glm::quat_angle_axis(angles.x.to_radians(), &glm::vec3(1.0, 0.0, 0.0));
    let qy = glm::quat_angle_axis(angles.y.to_radians(), &glm::vec3(0.0, 1.0, 0.0));
    let qz = glm::quat_angle_axis(angles.z.to_radians(), &glm::vec3(0.0, 0.0, 1.0));
    qz * qy * qx
}
