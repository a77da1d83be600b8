pub mod animation;
pub mod mesh;
pub mod model;
pub mod skeleton;

pub use animation::{Clip, Curve, Track, TrackProperty};
pub use mesh::{Mesh, SkinCluster};
pub use model::LoadedModel;
pub use skeleton::{LocalTransform, Node, NodeKind};
