use nalgebra_glm as glm;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub(crate) position: [f32; 3],
    pub(crate) color: [f32; 3],
}

impl LineVertex {
    pub fn new(position: &glm::Vec3, color: [f32; 3]) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Appends one segment to a line list.
pub fn push_line(out: &mut Vec<LineVertex>, a: &glm::Vec3, b: &glm::Vec3, color: [f32; 3]) {
    out.push(LineVertex::new(a, color));
    out.push(LineVertex::new(b, color));
}
