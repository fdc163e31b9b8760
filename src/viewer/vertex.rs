use crate::common::{Semantic, VertexFormat};

/// A fixed-layout vertex record whose field order matches the shader's
/// attribute locations.
pub trait Vertex: bytemuck::Pod {
    const FIELDS: &'static [(Semantic, VertexFormat)];

    fn desc<'a>() -> wgpu::VertexBufferLayout<'a>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct VertexPos {
    position: glm::Vec3,
}

unsafe impl bytemuck::Zeroable for VertexPos {}

unsafe impl bytemuck::Pod for VertexPos {}

impl VertexPos {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    /// Takes the first three components, `None` for shorter slices.
    pub fn from_components(position: &[f32]) -> Option<Self> {
        match position {
            [x, y, z, ..] => Some(VertexPos {
                position: glm::vec3(*x, *y, *z),
            }),
            _ => None,
        }
    }
}

impl Vertex for VertexPos {
    const FIELDS: &'static [(Semantic, VertexFormat)] = &[(Semantic::Position, VertexFormat::Float3)];

    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexPos>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexPosNorm {
    pub position: glm::Vec4,
    pub normal: glm::Vec3,
}

unsafe impl bytemuck::Zeroable for VertexPosNorm {}

unsafe impl bytemuck::Pod for VertexPosNorm {}

impl From<(&glm::Vec4, &glm::Vec3)> for VertexPosNorm {
    fn from(pair: (&glm::Vec4, &glm::Vec3)) -> Self {
        let (position, normal) = pair;
        VertexPosNorm {
            position: *position,
            normal: *normal,
        }
    }
}

impl VertexPosNorm {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x3];
}

impl Vertex for VertexPosNorm {
    const FIELDS: &'static [(Semantic, VertexFormat)] = &[
        (Semantic::Position, VertexFormat::Float4),
        (Semantic::Normal, VertexFormat::Float3),
    ];

    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VertexPosNorm>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_pos_norm_layout() {
        assert_eq!(std::mem::size_of::<VertexPosNorm>(), 28);
        let desc = VertexPosNorm::desc();
        assert_eq!(desc.array_stride, 28);
        assert_eq!(desc.attributes[1].offset, 16);
        assert_eq!(desc.attributes[1].shader_location, 1);
        assert_eq!(desc.attributes[1].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn test_vertex_pos_from_components() {
        let homogeneous = VertexPos::from_components(&[1.0, 2.0, 3.0, 1.0]).unwrap();
        assert_eq!(homogeneous.position, glm::vec3(1.0, 2.0, 3.0));
        assert!(VertexPos::from_components(&[1.0, 2.0]).is_none());
        assert!(VertexPos::from_components(&[]).is_none());
    }
}
