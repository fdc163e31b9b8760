use std::fmt;

/// Vertex attribute meaning, used to look up arrays in a `RawMeshData` and
/// to name fields of an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    Normal,
    TexCoord,
    Color,
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Semantic::Position => "position",
            Semantic::Normal => "normal",
            Semantic::TexCoord => "texture coordinates",
            Semantic::Color => "color",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float2,
    Float3,
    Float4,
}

impl VertexFormat {
    pub fn components(self) -> usize {
        match self {
            VertexFormat::Float2 => 2,
            VertexFormat::Float3 => 3,
            VertexFormat::Float4 => 4,
        }
    }

    pub fn size(self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }

    pub fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            VertexFormat::Float2 => wgpu::VertexFormat::Float32x2,
            VertexFormat::Float3 => wgpu::VertexFormat::Float32x3,
            VertexFormat::Float4 => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// A flat array of fixed-size float tuples, one tuple per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeArray {
    format: VertexFormat,
    data: Vec<f32>,
}

impl AttributeArray {
    /// Panics if `data` does not hold a whole number of tuples.
    pub fn new(format: VertexFormat, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len() % format.components(),
            0,
            "attribute data is not a multiple of {} components",
            format.components()
        );
        AttributeArray { format, data }
    }

    pub fn from_vec2(values: &[glm::Vec2]) -> Self {
        Self::new(
            VertexFormat::Float2,
            values.iter().flat_map(|v| v.iter().copied()).collect(),
        )
    }

    pub fn from_vec3(values: &[glm::Vec3]) -> Self {
        Self::new(
            VertexFormat::Float3,
            values.iter().flat_map(|v| v.iter().copied()).collect(),
        )
    }

    pub fn from_vec4(values: &[glm::Vec4]) -> Self {
        Self::new(
            VertexFormat::Float4,
            values.iter().flat_map(|v| v.iter().copied()).collect(),
        )
    }

    pub fn format(&self) -> VertexFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.format.components()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, i: usize) -> &[f32] {
        let n = self.format.components();
        &self.data[i * n..(i + 1) * n]
    }
}

/// Mesh data as handed over by an importer: separate attribute arrays that
/// share one index space, and an optional triangle list.
#[derive(Debug, Clone, Default)]
pub struct RawMeshData {
    pub name: Option<String>,
    attributes: Vec<(Semantic, AttributeArray)>,
    indices: Option<Vec<u32>>,
}

impl RawMeshData {
    pub fn new(indices: Option<Vec<u32>>) -> Self {
        RawMeshData {
            name: None,
            attributes: vec![],
            indices,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends another array for `semantic`; a second position array is a
    /// second vertex stream.
    pub fn with_attribute(mut self, semantic: Semantic, array: AttributeArray) -> Self {
        self.attributes.push((semantic, array));
        self
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn attribute_count(&self, semantic: Semantic) -> usize {
        self.attributes.iter().filter(|(s, _)| *s == semantic).count()
    }

    pub fn attribute(&self, semantic: Semantic, set: usize) -> Option<&AttributeArray> {
        self.attributes
            .iter()
            .filter(|(s, _)| *s == semantic)
            .nth(set)
            .map(|(_, array)| array)
    }

    pub fn vertex_array_count(&self) -> usize {
        self.attribute_count(Semantic::Position)
    }

    /// Number of vertices in the first position stream.
    pub fn vertex_count(&self) -> usize {
        self.attribute(Semantic::Position, 0)
            .map_or(0, AttributeArray::len)
    }

    pub fn into_parts(self) -> (Vec<(Semantic, AttributeArray)>, Option<Vec<u32>>) {
        (self.attributes, self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_array_tuples() {
        let array = AttributeArray::from_vec3(&[glm::vec3(1.0, 2.0, 3.0), glm::vec3(4.0, 5.0, 6.0)]);
        assert_eq!(array.len(), 2);
        assert_eq!(array.get(1), &[4.0, 5.0, 6.0]);
        assert_eq!(array.format().size(), 12);
    }

    #[test]
    #[should_panic]
    fn test_attribute_array_partial_tuple() {
        AttributeArray::new(VertexFormat::Float4, vec![0.0; 6]);
    }

    #[test]
    fn test_raw_mesh_streams() {
        let uv = AttributeArray::from_vec2(&[glm::vec2(0.0, 0.0)]);
        let pos = AttributeArray::from_vec4(&[glm::vec4(0.0, 0.0, 0.0, 1.0)]);
        let mesh = RawMeshData::new(Some(vec![0, 0, 0]))
            .with_attribute(Semantic::Position, pos)
            .with_attribute(Semantic::TexCoord, uv.clone())
            .with_attribute(Semantic::TexCoord, uv);

        assert_eq!(mesh.vertex_array_count(), 1);
        assert_eq!(mesh.attribute_count(Semantic::TexCoord), 2);
        assert!(mesh.attribute(Semantic::Normal, 0).is_none());
        assert!(mesh.attribute(Semantic::TexCoord, 1).is_some());
        assert_eq!(mesh.vertex_count(), 1);
    }
}
