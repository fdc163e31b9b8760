use super::vertex::Vertex;
use crate::common::{AttributeArray, MeshError, RawMeshData, Semantic, VertexFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexField {
    pub semantic: Semantic,
    pub format: VertexFormat,
    /// Byte offset of the field inside one vertex.
    pub offset: usize,
}

/// Array-of-structs vertex data: every vertex stores its fields back to
/// back, `stride` bytes apart.
#[derive(Debug, Clone, PartialEq)]
pub struct InterleavedBuffer {
    fields: Vec<VertexField>,
    stride: usize,
    data: Vec<f32>,
}

impl InterleavedBuffer {
    pub fn len(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.data.len() * std::mem::size_of::<f32>() / self.stride
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn field(&self, semantic: Semantic) -> Option<&VertexField> {
        self.fields.iter().find(|field| field.semantic == semantic)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Components of `semantic` for vertex `i`.
    pub fn get(&self, i: usize, semantic: Semantic) -> Option<&[f32]> {
        let field = self.field(semantic)?;
        let start = (i * self.stride + field.offset) / std::mem::size_of::<f32>();
        self.data.get(start..start + field.format.components())
    }

    /// Splits one field back out into a standalone attribute array.
    pub fn decompose(&self, semantic: Semantic) -> Option<AttributeArray> {
        let field = *self.field(semantic)?;
        let data = (0..self.len())
            .flat_map(|i| self.get(i, semantic).unwrap_or_default().iter().copied())
            .collect();
        Some(AttributeArray::new(field.format, data))
    }

    /// Typed view of the buffer, when its layout is exactly `V`'s.
    pub fn vertices<V: Vertex>(&self) -> Option<&[V]> {
        let same_fields = self.fields.len() == V::FIELDS.len()
            && self
                .fields
                .iter()
                .zip(V::FIELDS)
                .all(|(field, &(semantic, format))| {
                    field.semantic == semantic && field.format == format
                });
        if same_fields && self.stride == std::mem::size_of::<V>() {
            Some(bytemuck::cast_slice(&self.data))
        } else {
            None
        }
    }
}

/// Merges parallel per-vertex attribute arrays into one interleaved buffer,
/// fields in the configured order. A field may pin its format, in which case
/// arrays of any other format are refused.
#[derive(Debug, Clone)]
pub struct MeshInterleaver {
    fields: Vec<(Semantic, Option<VertexFormat>)>,
}

impl MeshInterleaver {
    /// Each field keeps whatever format the mesh stores it in.
    pub fn new(semantics: &[Semantic]) -> Self {
        MeshInterleaver {
            fields: semantics.iter().map(|&semantic| (semantic, None)).collect(),
        }
    }

    /// Fields and formats exactly as `V` lays them out.
    pub fn for_vertex<V: Vertex>() -> Self {
        MeshInterleaver {
            fields: V::FIELDS
                .iter()
                .map(|&(semantic, format)| (semantic, Some(format)))
                .collect(),
        }
    }

    pub fn interleave(&self, mesh: &RawMeshData) -> Result<InterleavedBuffer, MeshError> {
        let mut arrays = Vec::with_capacity(self.fields.len());
        for &(semantic, format) in &self.fields {
            match mesh.attribute_count(semantic) {
                0 => return Err(MeshError::MissingAttribute(semantic)),
                1 => {}
                count => return Err(MeshError::MultipleStreams { semantic, count }),
            }
            let array = mesh
                .attribute(semantic, 0)
                .ok_or(MeshError::MissingAttribute(semantic))?;
            match format {
                Some(expected) if expected != array.format() => {
                    return Err(MeshError::FormatMismatch {
                        semantic,
                        expected,
                        found: array.format(),
                    })
                }
                _ => {}
            }
            arrays.push((semantic, array));
        }

        let vertex_count = arrays.first().map_or(0, |(_, array)| array.len());
        for &(semantic, array) in &arrays {
            if array.len() != vertex_count {
                return Err(MeshError::LengthMismatch {
                    semantic,
                    expected: vertex_count,
                    found: array.len(),
                });
            }
        }

        let mut fields = Vec::with_capacity(arrays.len());
        let mut stride = 0;
        for &(semantic, array) in &arrays {
            fields.push(VertexField {
                semantic,
                format: array.format(),
                offset: stride,
            });
            stride += array.format().size();
        }

        let mut data = Vec::with_capacity(vertex_count * stride / std::mem::size_of::<f32>());
        for i in 0..vertex_count {
            for (_, array) in &arrays {
                data.extend_from_slice(array.get(i));
            }
        }

        Ok(InterleavedBuffer {
            fields,
            stride,
            data,
        })
    }
}
