use super::interleave::{InterleavedBuffer, MeshInterleaver};
use super::optimizer::VertexCacheOptimizer;
use super::vertex::Vertex;
use crate::common::{MeshError, RawMeshData, Semantic, VertexFormat};
use wgpu::util::DeviceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
}

/// Creates long-lived GPU buffers. Implemented by `wgpu::Device`; tests
/// provide an in-memory allocator.
pub trait BufferAllocator {
    type Buffer;

    fn create_static_buffer(&self, label: &str, contents: &[u8], usage: BufferUsage)
        -> Self::Buffer;
}

impl BufferAllocator for wgpu::Device {
    type Buffer = wgpu::Buffer;

    fn create_static_buffer(
        &self,
        label: &str,
        contents: &[u8],
        usage: BufferUsage,
    ) -> wgpu::Buffer {
        let usage = match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        };
        self.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        })
    }
}

/// One vertex field bound to a shader input location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    pub semantic: Semantic,
    pub format: VertexFormat,
    pub offset: usize,
    pub shader_location: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshLayout {
    pub stride: usize,
    pub attributes: Vec<AttributeBinding>,
}

impl MeshLayout {
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|binding| wgpu::VertexAttribute {
                format: binding.format.to_wgpu(),
                offset: binding.offset as wgpu::BufferAddress,
                shader_location: binding.shader_location,
            })
            .collect()
    }

    pub fn desc<'a>(&self, attributes: &'a [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

/// A vertex buffer and an index buffer ready to be drawn as a triangle
/// list. Read-only once built.
pub struct IndexedMesh<B> {
    pub vertex_buffer: B,
    pub index_buffer: B,
    pub num_elements: usize,
    pub num_vertices: usize,
    pub layout: MeshLayout,
}

pub struct IndexedMeshBuilder<'a> {
    vertices: &'a InterleavedBuffer,
    indices: &'a [u32],
    bindings: Vec<(Semantic, u32)>,
}

impl<'a> IndexedMeshBuilder<'a> {
    pub fn new(vertices: &'a InterleavedBuffer, indices: &'a [u32]) -> Self {
        IndexedMeshBuilder {
            vertices,
            indices,
            bindings: vec![],
        }
    }

    pub fn bind(mut self, semantic: Semantic, shader_location: u32) -> Self {
        self.bindings.push((semantic, shader_location));
        self
    }

    /// Binds every field of `V` to the location of its position in `V`.
    pub fn bind_vertex<V: Vertex>(self) -> Self {
        V::FIELDS
            .iter()
            .enumerate()
            .fold(self, |builder, (location, &(semantic, _))| {
                builder.bind(semantic, location as u32)
            })
    }

    pub fn layout(&self) -> Result<MeshLayout, MeshError> {
        let attributes = self
            .bindings
            .iter()
            .map(|&(semantic, shader_location)| {
                let field = self
                    .vertices
                    .field(semantic)
                    .ok_or(MeshError::UnboundAttribute(semantic))?;
                Ok(AttributeBinding {
                    semantic,
                    format: field.format,
                    offset: field.offset,
                    shader_location,
                })
            })
            .collect::<Result<Vec<_>, MeshError>>()?;

        Ok(MeshLayout {
            stride: self.vertices.stride(),
            attributes,
        })
    }

    pub fn build<A: BufferAllocator>(self, allocator: &A) -> Result<IndexedMesh<A::Buffer>, MeshError> {
        validate_indices(self.indices, self.vertices.len())?;
        let layout = self.layout()?;

        let vertex_buffer =
            allocator.create_static_buffer("Vertex Buffer", self.vertices.as_bytes(), BufferUsage::Vertex);
        let index_buffer = allocator.create_static_buffer(
            "Index Buffer",
            bytemuck::cast_slice(self.indices),
            BufferUsage::Index,
        );

        Ok(IndexedMesh {
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len(),
            num_vertices: self.vertices.len(),
            layout,
        })
    }
}

pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), MeshError> {
    if indices.len() % 3 != 0 {
        return Err(MeshError::NotTriangles(indices.len()));
    }
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(MeshError::IndexOutOfBounds {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// CPU side result of mesh preparation, ready for `IndexedMeshBuilder`.
#[derive(Debug)]
pub struct PreparedMesh {
    pub vertices: InterleavedBuffer,
    pub indices: Vec<u32>,
}

/// Optimizes the triangle order of `data` and interleaves its attributes
/// into `V`'s layout. Meshes without indices or with more than one vertex
/// stream are refused.
pub fn prepare_mesh<V: Vertex, O: VertexCacheOptimizer>(
    log: &slog::Logger,
    data: &RawMeshData,
    optimizer: &O,
    cache_size: usize,
) -> Result<PreparedMesh, MeshError> {
    let mut indices = data
        .indices()
        .ok_or(MeshError::MissingIndices)?
        .to_vec();
    if data.vertex_array_count() != 1 {
        return Err(MeshError::MultipleVertexStreams(data.vertex_array_count()));
    }

    let vertex_count = data.vertex_count();
    validate_indices(&indices, vertex_count)?;

    debug!(
        log,
        "optimizing vertex cache order (cache size {})", cache_size;
        "vertices" => vertex_count, "triangles" => indices.len() / 3
    );
    optimizer.optimize(&mut indices, vertex_count, cache_size);

    let vertices = MeshInterleaver::for_vertex::<V>().interleave(data)?;

    Ok(PreparedMesh { vertices, indices })
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a IndexedMesh<wgpu::Buffer>);
}

impl<'a> DrawMesh<'a> for wgpu::RenderPass<'a> {
    fn draw_mesh(&mut self, mesh: &'a IndexedMesh<wgpu::Buffer>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.num_elements as u32, 0, 0..1);
    }
}
