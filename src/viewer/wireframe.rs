use super::interleave::InterleavedBuffer;
use super::mesh::{BufferAllocator, BufferUsage};
use super::vertex::VertexPos;
use crate::common::Semantic;
use itertools::Itertools;
use std::collections::HashSet;

fn cantor_pairing(x: usize, y: usize) -> usize {
    (x + y) * (x + y + 1) / 2 + y
}

/// Line list covering every triangle edge once; an edge shared by two
/// triangles is emitted a single time regardless of winding. Edges whose
/// positions have fewer than three components are skipped.
pub fn edge_line_list(vertices: &InterleavedBuffer, indices: &[u32]) -> Vec<VertexPos> {
    let mut line_set: HashSet<usize> = HashSet::new();
    let mut line_list = vec![];

    for (i0, i1, i2) in indices.iter().map(|&i| i as usize).tuples() {
        for &(a, b) in &[(i0, i1), (i1, i2), (i2, i0)] {
            if !line_set.insert(cantor_pairing(a.min(b), a.max(b))) {
                continue;
            }
            let endpoint = |i: usize| {
                vertices
                    .get(i, Semantic::Position)
                    .and_then(VertexPos::from_components)
            };
            if let (Some(va), Some(vb)) = (endpoint(a), endpoint(b)) {
                line_list.push(va);
                line_list.push(vb);
            }
        }
    }

    line_list
}

pub struct WireFrame<B> {
    pub vertex_buffer: B,
    pub num_elements: usize,
}

impl<B> WireFrame<B> {
    pub fn new<A: BufferAllocator<Buffer = B>>(
        allocator: &A,
        vertices: &InterleavedBuffer,
        indices: &[u32],
    ) -> Self {
        let line_list = edge_line_list(vertices, indices);
        let vertex_buffer = allocator.create_static_buffer(
            "Wireframe Vertex Buffer",
            bytemuck::cast_slice(&line_list),
            BufferUsage::Vertex,
        );

        WireFrame {
            vertex_buffer,
            num_elements: line_list.len(),
        }
    }
}

pub trait DrawWireFrame<'a> {
    fn draw_wire_frame(&mut self, wire_frame: &'a WireFrame<wgpu::Buffer>);
}

impl<'a> DrawWireFrame<'a> for wgpu::RenderPass<'a> {
    fn draw_wire_frame(&mut self, wire_frame: &'a WireFrame<wgpu::Buffer>) {
        self.set_vertex_buffer(0, wire_frame.vertex_buffer.slice(..));
        self.draw(0..wire_frame.num_elements as u32, 0..1);
    }
}
