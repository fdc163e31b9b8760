#[macro_use]
extern crate slog;

use criterion::*;
use genmesh::generators::{IndexedPolygon, SharedVertex};
use meshviewer_rs::common::{AttributeArray, RawMeshData, Semantic};
use meshviewer_rs::viewer::{
    interleave::MeshInterleaver,
    mesh::prepare_mesh,
    optimizer::{average_cache_miss_ratio, Tipsify, VertexCacheOptimizer},
    vertex::VertexPosNorm,
};
use nalgebra_glm as glm;

fn plane(n: usize) -> RawMeshData {
    let plane = genmesh::generators::Plane::subdivide(n, n);
    let indices = plane
        .indexed_polygon_iter()
        .flat_map(|q| {
            let (x, y, z, w) = (q.x as u32, q.y as u32, q.z as u32, q.w as u32);
            vec![x, y, z, x, z, w]
        })
        .collect();
    let positions: Vec<glm::Vec4> = plane
        .shared_vertex_iter()
        .map(|v| glm::vec4(v.pos.x, v.pos.y, v.pos.z, 1.0))
        .collect();
    let normals: Vec<glm::Vec3> = plane
        .shared_vertex_iter()
        .map(|v| glm::vec3(v.normal.x, v.normal.y, v.normal.z))
        .collect();

    RawMeshData::new(Some(indices))
        .with_attribute(Semantic::Position, AttributeArray::from_vec4(&positions))
        .with_attribute(Semantic::Normal, AttributeArray::from_vec3(&normals))
}

fn bench(c: &mut Criterion) {
    let log = slog::Logger::root(slog::Discard, o!());
    let mut group = c.benchmark_group("benchmark-mesh");

    let data = plane(128);
    let indices = data.indices().unwrap_or_default().to_vec();
    let vertex_count = data.vertex_count();
    let interleaver = MeshInterleaver::new(&[Semantic::Position, Semantic::Normal]);

    group.bench_function("interleave", |b| b.iter(|| interleaver.interleave(&data)));

    group.bench_function("tipsify", |b| {
        b.iter_batched(
            || indices.clone(),
            |mut indices| Tipsify.optimize(&mut indices, vertex_count, 24),
            BatchSize::LargeInput,
        )
    });

    group.bench_function("prepare_mesh", |b| {
        b.iter(|| prepare_mesh::<VertexPosNorm, _>(&log, &data, &Tipsify, 24))
    });

    let mut optimized = indices.clone();
    Tipsify.optimize(&mut optimized, vertex_count, 24);
    group.bench_function("cache_miss_ratio", |b| {
        b.iter(|| average_cache_miss_ratio(&optimized, 24))
    });
    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
