use super::{Importer, ImporterFeatures};
use crate::common::{AttributeArray, ImportError, RawMeshData, Semantic, VertexFormat};
use std::path::Path;

struct GltfAsset {
    document: gltf::Document,
    buffers: Vec<gltf::buffer::Data>,
    /// (mesh index, primitive index) of every primitive in document order.
    primitives: Vec<(usize, usize)>,
}

#[derive(Default)]
pub struct GltfImporter {
    asset: Option<GltfAsset>,
}

impl GltfImporter {
    pub const NAME: &'static str = "GltfImporter";

    pub fn instance() -> Option<Box<dyn Importer>> {
        Some(Box::new(GltfImporter::default()))
    }

    fn load(&mut self, document: gltf::Document, buffers: Vec<gltf::buffer::Data>) {
        let primitives = document
            .meshes()
            .flat_map(|mesh| {
                let mesh_index = mesh.index();
                mesh.primitives()
                    .filter(|prim| prim.mode() == gltf::mesh::Mode::Triangles)
                    .map(move |prim| (mesh_index, prim.index()))
                    .collect::<Vec<_>>()
            })
            .collect();

        self.asset = Some(GltfAsset {
            document,
            buffers,
            primitives,
        });
    }
}

fn mesh_from_gltf(
    name: Option<&str>,
    gltf_prim: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> RawMeshData {
    let reader = gltf_prim.reader(|buffer| Some(&buffers[buffer.index()]));

    let indices = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect());
    let mut mesh = RawMeshData::new(indices);
    if let Some(name) = name {
        mesh = mesh.with_name(name);
    }

    if let Some(positions) = reader.read_positions() {
        let data = positions
            .flat_map(|p| vec![p[0], p[1], p[2], 1.0])
            .collect();
        mesh = mesh.with_attribute(
            Semantic::Position,
            AttributeArray::new(VertexFormat::Float4, data),
        );
    }

    if let Some(normals) = reader.read_normals() {
        let data = normals.flat_map(|n| n.to_vec()).collect();
        mesh = mesh.with_attribute(
            Semantic::Normal,
            AttributeArray::new(VertexFormat::Float3, data),
        );
    }

    let mut set = 0;
    while let Some(tex_coords) = reader.read_tex_coords(set) {
        let data = tex_coords.into_f32().flat_map(|uv| uv.to_vec()).collect();
        mesh = mesh.with_attribute(
            Semantic::TexCoord,
            AttributeArray::new(VertexFormat::Float2, data),
        );
        set += 1;
    }

    if let Some(colors) = reader.read_colors(0) {
        let data = colors.into_rgba_f32().flat_map(|c| c.to_vec()).collect();
        mesh = mesh.with_attribute(
            Semantic::Color,
            AttributeArray::new(VertexFormat::Float4, data),
        );
    }

    mesh
}

impl Importer for GltfImporter {
    fn features(&self) -> ImporterFeatures {
        ImporterFeatures::OPEN_FILE | ImporterFeatures::OPEN_DATA
    }

    fn open_file(&mut self, path: &Path) -> Result<(), ImportError> {
        self.close();
        let (document, buffers, _images) = gltf::import(path)?;
        self.load(document, buffers);
        Ok(())
    }

    fn open_data(&mut self, data: &[u8]) -> Result<(), ImportError> {
        self.close();
        let (document, buffers, _images) = gltf::import_slice(data)?;
        self.load(document, buffers);
        Ok(())
    }

    fn mesh_count(&self) -> usize {
        self.asset.as_ref().map_or(0, |asset| asset.primitives.len())
    }

    fn mesh(&mut self, id: usize) -> Result<RawMeshData, ImportError> {
        let asset = self.asset.as_ref().ok_or(ImportError::NotOpened)?;
        let &(mesh_index, prim_index) = asset
            .primitives
            .get(id)
            .ok_or(ImportError::NoSuchMesh(id))?;

        let gltf_mesh = asset
            .document
            .meshes()
            .nth(mesh_index)
            .ok_or(ImportError::NoSuchMesh(id))?;
        let gltf_prim = gltf_mesh
            .primitives()
            .nth(prim_index)
            .ok_or(ImportError::NoSuchMesh(id))?;

        Ok(mesh_from_gltf(gltf_mesh.name(), &gltf_prim, &asset.buffers))
    }

    fn close(&mut self) {
        self.asset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A single triangle with an embedded base64 buffer: 3 u16 indices
    // (padded to 8 bytes) followed by 3 vec3 positions.
    const TRIANGLE: &str = r#"{
        "asset": {"version": "2.0"},
        "scenes": [{"nodes": [0]}],
        "nodes": [{"mesh": 0}],
        "meshes": [{"name": "triangle", "primitives": [{"attributes": {"POSITION": 1}, "indices": 0}]}],
        "buffers": [{"uri": "data:application/octet-stream;base64,AAABAAIAAAAAAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAAAAAACAPwAAAAA=", "byteLength": 44}],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 6, "target": 34963},
            {"buffer": 0, "byteOffset": 8, "byteLength": 36, "target": 34962}
        ],
        "accessors": [
            {"bufferView": 0, "byteOffset": 0, "componentType": 5123, "count": 3, "type": "SCALAR", "max": [2], "min": [0]},
            {"bufferView": 1, "byteOffset": 0, "componentType": 5126, "count": 3, "type": "VEC3", "max": [1.0, 1.0, 0.0], "min": [0.0, 0.0, 0.0]}
        ]
    }"#;

    #[test]
    fn test_gltf_triangle() {
        let mut importer = GltfImporter::default();
        assert_eq!(importer.mesh_count(), 0);
        importer.open_data(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(importer.mesh_count(), 1);

        let mesh = importer.mesh(0).unwrap();
        assert_eq!(mesh.name.as_deref(), Some("triangle"));
        assert_eq!(mesh.indices(), Some(&[0, 1, 2][..]));
        assert_eq!(mesh.vertex_array_count(), 1);

        let pos = mesh.attribute(Semantic::Position, 0).unwrap();
        assert_eq!(pos.format(), VertexFormat::Float4);
        assert_eq!(pos.get(1), &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(pos.get(2), &[0.0, 1.0, 0.0, 1.0]);
        assert!(mesh.attribute(Semantic::Normal, 0).is_none());

        assert!(importer.mesh(1).is_err());
        importer.close();
        assert_eq!(importer.mesh_count(), 0);
        assert!(matches!(importer.mesh(0), Err(ImportError::NotOpened)));
    }
}
