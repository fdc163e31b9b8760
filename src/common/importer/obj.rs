use super::{Importer, ImporterFeatures};
use crate::common::{AttributeArray, ImportError, RawMeshData, Semantic, VertexFormat};
use std::collections::HashMap;
use std::path::Path;
use wavefront_obj::obj;

#[derive(Default)]
pub struct ObjImporter {
    objects: Option<Vec<obj::Object>>,
}

impl ObjImporter {
    pub const NAME: &'static str = "ObjImporter";

    pub fn instance() -> Option<Box<dyn Importer>> {
        Some(Box::new(ObjImporter::default()))
    }

    fn parse(&mut self, source: String) -> Result<(), ImportError> {
        let set = obj::parse(source).map_err(|err| ImportError::Obj(format!("{:?}", err)))?;
        self.objects = Some(set.objects);
        Ok(())
    }
}

/// OBJ faces index positions and normals separately. Every distinct
/// (position, normal) pair becomes one vertex so that all attribute arrays
/// share a single index space.
fn mesh_from_obj(object: &obj::Object) -> Result<RawMeshData, ImportError> {
    let mut remap: HashMap<(usize, Option<usize>), u32> = HashMap::new();
    let mut corners = vec![];
    let mut indices = vec![];

    for shape in object.geometry.iter().flat_map(|geom| geom.shapes.iter()) {
        if let obj::Primitive::Triangle(a, b, c) = &shape.primitive {
            for &(v, _, n) in [a, b, c] {
                let next = corners.len() as u32;
                let index = *remap.entry((v, n)).or_insert_with(|| {
                    corners.push((v, n));
                    next
                });
                indices.push(index);
            }
        }
    }

    let out_of_range = |what: &str, i: usize| {
        ImportError::Obj(format!("{} index {} out of range in {}", what, i, object.name))
    };

    let mut positions = Vec::with_capacity(corners.len() * 4);
    for &(v, _) in &corners {
        let vertex = object.vertices.get(v).ok_or_else(|| out_of_range("vertex", v))?;
        positions.extend_from_slice(&[vertex.x as f32, vertex.y as f32, vertex.z as f32, 1.0]);
    }

    let mut mesh = RawMeshData::new(Some(indices))
        .with_name(object.name.clone())
        .with_attribute(
            Semantic::Position,
            AttributeArray::new(VertexFormat::Float4, positions),
        );

    if !corners.is_empty() && corners.iter().all(|(_, n)| n.is_some()) {
        let mut normals = Vec::with_capacity(corners.len() * 3);
        for &(_, n) in &corners {
            let n = n.unwrap_or_default();
            let normal = object.normals.get(n).ok_or_else(|| out_of_range("normal", n))?;
            normals.extend_from_slice(&[normal.x as f32, normal.y as f32, normal.z as f32]);
        }
        mesh = mesh.with_attribute(
            Semantic::Normal,
            AttributeArray::new(VertexFormat::Float3, normals),
        );
    }

    Ok(mesh)
}

impl Importer for ObjImporter {
    fn features(&self) -> ImporterFeatures {
        ImporterFeatures::OPEN_FILE | ImporterFeatures::OPEN_DATA
    }

    fn open_file(&mut self, path: &Path) -> Result<(), ImportError> {
        self.close();
        let source = std::fs::read_to_string(path)?;
        self.parse(source)
    }

    fn open_data(&mut self, data: &[u8]) -> Result<(), ImportError> {
        self.close();
        let source = std::str::from_utf8(data).map_err(|err| ImportError::Obj(err.to_string()))?;
        self.parse(source.to_owned())
    }

    fn mesh_count(&self) -> usize {
        self.objects.as_ref().map_or(0, Vec::len)
    }

    fn mesh(&mut self, id: usize) -> Result<RawMeshData, ImportError> {
        let objects = self.objects.as_ref().ok_or(ImportError::NotOpened)?;
        let object = objects.get(id).ok_or(ImportError::NoSuchMesh(id))?;
        mesh_from_obj(object)
    }

    fn close(&mut self) {
        self.objects = None;
    }
}
