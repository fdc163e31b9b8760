use super::mesh::{Semantic, VertexFormat};
use std::path::PathBuf;

/// Precondition violations of the mesh preparation pipeline.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MeshError {
    #[error("mesh has no index buffer")]
    MissingIndices,

    #[error("mesh has {0} vertex streams, exactly one is supported")]
    MultipleVertexStreams(usize),

    #[error("mesh has no {0} array")]
    MissingAttribute(Semantic),

    #[error("mesh has {count} {semantic} arrays, exactly one is supported")]
    MultipleStreams { semantic: Semantic, count: usize },

    #[error("{semantic} array has {found} elements, expected {expected}")]
    LengthMismatch {
        semantic: Semantic,
        expected: usize,
        found: usize,
    },

    #[error("{semantic} array is {found:?}, the vertex layout needs {expected:?}")]
    FormatMismatch {
        semantic: Semantic,
        expected: VertexFormat,
        found: VertexFormat,
    },

    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),

    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },

    #[error("no {0} field in interleaved vertex layout")]
    UnboundAttribute(Semantic),
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Gltf(#[from] gltf::Error),

    #[error("OBJ parse error: {0}")]
    Obj(String),

    #[error("importer does not support {0}")]
    Unsupported(&'static str),

    #[error("no file opened")]
    NotOpened,

    #[error("mesh {0} out of range")]
    NoSuchMesh(usize),
}

/// Fatal setup failures. Each variant maps to the process exit code the
/// viewer terminates with.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("could not load importer plugin for {0}")]
    ImporterUnavailable(String),

    #[error("could not instance {0} plugin")]
    ImporterInstantiation(&'static str),

    #[error("{0} cannot open files")]
    ImporterCannotOpenFiles(&'static str),

    #[error("could not open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: ImportError,
    },

    #[error("no mesh found in asset")]
    NoMesh,

    #[error("cannot prepare mesh: {0}")]
    UnsupportedMesh(#[from] MeshError),

    #[error("graphics initialization failed: {0:#}")]
    Graphics(anyhow::Error),
}

impl ViewerError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ViewerError::ImporterUnavailable(_) => 1,
            ViewerError::ImporterInstantiation(_) => 2,
            ViewerError::ImporterCannotOpenFiles(_) => 3,
            ViewerError::OpenFailed { .. } => 4,
            ViewerError::NoMesh => 5,
            ViewerError::UnsupportedMesh(_) => 6,
            ViewerError::Graphics(_) => 7,
        }
    }
}
