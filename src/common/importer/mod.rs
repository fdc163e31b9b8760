use super::{ImportError, RawMeshData, ViewerError};
use std::path::Path;

pub mod gltf;
pub mod obj;

bitflags! {
    pub struct ImporterFeatures: u32 {
        const OPEN_DATA = 0b01;
        const OPEN_FILE = 0b10;
    }
}

/// Capability interface of an asset importer. The viewer only talks to this
/// trait and never learns which concrete format it is reading.
pub trait Importer {
    fn features(&self) -> ImporterFeatures;

    fn open_file(&mut self, path: &Path) -> Result<(), ImportError>;

    fn open_data(&mut self, _data: &[u8]) -> Result<(), ImportError> {
        Err(ImportError::Unsupported("opening in-memory data"))
    }

    fn mesh_count(&self) -> usize;

    fn mesh(&mut self, id: usize) -> Result<RawMeshData, ImportError>;

    fn close(&mut self);
}

pub struct ImporterPlugin {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    factory: fn() -> Option<Box<dyn Importer>>,
}

pub struct ImporterManager {
    plugins: Vec<ImporterPlugin>,
    log: slog::Logger,
}

impl ImporterManager {
    pub fn new(log: &slog::Logger) -> Self {
        let log = log.new(o!("module" => "importer"));
        Self {
            plugins: vec![],
            log,
        }
    }

    /// A manager with every importer compiled into the viewer.
    pub fn with_builtin(log: &slog::Logger) -> Self {
        let mut manager = Self::new(log);
        manager.register(
            gltf::GltfImporter::NAME,
            &["gltf", "glb"],
            gltf::GltfImporter::instance,
        );
        manager.register(obj::ObjImporter::NAME, &["obj"], obj::ObjImporter::instance);
        manager
    }

    pub fn register(
        &mut self,
        name: &'static str,
        extensions: &'static [&'static str],
        factory: fn() -> Option<Box<dyn Importer>>,
    ) {
        debug!(self.log, "registered importer {}", name; "extensions" => ?extensions);
        self.plugins.push(ImporterPlugin {
            name,
            extensions,
            factory,
        });
    }

    pub fn plugin(&self, name: &str) -> Option<&ImporterPlugin> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    pub fn plugin_for_path(&self, path: &Path) -> Result<&ImporterPlugin, ViewerError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        ext.and_then(|ext| {
            self.plugins
                .iter()
                .find(|plugin| plugin.extensions.contains(&ext.as_str()))
        })
        .ok_or_else(|| ViewerError::ImporterUnavailable(path.display().to_string()))
    }

    /// Finds, instantiates and opens the importer handling `path`.
    pub fn open(&self, path: &Path) -> Result<Box<dyn Importer>, ViewerError> {
        let plugin = self.plugin_for_path(path)?;
        let mut importer =
            (plugin.factory)().ok_or(ViewerError::ImporterInstantiation(plugin.name))?;
        if !importer.features().contains(ImporterFeatures::OPEN_FILE) {
            return Err(ViewerError::ImporterCannotOpenFiles(plugin.name));
        }

        info!(self.log, "opening {} with {}", path.display(), plugin.name);
        importer
            .open_file(path)
            .map_err(|source| ViewerError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(importer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DataOnlyImporter;

    impl Importer for DataOnlyImporter {
        fn features(&self) -> ImporterFeatures {
            ImporterFeatures::OPEN_DATA
        }

        fn open_file(&mut self, _path: &Path) -> Result<(), ImportError> {
            Err(ImportError::Unsupported("opening files"))
        }

        fn mesh_count(&self) -> usize {
            0
        }

        fn mesh(&mut self, id: usize) -> Result<RawMeshData, ImportError> {
            Err(ImportError::NoSuchMesh(id))
        }

        fn close(&mut self) {}
    }

    fn data_only() -> Option<Box<dyn Importer>> {
        Some(Box::new(DataOnlyImporter))
    }

    fn broken() -> Option<Box<dyn Importer>> {
        None
    }

    fn log() -> slog::Logger {
        slog::Logger::root(slog::Discard, o!())
    }

    fn open_err(manager: &ImporterManager, path: &str) -> ViewerError {
        match manager.open(Path::new(path)) {
            Ok(_) => panic!("{} should not open", path),
            Err(err) => err,
        }
    }

    #[test]
    fn test_plugin_lookup_by_extension() {
        let manager = ImporterManager::with_builtin(&log());
        assert_eq!(
            manager.plugin_for_path(Path::new("a/b.GLB")).unwrap().name,
            "GltfImporter"
        );
        assert_eq!(
            manager.plugin_for_path(Path::new("model.obj")).unwrap().name,
            "ObjImporter"
        );
        assert!(manager.plugin("ObjImporter").is_some());
        assert_eq!(open_err(&manager, "scene.dae").exit_code(), 1);
        assert_eq!(open_err(&manager, "no_extension").exit_code(), 1);
    }

    #[test]
    fn test_setup_failure_codes() {
        let mut manager = ImporterManager::new(&log());
        manager.register("BrokenImporter", &["broken"], broken);
        manager.register("DataOnlyImporter", &["data"], data_only);

        assert_eq!(open_err(&manager, "x.broken").exit_code(), 2);
        assert_eq!(open_err(&manager, "x.data").exit_code(), 3);
    }

    #[test]
    fn test_open_missing_file() {
        let manager = ImporterManager::with_builtin(&log());
        let err = open_err(&manager, "/nonexistent/dir/model.gltf");
        assert_eq!(err.exit_code(), 4);
        let err = open_err(&manager, "/nonexistent/dir/model.obj");
        assert_eq!(err.exit_code(), 4);
    }
}
