mod gltf_loader;
mod importer;

pub use gltf_loader::RechorGltfLoader;
pub use importer::RechorImporter;
