use std::path::Path;

use crate::error::RechorError;
use crate::options::{
  RechorImportOptions,
  DEFAULT_FRAME_RATE,
};
use crate::scene::{
  RechorAnimRaw,
  RechorScene,
  RechorSceneRaw,
};
use crate::scene::processor::{
  RechorAnimBaker,
  RechorMeshIndexer,
};
use super::gltf_loader::RechorGltfLoader;

/// Collects raw meshes and baked anims over several source files,
/// e.g. one model file followed by its motion files.
#[derive(Debug, Default)]
pub struct RechorImporter {
  raw: RechorSceneRaw,
  baker: RechorAnimBaker,
}

/// The implementation of the importer.
impl RechorImporter {

  /// Create a new importer sampling anims at the default frame rate.
  pub fn new() -> Self {
    Self::with_frame_rate(DEFAULT_FRAME_RATE)
  }

  /// Create a new importer.
  /// param frame_rate: The frames per second used to sample anims.
  /// return: The importer.
  pub fn with_frame_rate(frame_rate: f32) -> Self {
    Self {
      raw: RechorSceneRaw::default(),
      baker: RechorAnimBaker::new(frame_rate),
    }
  }

  /// The data collected so far.
  pub fn raw(&self) -> &RechorSceneRaw {
    &self.raw
  }

  /// Load a source file.
  /// Meshes are appended. An anim clip is baked right away for every mesh loaded so far,
  /// using the node hierarchy of this file.
  /// param path: The source file.
  /// param options: What to load.
  /// return: The result.
  pub fn load<P: AsRef<Path>>(&mut self, path: P, options: RechorImportOptions) -> Result<(), RechorError> {
    let source = RechorGltfLoader::load_raw(path, options, self.baker.frame_rate())?;

    log::debug!("Loaded {} meshes and {} nodes.", source.meshes.len(), source.nodes.len());
    self.raw.meshes.extend(source.meshes);

    if let Some(clip) = source.clip {
      let anim = self.baker.bake(&self.raw.meshes, &source.nodes, clip.span)?;
      log::debug!("Baked anim \"{}\" for {} meshes.", clip.name, anim.meshes.len());
      self.raw.anims.push(RechorAnimRaw {
        name: clip.name,
        span: clip.span,
        anim,
      });
    }
    Ok(())
  }

  /// Load a source file, then process everything collected into the scene.
  pub fn load_into<P: AsRef<Path>>(
    &mut self,
    path: P,
    scene: &mut RechorScene,
    options: RechorImportOptions,
  ) -> Result<(), RechorError> {
    self.load(path, options)?;
    self.process(scene);
    Ok(())
  }

  /// Index the collected meshes and append them and the baked anims to the scene.
  /// param scene: The output scene.
  pub fn process(&self, scene: &mut RechorScene) {
    log::info!("process mesh...");
    scene.meshes.reserve(self.raw.meshes.len());
    for raw in self.raw.meshes.iter() {
      let mesh = RechorMeshIndexer::index(raw);
      log::debug!(
        "Mesh \"{}\": {} corners indexed into {} vertices.",
        raw.node_name,
        raw.indices.len(),
        mesh.vertex_count(),
      );
      scene.meshes.push(mesh);
    }

    log::info!("process anim...");
    scene.anims.extend(self.raw.anims.iter().map(|anim| anim.anim.clone()));
  }

}
