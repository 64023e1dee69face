use std::path::Path;

use serde::{
  Deserialize,
  Serialize,
};

use crate::codec::RechorSceneCodec;
use crate::error::RechorError;
use crate::options::{
  RechorLoadOptions,
  RechorSaveOptions,
};
use super::mesh::RechorMesh;
use super::anim::RechorAnim;

/// A scene is a list of indexed meshes and the anims baked for them.
/// `anims[i].meshes[j]` animates `meshes[j]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RechorScene {
  pub meshes: Vec<RechorMesh>,
  pub anims: Vec<RechorAnim>,
}

/// The implementation of the scene.
impl RechorScene {
  /// Load a scene file written by `save`.
  /// param path: The path to the scene file.
  /// return: The scene.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RechorError> {
    Self::load_with(path, &RechorLoadOptions::default())
  }

  /// Load a scene file with the given options.
  /// param path: The path to the scene file.
  /// param options: The load options.
  /// return: The scene.
  pub fn load_with<P: AsRef<Path>>(path: P, options: &RechorLoadOptions) -> Result<Self, RechorError> {
    let path = path.as_ref();
    log::info!("loading \"{}\"...", path.to_string_lossy());

    let data = std::fs::read(path).map_err(|err| RechorError::from_read(path, err))?;
    let scene = RechorSceneCodec::for_load(options).decode(&data)?;

    log::debug!("A RechorScene loaded.");
    Ok(scene)
  }

  /// Save the scene.
  /// param path: The destination path.
  /// return: The result.
  pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RechorError> {
    self.save_with(path, &RechorSaveOptions::default())
  }

  /// Save the scene with the given options.
  /// Nothing is written unless encoding succeeds.
  /// param path: The destination path.
  /// param options: The save options.
  /// return: The result.
  pub fn save_with<P: AsRef<Path>>(&self, path: P, options: &RechorSaveOptions) -> Result<(), RechorError> {
    let path = path.as_ref();
    log::info!("saving \"{}\"...", path.to_string_lossy());

    let data = RechorSceneCodec::for_save(options).encode(self)?;
    std::fs::write(path, &data).map_err(|err| RechorError::from_write(path, err))?;

    log::debug!("Wrote {} bytes.", data.len());
    Ok(())
  }

  /// Check if the scene has any anim.
  pub fn has_anim(&self) -> bool {
    !self.anims.is_empty()
  }

  /// Check if any mesh carries skin data.
  pub fn has_skin(&self) -> bool {
    self.meshes.iter().any(|mesh| mesh.has_skin())
  }

  pub fn num_of_vertices(&self) -> usize {
    self.meshes.iter().map(|mesh| mesh.vertex_count()).sum()
  }

  pub fn num_of_triangles(&self) -> usize {
    self.meshes.iter().map(|mesh| mesh.triangle_count()).sum()
  }
}
