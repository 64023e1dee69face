use crate::codec::compression;
use crate::error::{
  RechorError,
  RechorErrorKind,
};
use crate::options::{
  RechorFormat,
  RechorLoadOptions,
  RechorSaveOptions,
  DEFAULT_COMPRESSION_LEVEL,
  DEFAULT_MAX_DECOMPRESSED_SIZE,
};
use crate::scene::RechorScene;

/// Find the first float JSON cannot hold.
/// param scene: The scene.
/// return: Where the value sits, or None if every float is finite.
fn find_non_finite(scene: &RechorScene) -> Option<String> {
  for (index, mesh) in scene.meshes.iter().enumerate() {
    let arrays = [
      ("vertices", &mesh.vertices),
      ("normals", &mesh.normals),
      ("colors", &mesh.colors),
      ("uvs", &mesh.uvs),
      ("boneWeights", &mesh.bone_weights),
    ];
    for (name, values) in arrays {
      if let Some(value) = values.iter().find(|value| !value.is_finite()) {
        return Some(format!("mesh {} {} holds {}", index, name, value));
      }
    }
  }
  for (index, anim) in scene.anims.iter().enumerate() {
    for (mesh, frame_set) in anim.meshes.iter().enumerate() {
      let matrices = frame_set.mesh_matrices.iter().chain(frame_set.bone_matrices.iter());
      if let Some(value) = matrices.flatten().find(|value| !value.is_finite()) {
        return Some(format!("anim {} mesh {} holds {}", index, mesh, value));
      }
    }
  }
  None
}

/// Converts scenes to and from the compressed structured buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RechorSceneCodec {
  format: RechorFormat,
  compression_level: i32,
  max_decompressed_size: u64,
}

/// The default implementation of the scene codec.
impl Default for RechorSceneCodec {
  fn default() -> Self {
    Self::new(RechorFormat::Binary)
  }
}

/// The implementation of the scene codec.
impl RechorSceneCodec {

  /// Create a new scene codec.
  /// param format: The encoding of the structured buffer.
  /// return: The codec.
  pub fn new(format: RechorFormat) -> Self {
    Self {
      format,
      compression_level: DEFAULT_COMPRESSION_LEVEL,
      max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
    }
  }

  /// Create a codec for writing with the given options.
  pub fn for_save(options: &RechorSaveOptions) -> Self {
    Self {
      compression_level: options.compression_level,
      ..Self::new(options.format)
    }
  }

  /// Create a codec for reading with the given options.
  pub fn for_load(options: &RechorLoadOptions) -> Self {
    Self {
      max_decompressed_size: options.max_decompressed_size,
      ..Self::new(options.format)
    }
  }

  pub fn format(&self) -> RechorFormat {
    self.format
  }

  /// Encode a scene.
  /// param scene: The scene.
  /// return: The compressed bytes.
  pub fn encode(&self, scene: &RechorScene) -> Result<Vec<u8>, RechorError> {
    let buffer = match self.format {
      RechorFormat::Binary => bincode::serialize(scene)
        .map_err(|err| RechorError::new(RechorErrorKind::EncodingFailed, "Serialize scene failed.", Some(Box::new(err))))?,
      RechorFormat::Text => {
        // serde_json writes NaN and infinity as null, which would not read back.
        if let Some(location) = find_non_finite(scene) {
          return Err(RechorError::new(
            RechorErrorKind::EncodingFailed,
            &format!("Text encoding cannot hold non-finite floats: {}.", location),
            None,
          ));
        }
        serde_json::to_vec(scene)
          .map_err(|err| RechorError::new(RechorErrorKind::EncodingFailed, "Serialize scene as text failed.", Some(Box::new(err))))?
      },
    };
    log::debug!("Encoded {} meshes and {} anims into {} bytes.", scene.meshes.len(), scene.anims.len(), buffer.len());

    compression::compress(&buffer, self.compression_level)
  }

  /// Decode a scene.
  /// param data: The compressed bytes.
  /// return: The scene.
  pub fn decode(&self, data: &[u8]) -> Result<RechorScene, RechorError> {
    let buffer = compression::decompress(data, self.max_decompressed_size)?;

    let scene: RechorScene = match self.format {
      RechorFormat::Binary => bincode::deserialize(&buffer)
        .map_err(|err| RechorError::new(RechorErrorKind::EncodingFailed, "Parse scene buffer failed.", Some(Box::new(err))))?,
      RechorFormat::Text => serde_json::from_slice(&buffer)
        .map_err(|err| RechorError::new(RechorErrorKind::EncodingFailed, "Parse scene text failed.", Some(Box::new(err))))?,
    };
    for mesh in scene.meshes.iter() {
      mesh.validate()?;
    }
    for anim in scene.anims.iter() {
      anim.validate()?;
    }
    log::debug!("Decoded {} meshes and {} anims.", scene.meshes.len(), scene.anims.len());

    Ok(scene)
  }

}
