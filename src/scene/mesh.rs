use serde::{
  Deserialize,
  Serialize,
};

use crate::error::{
  RechorError,
  RechorErrorKind,
};

/// An indexed triangle mesh with flattened attribute arrays.
/// `bone_indices`/`bone_weights` are empty when the source carried no skin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechorMesh {
  pub vertices: Vec<f32>,
  pub normals: Vec<f32>,
  pub indices: Vec<u32>,
  pub colors: Vec<f32>,
  pub uvs: Vec<f32>,
  pub texture: String,
  pub bone_indices: Vec<u32>,
  pub bone_weights: Vec<f32>,
}

/// The implementation of the mesh.
impl RechorMesh {

  /// Get the number of deduplicated vertices.
  pub fn vertex_count(&self) -> usize {
    self.vertices.len() / 3
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Check if the mesh carries skin data.
  pub fn has_skin(&self) -> bool {
    !self.bone_indices.is_empty()
  }

  /// Check the structural invariants of the mesh.
  /// Used on data read back from storage, where a violation means a damaged file.
  /// return: The result.
  pub fn validate(&self) -> Result<(), RechorError> {
    let malformed = |what: String| Err(RechorError::new(RechorErrorKind::EncodingFailed, &format!("Malformed mesh: {}.", what), None));

    if self.vertices.len() % 3 != 0 {
      return malformed(format!("{} position components", self.vertices.len()));
    }
    let count = self.vertex_count();
    let arrays = [
      ("normals", self.normals.len(), 3),
      ("colors", self.colors.len(), 4),
      ("uvs", self.uvs.len(), 2),
    ];
    for (name, len, width) in arrays {
      if len != count * width {
        return malformed(format!("{} has {} components for {} vertices", name, len, count));
      }
    }
    if self.has_skin() || !self.bone_weights.is_empty() {
      if self.bone_indices.len() != count * 4 || self.bone_weights.len() != count * 4 {
        return malformed(format!(
          "{} bone indices and {} bone weights for {} vertices",
          self.bone_indices.len(),
          self.bone_weights.len(),
          count,
        ));
      }
    }
    if self.indices.len() % 3 != 0 {
      return malformed(format!("{} indices is not a triangle list", self.indices.len()));
    }
    if let Some(index) = self.indices.iter().find(|&&index| index as usize >= count) {
      return malformed(format!("index {} out of range for {} vertices", index, count));
    }
    Ok(())
  }

}
