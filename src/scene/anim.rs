use serde::{
  Deserialize,
  Serialize,
};

use crate::error::{
  RechorError,
  RechorErrorKind,
};

/// The number of floats in one flattened 4x4 matrix.
pub const MATRIX_FLOATS: usize = 16;

/// The baked frames of one mesh.
/// Each entry of `mesh_matrices` is one 16-float matrix; each entry of
/// `bone_matrices` is all bones' matrices of one frame, concatenated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechorAnimFrame {
  pub mesh_matrices: Vec<Vec<f32>>,
  pub bone_matrices: Vec<Vec<f32>>,
}

/// One baked animation clip, holding one frame set per scene mesh in mesh order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RechorAnim {
  pub meshes: Vec<RechorAnimFrame>,
}

impl RechorAnimFrame {
  /// Get the number of sampled frames.
  pub fn frame_count(&self) -> usize {
    self.mesh_matrices.len().max(self.bone_matrices.len())
  }

  /// Check that every entry holds whole matrices, with the same bone count in every frame.
  /// return: The result.
  pub fn validate(&self) -> Result<(), RechorError> {
    let malformed = |what: String| Err(RechorError::new(RechorErrorKind::EncodingFailed, &format!("Malformed anim frame: {}.", what), None));

    if let Some((frame, matrix)) = self.mesh_matrices.iter().enumerate().find(|(_, m)| m.len() != MATRIX_FLOATS) {
      return malformed(format!("mesh matrix {} has {} floats", frame, matrix.len()));
    }
    if let Some(first) = self.bone_matrices.first() {
      if first.len() % MATRIX_FLOATS != 0 {
        return malformed(format!("bone matrices of frame 0 hold {} floats", first.len()));
      }
      if let Some((frame, matrices)) = self.bone_matrices.iter().enumerate().find(|(_, m)| m.len() != first.len()) {
        return malformed(format!("bone matrices of frame {} hold {} floats, frame 0 holds {}", frame, matrices.len(), first.len()));
      }
    }
    Ok(())
  }
}

impl RechorAnim {
  /// Check every frame set of the anim.
  pub fn validate(&self) -> Result<(), RechorError> {
    self.meshes.iter().try_for_each(|frame_set| frame_set.validate())
  }
}
