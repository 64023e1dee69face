/// The color used for corners without vertex colors.
pub const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// The bone indices used for corners without skin data.
pub const DEFAULT_BONE_INDICES: [u32; 4] = [0; 4];

/// The bone weights used for corners without skin data.
pub const DEFAULT_BONE_WEIGHTS: [f32; 4] = [0.0; 4];

/// The number of 32-bit words in a vertex key.
pub const VERTEX_KEY_WORDS: usize = 20;

/// The full attribute tuple of one triangle corner.
/// Two tuples are the same vertex iff every component compares equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RechorVertex {
  pub position: [f32; 3],
  pub normal: [f32; 3],
  pub color: [f32; 4],
  pub tex_coord: [f32; 2],
  pub bone_indices: [u32; 4],
  pub bone_weights: [f32; 4],
}

/// The hashable form of a vertex.
pub type RechorVertexKey = [u32; VERTEX_KEY_WORDS];

/// The implementation of the vertex.
impl RechorVertex {

  /// Get the float components in key order.
  fn floats(&self) -> impl Iterator<Item = f32> + '_ {
    self.position.iter()
      .chain(self.normal.iter())
      .chain(self.color.iter())
      .chain(self.tex_coord.iter())
      .chain(self.bone_weights.iter())
      .copied()
  }

  /// Build the hash key of the vertex.
  /// Float components are keyed by bit pattern with -0.0 folded into 0.0,
  /// so two keys match exactly when the tuples compare equal.
  /// return: The key, or None if a component is NaN (NaN never compares equal).
  pub fn key(&self) -> Option<RechorVertexKey> {
    let mut key = [0u32; VERTEX_KEY_WORDS];
    for (slot, value) in key.iter_mut().zip(self.floats()) {
      if value.is_nan() {
        return None;
      }
      *slot = if value == 0.0 { 0 } else { value.to_bits() };
    }
    key[VERTEX_KEY_WORDS - 4..].copy_from_slice(&self.bone_indices);
    Some(key)
  }

}
