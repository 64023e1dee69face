use std::ops::Range;

use glam::Mat4;

use crate::error::{
  RechorError,
  RechorErrorKind,
};
use crate::options::DEFAULT_FRAME_RATE;
use crate::scene::{
  RechorAnim,
  RechorAnimFrame,
  RechorAnimSpan,
  RechorMeshRaw,
};
use crate::scene::anim::MATRIX_FLOATS;
use crate::scene::node::RechorNodeTable;

/// Samples node transforms over a clip into flattened per-frame matrices.
#[derive(Debug, Clone, Copy)]
pub struct RechorAnimBaker {
  frame_rate: f32,
}

/// The default implementation of the animation baker.
impl Default for RechorAnimBaker {
  fn default() -> Self {
    Self::new(DEFAULT_FRAME_RATE)
  }
}

/// Flatten a matrix into 16 floats: the three basis vectors, then the translation.
pub fn flatten_matrix(matrix: &Mat4) -> [f32; MATRIX_FLOATS] {
  matrix.to_cols_array()
}

/// The implementation of the animation baker.
impl RechorAnimBaker {

  /// Create a new animation baker.
  /// param frame_rate: The frames per second.
  /// return: The baker.
  pub fn new(frame_rate: f32) -> Self {
    assert!(frame_rate > 0.0, "frame rate must be positive");
    Self {
      frame_rate,
    }
  }

  pub fn frame_rate(&self) -> f32 {
    self.frame_rate
  }

  /// Get the frames sampled for a span.
  /// The first and last frame of the span are trimmed.
  pub fn frames(span: RechorAnimSpan) -> Range<i32> {
    span.start.saturating_add(1)..span.end
  }

  /// Get the time of a frame in seconds.
  pub fn frame_time(&self, frame: i32) -> f32 {
    frame as f32 / self.frame_rate
  }

  /// Bake a clip for every mesh.
  /// param meshes: The meshes, in scene order.
  /// param nodes: The node hierarchy of the file holding the clip.
  /// param span: The frame range of the clip.
  /// return: The anim, holding one frame set per mesh.
  pub fn bake(
    &self,
    meshes: &[RechorMeshRaw],
    nodes: &RechorNodeTable,
    span: RechorAnimSpan,
  ) -> Result<RechorAnim, RechorError> {
    let mut anim = RechorAnim {
      meshes: Vec::with_capacity(meshes.len()),
    };
    for mesh in meshes {
      anim.meshes.push(self.bake_mesh(mesh, nodes, span)?);
    }
    Ok(anim)
  }

  /// Bake a clip for one mesh.
  /// param mesh: The mesh with its bind data.
  /// param nodes: The node hierarchy.
  /// param span: The frame range.
  /// return: The frame set, empty if the mesh node is missing and the mesh has no bones.
  pub fn bake_mesh(
    &self,
    mesh: &RechorMeshRaw,
    nodes: &RechorNodeTable,
    span: RechorAnimSpan,
  ) -> Result<RechorAnimFrame, RechorError> {
    let num_of_frames = Self::frames(span).len();
    let mut frame_set = RechorAnimFrame::default();

    // Mesh matrix.
    if let Some(mesh_node) = nodes.find(&mesh.node_name) {
      frame_set.mesh_matrices.reserve(num_of_frames);
      for frame in Self::frames(span) {
        let global = nodes.global_transform_at(mesh_node, self.frame_time(frame));
        let transform = global * mesh.inv_mesh_bind_pose;
        frame_set.mesh_matrices.push(flatten_matrix(&transform).to_vec());
      }
    } else {
      log::debug!("Mesh node \"{}\" is not animated by this clip.", mesh.node_name);
    }

    // Bone matrices.
    if !mesh.bone_node_names.is_empty() {
      assert_eq!(
        mesh.bone_node_names.len(),
        mesh.inv_bone_bind_poses.len(),
        "mesh \"{}\" bone names and bind poses disagree",
        mesh.node_name,
      );
      let bone_nodes = mesh.bone_node_names.iter()
        .map(|name| nodes.find(name).ok_or_else(|| RechorError::new(
          RechorErrorKind::SourceParseFailed,
          &format!("Bone node \"{}\" of mesh \"{}\" is missing from the animation file.", name, mesh.node_name),
          None,
        )))
        .collect::<Result<Vec<_>, _>>()?;

      frame_set.bone_matrices.reserve(num_of_frames);
      for frame in Self::frames(span) {
        let time = self.frame_time(frame);
        let mut matrices = Vec::with_capacity(bone_nodes.len() * MATRIX_FLOATS);
        for (bone_node, inv_bind_pose) in bone_nodes.iter().zip(mesh.inv_bone_bind_poses.iter()) {
          let transform = nodes.global_transform_at(*bone_node, time) * *inv_bind_pose;
          matrices.extend_from_slice(&flatten_matrix(&transform));
        }
        frame_set.bone_matrices.push(matrices);
      }
    }

    Ok(frame_set)
  }

}
