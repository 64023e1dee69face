use glam::Mat4;

use crate::scene::RechorAnim;
use crate::scene::node::RechorNodeTable;

/// A non-indexed mesh straight out of the parser, one attribute set per triangle corner.
/// `colors`, `bone_indices` and `bone_weights` may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RechorMeshRaw {
  /// The name of the node which owns the mesh.
  pub node_name: String,
  /// The control point referenced by each corner.
  pub indices: Vec<u32>,
  pub vertices: Vec<[f32; 3]>,
  pub normals: Vec<[f32; 3]>,
  pub colors: Vec<[f32; 4]>,
  pub uvs: Vec<[f32; 2]>,
  pub texture: String,
  pub bone_indices: Vec<[u32; 4]>,
  pub bone_weights: Vec<[f32; 4]>,

  // Bind data, only used for baking.
  pub bone_node_names: Vec<String>,
  pub inv_bone_bind_poses: Vec<Mat4>,
  pub inv_mesh_bind_pose: Mat4,
}

/// The default implementation of the raw mesh.
impl Default for RechorMeshRaw {
  fn default() -> Self {
    Self {
      node_name: String::new(),
      indices: Vec::new(),
      vertices: Vec::new(),
      normals: Vec::new(),
      colors: Vec::new(),
      uvs: Vec::new(),
      texture: String::new(),
      bone_indices: Vec::new(),
      bone_weights: Vec::new(),
      bone_node_names: Vec::new(),
      inv_bone_bind_poses: Vec::new(),
      inv_mesh_bind_pose: Mat4::IDENTITY,
    }
  }
}

/// The frame range of a clip, in whole frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RechorAnimSpan {
  pub start: i32,
  pub end: i32,
}

/// An animation clip found in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RechorAnimClip {
  pub name: String,
  pub span: RechorAnimSpan,
}

/// A baked clip waiting to be moved into a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct RechorAnimRaw {
  pub name: String,
  pub span: RechorAnimSpan,
  pub anim: RechorAnim,
}

/// Everything the parser adapter extracts from one source file.
#[derive(Debug, Clone, Default)]
pub struct RechorSourceRaw {
  pub meshes: Vec<RechorMeshRaw>,
  pub nodes: RechorNodeTable,
  pub clip: Option<RechorAnimClip>,
}

/// The raw data accumulated over one or more source files.
#[derive(Debug, Clone, Default)]
pub struct RechorSceneRaw {
  pub meshes: Vec<RechorMeshRaw>,
  pub anims: Vec<RechorAnimRaw>,
}
