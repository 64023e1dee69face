pub mod vertex;
pub mod mesh;
pub mod anim;
pub mod node;
pub mod raw;
pub mod scene;
pub mod processor;
pub mod loader;

pub use vertex::RechorVertex;
pub use mesh::RechorMesh;
pub use anim::{
  RechorAnim,
  RechorAnimFrame,
};
pub use node::{
  RechorNode,
  RechorNodeTable,
};
pub use raw::{
  RechorMeshRaw,
  RechorAnimSpan,
  RechorAnimClip,
  RechorAnimRaw,
  RechorSourceRaw,
  RechorSceneRaw,
};
pub use scene::RechorScene;
