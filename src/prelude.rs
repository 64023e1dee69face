pub use crate::error::{
  RechorError,
  RechorErrorKind,
};
pub use crate::options::{
  RechorImportOptions,
  RechorFormat,
  RechorSaveOptions,
  RechorLoadOptions,
};
pub use crate::scene::{
  RechorScene,
  RechorMesh,
  RechorAnim,
  RechorAnimFrame,
};
pub use crate::scene::processor::{
  RechorAttributeCache,
  RechorMeshIndexer,
  RechorSkinWeightReducer,
  RechorAnimBaker,
};
pub use crate::scene::loader::{
  RechorGltfLoader,
  RechorImporter,
};
pub use crate::codec::RechorSceneCodec;
