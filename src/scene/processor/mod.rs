pub mod indexer;
pub mod skin;
pub mod baker;

pub use indexer::{
  RechorAttributeCache,
  RechorMeshIndexer,
};
pub use skin::{
  RechorBoneInfluence,
  RechorSkinBinding,
  RechorSkinWeightReducer,
};
pub use baker::RechorAnimBaker;
