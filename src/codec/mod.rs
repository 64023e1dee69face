pub mod compression;
pub mod scene_codec;

pub use scene_codec::RechorSceneCodec;
