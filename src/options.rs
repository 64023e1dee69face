use bitflags::bitflags;
use serde::{
  Deserialize,
  Serialize,
};

/// The sampling rate used when baking animation clips.
pub const DEFAULT_FRAME_RATE: f32 = 60.0;

/// The zstd level used when none is configured.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// The largest uncompressed payload accepted on load (1 GiB).
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: u64 = 1 << 30;

bitflags! {
  /// What to pull out of a source file.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct RechorImportOptions: u32 {
    const POLYGON = 0x01;
    const MATERIAL = 0x02;
    const MESH = Self::POLYGON.bits() | Self::MATERIAL.bits();
    const BONE_WEIGHT = 0x04;
    const ANIM = 0x08;
    const ALL = 0x0f;
  }
}

impl Default for RechorImportOptions {
  fn default() -> Self {
    Self::ALL
  }
}

/// The encoding of the structured buffer before compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RechorFormat {
  /// Compact binary records (bincode).
  #[default]
  Binary,
  /// Human-readable JSON records.
  Text,
}

fn default_compression_level() -> i32 {
  DEFAULT_COMPRESSION_LEVEL
}

fn default_max_decompressed_size() -> u64 {
  DEFAULT_MAX_DECOMPRESSED_SIZE
}

/// Options for writing a scene file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechorSaveOptions {
  #[serde(default)]
  pub format: RechorFormat,
  #[serde(default = "default_compression_level")]
  pub compression_level: i32,
}

impl Default for RechorSaveOptions {
  fn default() -> Self {
    Self {
      format: RechorFormat::Binary,
      compression_level: DEFAULT_COMPRESSION_LEVEL,
    }
  }
}

/// Options for reading a scene file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechorLoadOptions {
  #[serde(default)]
  pub format: RechorFormat,
  #[serde(default = "default_max_decompressed_size")]
  pub max_decompressed_size: u64,
}

impl Default for RechorLoadOptions {
  fn default() -> Self {
    Self {
      format: RechorFormat::Binary,
      max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
    }
  }
}
