use crate::error::{
  RechorError,
  RechorErrorKind,
};

/// The size of the uncompressed-length prefix.
pub const LENGTH_PREFIX_SIZE: usize = std::mem::size_of::<u64>();

/// Compress data, prefixed with its uncompressed length.
/// param data: The uncompressed bytes.
/// param level: The zstd level.
/// return: `[u64 LE length][zstd frame]`.
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>, RechorError> {
  let compressed = zstd::bulk::compress(data, level)
    .map_err(|err| RechorError::new(RechorErrorKind::CompressionFailed, "Compress scene buffer failed.", Some(Box::new(err))))?;

  let mut output = Vec::with_capacity(LENGTH_PREFIX_SIZE + compressed.len());
  output.extend_from_slice(&(data.len() as u64).to_le_bytes());
  output.extend_from_slice(&compressed);
  log::debug!("Compressed {} bytes into {} bytes.", data.len(), output.len());
  Ok(output)
}

/// Read the uncompressed length recorded in front of a payload.
/// param data: The prefixed payload.
/// return: The length.
pub fn uncompressed_size(data: &[u8]) -> Result<u64, RechorError> {
  let prefix: [u8; LENGTH_PREFIX_SIZE] = data.get(..LENGTH_PREFIX_SIZE)
    .and_then(|prefix| prefix.try_into().ok())
    .ok_or_else(|| RechorError::new(
      RechorErrorKind::DecompressionFailed,
      &format!("Compressed payload is {} bytes, shorter than its length prefix.", data.len()),
      None,
    ))?;
  Ok(u64::from_le_bytes(prefix))
}

/// Decompress a payload written by `compress`.
/// The output buffer is sized from the recorded length, never guessed.
/// param data: The prefixed payload.
/// param max_size: The largest accepted uncompressed length.
/// return: The uncompressed bytes.
pub fn decompress(data: &[u8], max_size: u64) -> Result<Vec<u8>, RechorError> {
  let size = uncompressed_size(data)?;
  if size > max_size {
    return Err(RechorError::new(
      RechorErrorKind::DecompressionFailed,
      &format!("Declared uncompressed size {} exceeds the limit of {} bytes.", size, max_size),
      None,
    ));
  }
  let capacity = usize::try_from(size)
    .map_err(|err| RechorError::new(RechorErrorKind::DecompressionFailed, "Declared uncompressed size does not fit in memory.", Some(Box::new(err))))?;

  let output = zstd::bulk::decompress(&data[LENGTH_PREFIX_SIZE..], capacity)
    .map_err(|err| RechorError::new(RechorErrorKind::DecompressionFailed, "Decompress scene buffer failed.", Some(Box::new(err))))?;
  if output.len() != capacity {
    return Err(RechorError::new(
      RechorErrorKind::DecompressionFailed,
      &format!("Decompressed {} bytes but {} were declared.", output.len(), capacity),
      None,
    ));
  }
  Ok(output)
}
