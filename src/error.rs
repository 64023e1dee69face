use thiserror::Error;

/// The failure category of a rechor error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RechorErrorKind {
  /// The source path does not exist.
  FileNotFound,
  /// The source path exists but could not be opened or read.
  FileUnreadable,
  /// The parser rejected the source file or hit an unsupported construct.
  SourceParseFailed,
  /// The compressed payload is corrupt, truncated or larger than allowed.
  DecompressionFailed,
  /// The compressor refused the input.
  CompressionFailed,
  /// The structured buffer could not be built or is malformed on read.
  EncodingFailed,
  /// The destination could not be written.
  WriteFailed,
  /// The caller passed a contradictory set of options.
  InvalidOptions,
}

/// The error type of the rechor crate.
#[derive(Error, Debug)]
pub struct RechorError {
  kind: RechorErrorKind,
  msg: String,
  #[source]
  source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// The implementation of the error type of the rechor crate.
impl RechorError {
  /// Create a new error.
  /// param kind: The failure category.
  /// param msg: The message of the error.
  /// param source: The source of the error.
  /// return: The error.
  pub fn new(kind: RechorErrorKind, msg: &str, source: Option<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Self {
      kind,
      msg: msg.to_string(),
      source,
    }
  }

  /// Map a failed read of `path` to `FileNotFound` or `FileUnreadable`.
  /// param path: The path which was read.
  /// param err: The I/O error.
  /// return: The error.
  pub fn from_read(path: &std::path::Path, err: std::io::Error) -> Self {
    let kind = if err.kind() == std::io::ErrorKind::NotFound {
      RechorErrorKind::FileNotFound
    } else {
      RechorErrorKind::FileUnreadable
    };
    Self::new(kind, &format!("Read file \"{}\" failed.", path.to_string_lossy()), Some(Box::new(err)))
  }

  /// Map a failed write of `path` to `WriteFailed`.
  /// param path: The path which was written.
  /// param err: The I/O error.
  /// return: The error.
  pub fn from_write(path: &std::path::Path, err: std::io::Error) -> Self {
    Self::new(
      RechorErrorKind::WriteFailed,
      &format!("Write file \"{}\" failed.", path.to_string_lossy()),
      Some(Box::new(err)),
    )
  }

  pub fn kind(&self) -> RechorErrorKind {
    self.kind
  }

  pub fn message(&self) -> &str {
    &self.msg
  }
}

/// The implementation Display trait for the error type of the rechor crate.
impl std::fmt::Display for RechorError {
  /// Format the error.
  /// param f: The formatter.
  /// return: The result.
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.msg)
  }
}
