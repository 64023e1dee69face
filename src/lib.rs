pub mod prelude;
pub mod error;
pub mod options;
pub mod scene;
pub mod codec;
