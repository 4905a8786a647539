//! Output adapter. Owns the `build/` tree.

pub mod build_dir;

pub use build_dir::BuildDir;
