//! Image adapter. Decodes covers and writes JPEG thumbnails with the `image` crate.

pub mod jpeg_resizer;

pub use jpeg_resizer::JpegResizer;
