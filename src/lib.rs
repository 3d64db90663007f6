//! Read, navigate, and mutate Portable Executable (PE/COFF) images.
//!
//! [`Image`] is the entry point: open a file or wrap an in-memory buffer,
//! then reach through its headers and data directories. Every accessor
//! reads through a shared, mutable [`byteview::ByteView`], so values
//! written through one view are visible to every other view over the same
//! image, and `save`/`save_to` write back exactly what was mutated in
//! place.

pub mod byteview;
pub mod directories;
pub mod enums;
pub mod error;
pub mod headers;
pub mod image;
pub mod rva;

pub use error::{Error, Result};
pub use image::Image;
