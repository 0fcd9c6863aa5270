// imgmill/src/processors/mod.rs
mod compressor;
mod cropper;
mod loader;
mod metadata;
mod resizer;

pub use compressor::Compressor;
pub use cropper::Cropper;
pub use loader::Loader;
pub use metadata::MetadataProcessor;
pub use resizer::Resizer;

pub mod prelude {
    pub use super::{Compressor, Cropper, Loader, MetadataProcessor, Resizer};
}
