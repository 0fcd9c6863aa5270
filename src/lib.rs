mod cli;
mod core;
mod processors;
mod utils;

pub use crate::cli::{
    answer_is_yes, prompt, prompt_optional, prompt_parsed, prompt_yes_no, Cli, Commands, Edge,
};
pub use crate::core::pipeline::Pipeline;
pub use crate::core::{
    CropEdge, CropSpec, ExtraMetadata, OutputFormat, PipelineError, ProcessConfig, Result,
    RunStats, DEFAULT_QUALITY,
};
pub use crate::processors::{Compressor, Cropper, Loader, MetadataProcessor, Resizer};
pub use crate::utils::{
    backup_path, format_file_size, format_space_delta, is_supported_input, temp_output_path,
    SUPPORTED_EXTENSIONS,
};

pub mod prelude {
    pub use crate::{
        Compressor, Cropper, Loader, MetadataProcessor, Pipeline, ProcessConfig, Resizer,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
