pub mod emitters;
pub mod error;
pub mod generator;
pub mod registry;
pub mod type_mapper;

pub use emitters::manifest::MANIFEST_FILE_NAME;
pub use error::GeneratorError;
pub use generator::{BlockGenerator, GeneratedBlock, GeneratedFile, OutputOptions};
pub use registry::NameRegistry;
