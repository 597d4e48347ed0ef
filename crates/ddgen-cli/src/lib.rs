pub mod loader;
pub mod orchestrator;

pub use loader::{DefaultSchemaLoader, SchemaLoader};
pub use orchestrator::{GenerateOptions, GenerationSummary, build_filter, generate, split_csv};
