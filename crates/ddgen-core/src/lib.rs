pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod transform;

pub use config::DdgenConfig;
pub use ir::{BlockDefinition, BlockGenerationConfig, HttpMethod};
pub use transform::{OperationFilter, SchemaParser, build_block};
