pub mod block_builder;
pub mod extract;
pub mod naming;
pub mod type_converter;

pub use block_builder::build_block;
pub use extract::{OperationFilter, SchemaParser};
