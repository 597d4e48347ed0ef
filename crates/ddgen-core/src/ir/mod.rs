pub mod block;
pub mod operations;
pub mod schemas;

pub use block::*;
pub use operations::*;
pub use schemas::*;
