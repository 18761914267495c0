// Declarative type and function model

pub mod functions;
pub mod types;

pub use functions::*;
pub use types::*;
