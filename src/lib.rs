//! gm-codegen - Generate graphics math library sources
//!
//! Turns a declarative model of value types and function overloads into
//! headers, tests, benchmarks and Python bindings rendered from templates.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod naming;
pub mod output;

// Re-export main types
pub use catalog::{Catalog, TypeCatalog};
pub use config::Config;
pub use error::{Error, Result};
pub use generate::{Artifact, ArtifactKind, Driver, Generation, GenerationContext};
pub use output::{FileSink, TemplateEngine};
