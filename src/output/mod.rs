// Output module: template rendering and artifact writing

pub mod sink;
pub mod templates;

pub use sink::*;
pub use templates::*;
