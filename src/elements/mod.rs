mod error;
mod loader;
pub mod parser;
mod types;

pub use error::ParseError;
pub use loader::ElementsLoader;
pub use parser::parse_elements;
pub use types::{ElementCatalog, OrbitalElementSet};
