use std::fs;
use std::path::Path;

use crate::elements::error::ParseError;
use crate::elements::parser::parse_elements;
use crate::elements::types::ElementCatalog;

pub struct ElementsLoader;

impl ElementsLoader {
    /// Read and parse an element file. The file handle is released before parsing starts.
    pub fn load(path: &Path) -> Result<ElementCatalog, ParseError> {
        let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let catalog = parse_elements(&content)?;
        log::info!(
            "Loaded {} element sets from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }
}
