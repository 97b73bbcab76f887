pub mod config;
pub mod elements;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod propagate;
pub mod proximity;
pub mod render;
pub mod timeline;
pub mod visibility;

pub use error::{Error, Result};
