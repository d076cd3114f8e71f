pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod manifest;
pub mod placeholder;
pub mod template;

pub use error::{Error, LeafError, PlaceholderError, ReplacementFailure, Result, Section};
pub use generate::{generate, generate_documents};
pub use template::{Template, TemplateSettings, Value};
