//! Error types for markdown preparation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while preparing a markdown document for PDF rendering.
///
/// The text transformations themselves cannot fail on well-formed input;
/// every variant here is either a filesystem failure or a bad
/// configuration value.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("Failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory `{path}`: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glyph table `{path}`: {source}")]
    GlyphTable {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A glyph table entry had an empty `emoji` key.
    #[error("Glyph table entry for tag `{tag}` has an empty emoji")]
    EmptyGlyph { tag: String },

    #[error("Invalid diagram pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, PrepError>;
