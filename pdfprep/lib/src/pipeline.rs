//! Load, transform, and write a document.
//!
//! [`prepare`] is the pure half (text in, text plus sidecars out);
//! [`run`] wraps it with the filesystem reads and writes.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::diagrams::{DiagramOptions, ExtractedDiagram, extract_diagrams};
use crate::error::{PrepError, Result};
use crate::glyphs::{GlyphTable, substitute_counting};

pub const DEFAULT_INPUT: &str = "README_pdf.md";
pub const DEFAULT_OUTPUT: &str = "README_build.md";

/// Configuration for a preparation run.
///
/// ## Examples
///
/// ```
/// use pdfprep_lib::PrepConfig;
///
/// let config = PrepConfig::new()
///     .input("docs/guide.md")
///     .output("build/guide.md")
///     .width("60%");
/// ```
#[derive(Debug, Clone)]
pub struct PrepConfig {
    /// Source markdown document.
    pub input: PathBuf,
    /// Destination of the transformed document.
    pub output: PathBuf,
    /// Glyph replacements applied before diagram extraction.
    pub glyphs: GlyphTable,
    /// Diagram fence and sidecar settings.
    pub diagrams: DiagramOptions,
    /// Compute everything but write nothing.
    pub dry_run: bool,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            glyphs: GlyphTable::default(),
            diagrams: DiagramOptions::default(),
            dry_run: false,
        }
    }
}

impl PrepConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input = path.into();
        self
    }

    pub fn output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = path.into();
        self
    }

    /// Set the directory that receives diagram sources.
    pub fn assets_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.diagrams.assets_dir = path.into();
        self
    }

    /// Set the fence info-string that marks a diagram block.
    pub fn dialect<S: Into<String>>(mut self, dialect: S) -> Self {
        self.diagrams.dialect = dialect.into();
        self
    }

    /// Set the `width=` annotation on image references.
    pub fn width<S: Into<String>>(mut self, width: S) -> Self {
        self.diagrams.width = width.into();
        self
    }

    pub fn glyphs(mut self, table: GlyphTable) -> Self {
        self.glyphs = table;
        self
    }

    pub fn dry_run(mut self, enable: bool) -> Self {
        self.dry_run = enable;
        self
    }
}

/// Output of [`prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub markdown: String,
    pub diagrams: Vec<ExtractedDiagram>,
    pub glyphs_replaced: usize,
}

/// What a [`run`] produced.
#[derive(Debug, Clone, Serialize)]
pub struct PrepReport {
    pub output: PathBuf,
    /// Sidecar sources, in document order.
    pub sidecars: Vec<PathBuf>,
    pub diagrams: Vec<ExtractedDiagram>,
    pub glyphs_replaced: usize,
    pub dry_run: bool,
}

/// Reads the whole document as UTF-8.
#[tracing::instrument]
pub fn load_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| PrepError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Creates `path` and any missing parents. Succeeds if it already exists.
#[tracing::instrument]
pub fn ensure_assets_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| PrepError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Substitutes glyphs, then extracts diagrams. Touches no files.
///
/// ## Examples
///
/// ```
/// use pdfprep_lib::{prepare, PrepConfig};
///
/// let prepared = prepare("🚀 Go\n```mermaid\nA-->B\n```", &PrepConfig::default()).unwrap();
/// assert_eq!(
///     prepared.markdown,
///     "[START] Go\n![Diagram 1](assets/diagrams/diagram_01.svg){ width=80% }"
/// );
/// assert_eq!(prepared.glyphs_replaced, 1);
/// ```
pub fn prepare(content: &str, config: &PrepConfig) -> Result<Prepared> {
    let (substituted, glyphs_replaced) = substitute_counting(content, &config.glyphs);
    let extraction = extract_diagrams(&substituted, &config.diagrams)?;

    Ok(Prepared {
        markdown: extraction.markdown,
        diagrams: extraction.diagrams,
        glyphs_replaced,
    })
}

/// Writes each diagram body to its sidecar path, overwriting.
///
/// Stops at the first failure; sidecars already written stay on disk.
pub fn write_sidecars(diagrams: &[ExtractedDiagram]) -> Result<Vec<PathBuf>> {
    diagrams
        .iter()
        .map(|diagram| -> Result<PathBuf> {
            std::fs::write(&diagram.source_path, &diagram.source).map_err(|source| {
                PrepError::Write {
                    path: diagram.source_path.clone(),
                    source,
                }
            })?;
            tracing::debug!(path = %diagram.source_path.display(), "Wrote diagram source");
            Ok(diagram.source_path.clone())
        })
        .collect()
}

/// Writes the transformed document, replacing any existing file.
#[tracing::instrument(skip(markdown), fields(len = markdown.len()))]
pub fn write_output(path: &Path, markdown: &str) -> Result<()> {
    std::fs::write(path, markdown).map_err(|source| PrepError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs the full pipeline described by `config`.
///
/// The assets directory is created first, even when the document turns out
/// to hold no diagrams. With `dry_run` nothing is created or written and
/// the report lists what would have been.
///
/// ## Errors
///
/// Any read, write, or directory failure aborts the run. Nothing already
/// written is rolled back.
#[tracing::instrument(skip(config), fields(input = %config.input.display()))]
pub fn run(config: &PrepConfig) -> Result<PrepReport> {
    if !config.dry_run {
        ensure_assets_dir(&config.diagrams.assets_dir)?;
    }

    let content = load_document(&config.input)?;
    let prepared = prepare(&content, config)?;

    let sidecars = if config.dry_run {
        prepared
            .diagrams
            .iter()
            .map(|diagram| diagram.source_path.clone())
            .collect()
    } else {
        let written = write_sidecars(&prepared.diagrams)?;
        write_output(&config.output, &prepared.markdown)?;
        written
    };

    tracing::info!(
        output = %config.output.display(),
        diagrams = prepared.diagrams.len(),
        glyphs = prepared.glyphs_replaced,
        dry_run = config.dry_run,
        "Prepared document"
    );

    Ok(PrepReport {
        output: config.output.clone(),
        sidecars,
        diagrams: prepared.diagrams,
        glyphs_replaced: prepared.glyphs_replaced,
        dry_run: config.dry_run,
    })
}
