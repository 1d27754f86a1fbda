//! Prepares a markdown document for PDF rendering.
//!
//! Two rewrites are applied, in order:
//!
//! 1. **Glyph substitution** - emoji a PDF font would miss are replaced by
//!    bracketed tags (`✅` becomes `[YES]`) and stray variation selectors and
//!    zero-width joiners are dropped.
//! 2. **Diagram extraction** - each ```` ```mermaid ```` block is moved into
//!    a numbered sidecar (`assets/diagrams/diagram_01.mmd`) and replaced by
//!    an image reference to `assets/diagrams/diagram_01.svg`.
//!
//! Rendering the sidecars to SVG is left to an external tool such as
//! `mmdc`.
//!
//! ## Core Types
//!
//! - [`PrepConfig`] - input/output paths, glyph table, and diagram options
//! - [`GlyphTable`] - ordered literal glyph → tag replacements
//! - [`DiagramOptions`] - fence dialect, assets directory, image width
//! - [`PrepReport`] - what a run wrote
//!
//! ## Examples
//!
//! ```no_run
//! use pdfprep_lib::{run, PrepConfig};
//!
//! let report = run(&PrepConfig::new().input("README_pdf.md")).unwrap();
//! println!("{} diagrams", report.sidecars.len());
//! ```

pub mod diagrams;
mod error;
pub mod glyphs;
pub mod pipeline;

pub use diagrams::{DiagramOptions, ExtractedDiagram, Extraction, extract_diagrams};
pub use error::{PrepError, Result};
pub use glyphs::{GlyphTable, STRIPPED_MARKS, substitute_glyphs};
pub use pipeline::{
    PrepConfig, PrepReport, Prepared, ensure_assets_dir, load_document, prepare, run,
    write_output, write_sidecars,
};
