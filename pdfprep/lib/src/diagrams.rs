//! Fenced diagram extraction.
//!
//! Every ```` ```mermaid ```` block is lifted out of the document into its
//! own sidecar source (`assets/diagrams/diagram_01.mmd`, ...) and replaced
//! with an image reference to the SVG an external renderer is expected to
//! produce next to it.
//!
//! Extraction is pure: it computes the rewritten markdown and the sidecar
//! contents, but writes nothing. See [`crate::pipeline`] for the I/O.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::error::Result;

pub const DEFAULT_DIALECT: &str = "mermaid";
pub const DEFAULT_ASSETS_DIR: &str = "assets/diagrams";
pub const DEFAULT_WIDTH: &str = "80%";

/// Extension of the sidecar source files.
pub const SOURCE_EXTENSION: &str = "mmd";
/// Extension of the rendered images the references point at.
pub const IMAGE_EXTENSION: &str = "svg";

/// Settings for [`extract_diagrams`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramOptions {
    /// Info-string that opens a diagram fence (`mermaid`).
    pub dialect: String,
    /// Directory holding sidecar sources and rendered images.
    pub assets_dir: PathBuf,
    /// Display width annotation on each image reference.
    pub width: String,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            dialect: DEFAULT_DIALECT.to_string(),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            width: DEFAULT_WIDTH.to_string(),
        }
    }
}

/// One diagram block lifted out of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDiagram {
    /// 1-based position among the document's diagram blocks.
    pub index: usize,
    /// Base file name, e.g. `diagram_01`.
    pub name: String,
    /// Block body with surrounding whitespace trimmed.
    #[serde(skip)]
    pub source: String,
    /// Where the body is written.
    pub source_path: PathBuf,
    /// Forward-slash path used in the image reference.
    pub image_path: String,
}

/// Result of [`extract_diagrams`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub markdown: String,
    pub diagrams: Vec<ExtractedDiagram>,
}

/// Base name for the diagram at `index`, zero-padded to two digits.
///
/// ```
/// use pdfprep_lib::diagrams::diagram_name;
///
/// assert_eq!(diagram_name(1), "diagram_01");
/// assert_eq!(diagram_name(123), "diagram_123");
/// ```
pub fn diagram_name(index: usize) -> String {
    format!("diagram_{index:02}")
}

/// Markdown image reference for a rendered diagram.
///
/// ```
/// use pdfprep_lib::diagrams::image_reference;
///
/// assert_eq!(
///     image_reference(2, "assets/diagrams/diagram_02.svg", "80%"),
///     "![Diagram 2](assets/diagrams/diagram_02.svg){ width=80% }"
/// );
/// ```
pub fn image_reference(index: usize, image_path: &str, width: &str) -> String {
    format!("![Diagram {index}]({image_path}){{ width={width} }}")
}

/// Renders a path with `/` separators regardless of host convention, so
/// emitted markdown is portable.
fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Builds the fence pattern for `dialect`.
///
/// The body is captured lazily so each block ends at the nearest closing
/// fence. A fence that is never closed does not match.
fn fence_pattern(dialect: &str) -> Result<Regex> {
    let pattern = format!(r"(?s)```{}\s*(.*?)```", regex::escape(dialect));
    Ok(Regex::new(&pattern)?)
}

/// Extracts every fenced diagram block from `content`.
///
/// Blocks are numbered from 1 in order of appearance. Each matched span,
/// opening fence through closing fence, is replaced by an
/// [`image_reference`]; all other text is copied through unchanged.
///
/// ## Errors
///
/// Returns `PrepError::Pattern` if the fence pattern cannot be built.
///
/// ## Examples
///
/// ```
/// use pdfprep_lib::diagrams::{extract_diagrams, DiagramOptions};
///
/// let doc = "Intro\n```mermaid\nflowchart LR\n  A --> B\n```\nOutro";
/// let extraction = extract_diagrams(doc, &DiagramOptions::default()).unwrap();
///
/// assert_eq!(
///     extraction.markdown,
///     "Intro\n![Diagram 1](assets/diagrams/diagram_01.svg){ width=80% }\nOutro"
/// );
/// assert_eq!(extraction.diagrams[0].source, "flowchart LR\n  A --> B");
/// ```
pub fn extract_diagrams(content: &str, options: &DiagramOptions) -> Result<Extraction> {
    let pattern = fence_pattern(&options.dialect)?;

    let mut markdown = String::with_capacity(content.len());
    let mut diagrams = Vec::new();
    let mut cursor = 0;

    for caps in pattern.captures_iter(content) {
        let Some(span) = caps.get(0) else {
            continue;
        };
        let body = caps.get(1).map_or("", |m| m.as_str()).trim();

        let index = diagrams.len() + 1;
        let name = diagram_name(index);
        let source_path = options
            .assets_dir
            .join(format!("{name}.{SOURCE_EXTENSION}"));
        let image_path = forward_slashes(
            &options
                .assets_dir
                .join(format!("{name}.{IMAGE_EXTENSION}")),
        );

        markdown.push_str(&content[cursor..span.start()]);
        markdown.push_str(&image_reference(index, &image_path, &options.width));
        cursor = span.end();

        tracing::debug!(index, name = %name, body_len = body.len(), "Extracted diagram");
        diagrams.push(ExtractedDiagram {
            index,
            name,
            source: body.to_string(),
            source_path,
            image_path,
        });
    }

    markdown.push_str(&content[cursor..]);

    Ok(Extraction { markdown, diagrams })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str) -> Extraction {
        extract_diagrams(content, &DiagramOptions::default()).unwrap()
    }

    #[test]
    fn test_no_blocks_is_noop() {
        let input = "# Title\n\n```rust\nfn main() {}\n```\n";
        let extraction = extract(input);
        assert_eq!(extraction.markdown, input);
        assert!(extraction.diagrams.is_empty());
    }

    #[test]
    fn test_single_block_replaced() {
        let extraction = extract("before\n```mermaid\ngraph TD\n  A-->B\n```\nafter\n");
        assert_eq!(
            extraction.markdown,
            "before\n![Diagram 1](assets/diagrams/diagram_01.svg){ width=80% }\nafter\n"
        );
        assert_eq!(extraction.diagrams.len(), 1);

        let diagram = &extraction.diagrams[0];
        assert_eq!(diagram.index, 1);
        assert_eq!(diagram.name, "diagram_01");
        assert_eq!(diagram.source, "graph TD\n  A-->B");
        assert_eq!(
            diagram.source_path,
            Path::new("assets/diagrams").join("diagram_01.mmd")
        );
        assert_eq!(diagram.image_path, "assets/diagrams/diagram_01.svg");
    }

    #[test]
    fn test_blocks_are_not_greedy() {
        let input = "```mermaid\nA\n```\nmiddle\n```mermaid\nB\n```\n";
        let extraction = extract(input);

        assert_eq!(extraction.diagrams.len(), 2);
        assert_eq!(extraction.diagrams[0].source, "A");
        assert_eq!(extraction.diagrams[1].source, "B");
        assert_eq!(
            extraction.markdown,
            "![Diagram 1](assets/diagrams/diagram_01.svg){ width=80% }\nmiddle\n\
             ![Diagram 2](assets/diagrams/diagram_02.svg){ width=80% }\n"
        );
    }

    #[test]
    fn test_references_keep_order_and_distinct_indices() {
        let input: String = (0..12)
            .map(|i| format!("para {i}\n```mermaid\nnode{i}\n```\n"))
            .collect();
        let extraction = extract(&input);

        assert_eq!(extraction.diagrams.len(), 12);
        let mut last = 0;
        for diagram in &extraction.diagrams {
            let reference = format!("![Diagram {}]", diagram.index);
            let at = extraction.markdown.find(&reference).unwrap();
            assert!(at >= last);
            last = at;
            assert_eq!(diagram.source, format!("node{}", diagram.index - 1));
        }
        assert_eq!(extraction.diagrams[9].name, "diagram_10");
        assert_eq!(extraction.markdown.matches("![Diagram ").count(), 12);
    }

    #[test]
    fn test_unterminated_fence_left_as_is() {
        let input = "text\n```mermaid\ngraph TD\n  A-->B\n";
        let extraction = extract(input);
        assert_eq!(extraction.markdown, input);
        assert!(extraction.diagrams.is_empty());
    }

    #[test]
    fn test_other_fences_untouched() {
        let input = "```js\nconsole.log(1)\n```\n```mermaid\nA\n```\n";
        let extraction = extract(input);
        assert!(extraction.markdown.starts_with("```js\nconsole.log(1)\n```\n"));
        assert_eq!(extraction.diagrams.len(), 1);
    }

    #[test]
    fn test_body_whitespace_trimmed() {
        let extraction = extract("```mermaid   \n\n   sequenceDiagram\n  A->>B: hi\n\n\n```");
        assert_eq!(extraction.diagrams[0].source, "sequenceDiagram\n  A->>B: hi");
    }

    #[test]
    fn test_empty_block() {
        let extraction = extract("```mermaid\n```");
        assert_eq!(extraction.diagrams.len(), 1);
        assert_eq!(extraction.diagrams[0].source, "");
        assert_eq!(
            extraction.markdown,
            "![Diagram 1](assets/diagrams/diagram_01.svg){ width=80% }"
        );
    }

    #[test]
    fn test_custom_options() {
        let options = DiagramOptions {
            dialect: "plantuml".to_string(),
            assets_dir: PathBuf::from("build/img"),
            width: "50%".to_string(),
        };
        let extraction =
            extract_diagrams("```plantuml\n@startuml\n@enduml\n```", &options).unwrap();
        assert_eq!(
            extraction.markdown,
            "![Diagram 1](build/img/diagram_01.svg){ width=50% }"
        );
        assert_eq!(extraction.diagrams[0].source_path, Path::new("build/img/diagram_01.mmd"));
    }

    #[test]
    fn test_dialect_is_literal() {
        let options = DiagramOptions {
            dialect: "c++".to_string(),
            ..DiagramOptions::default()
        };
        let extraction = extract_diagrams("```cc\nx\n```\n```c++\ny\n```", &options).unwrap();
        assert_eq!(extraction.diagrams.len(), 1);
        assert_eq!(extraction.diagrams[0].source, "y");
    }

    #[test]
    fn test_forward_slashes() {
        assert_eq!(
            forward_slashes(Path::new(r"assets\diagrams\diagram_01.svg")),
            "assets/diagrams/diagram_01.svg"
        );
    }

    #[test]
    fn test_diagram_name_padding() {
        assert_eq!(diagram_name(1), "diagram_01");
        assert_eq!(diagram_name(9), "diagram_09");
        assert_eq!(diagram_name(42), "diagram_42");
    }
}
