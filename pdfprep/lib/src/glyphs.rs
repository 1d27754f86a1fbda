//! Emoji-to-tag substitution.
//!
//! PDF engines often lack a font covering emoji, so glyphs are swapped for
//! bracketed ASCII tags (`🛒` becomes `[CART]`) before rendering. Only glyphs
//! listed in a [`GlyphTable`] are touched; there is no generic emoji
//! detection.
//!
//! ## Examples
//!
//! ```
//! use pdfprep_lib::glyphs::{substitute_glyphs, GlyphTable};
//!
//! let table = GlyphTable::default();
//! assert_eq!(substitute_glyphs("Hello 🛒 World", &table), "Hello [CART] World");
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{PrepError, Result};

/// Invisible formatting marks removed after substitution: the emoji
/// variation selector (U+FE0F) and the zero-width joiner (U+200D).
pub const STRIPPED_MARKS: [char; 2] = ['\u{FE0F}', '\u{200D}'];

const DEFAULT_GLYPHS: &[(&str, &str)] = &[
    ("🛒", "[CART]"),
    ("📚", "[BOOK]"),
    ("🎓", "[LEARN]"),
    ("📁", "[FOLDER]"),
    ("🚀", "[START]"),
    ("🔍", "[SEARCH]"),
    ("✅", "[YES]"),
    ("❌", "[NO]"),
    ("✨", "[STAR]"),
    ("🔧", "[TOOL]"),
    ("💡", "[IDEA]"),
    ("📈", "[GRAPH]"),
    ("📝", "[DOC]"),
    ("🆘", "[HELP]"),
    ("🎉", "[SUCCESS]"),
    ("🧪", "[TEST]"),
    ("📊", "[DATA]"),
    ("🎨", "[ART]"),
    ("🔎", "[FIND]"),
    ("📦", "[PKG]"),
    ("🎯", "[TARGET]"),
    ("🔗", "[LINK]"),
    ("✔", "[OK]"),
    ("✓", "[OK]"),
];

/// An ordered list of literal glyph → tag replacements.
///
/// Keys are matched as literal substrings, never as patterns. A key may be
/// several code points that render as one glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphTable {
    entries: Vec<(String, String)>,
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_GLYPHS
                .iter()
                .map(|(glyph, tag)| ((*glyph).to_string(), (*tag).to_string()))
                .collect(),
        }
    }
}

/// On-disk shape of a user glyph table.
#[derive(Debug, Deserialize)]
struct GlyphFile {
    #[serde(default = "inherit_defaults")]
    inherit_defaults: bool,
    #[serde(default)]
    glyph: Vec<GlyphEntry>,
}

#[derive(Debug, Deserialize)]
struct GlyphEntry {
    emoji: String,
    tag: String,
}

fn inherit_defaults() -> bool {
    true
}

impl GlyphTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a replacement.
    ///
    /// If `glyph` is already present it keeps its position and takes the
    /// new tag; otherwise the entry is appended.
    ///
    /// ## Examples
    ///
    /// ```
    /// use pdfprep_lib::glyphs::{substitute_glyphs, GlyphTable};
    ///
    /// let table = GlyphTable::new().with_entry("🐛", "[BUG]");
    /// assert_eq!(substitute_glyphs("fix 🐛", &table), "fix [BUG]");
    /// ```
    pub fn with_entry<G: Into<String>, T: Into<String>>(mut self, glyph: G, tag: T) -> Self {
        let glyph = glyph.into();
        let tag = tag.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == glyph) {
            Some(entry) => entry.1 = tag,
            None => self.entries.push((glyph, tag)),
        }
        self
    }

    /// The replacements, in application order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a TOML glyph table.
    ///
    /// ```toml
    /// inherit_defaults = true
    ///
    /// [[glyph]]
    /// emoji = "🐛"
    /// tag = "[BUG]"
    /// ```
    ///
    /// With `inherit_defaults` (the default) the entries are layered over
    /// [`GlyphTable::default`]; otherwise they form the whole table.
    ///
    /// ## Errors
    ///
    /// Returns `PrepError::GlyphTable` for malformed TOML and
    /// `PrepError::EmptyGlyph` for an entry whose `emoji` is empty.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    /// Reads and parses a TOML glyph table from disk.
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| PrepError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&content, path)?;
        tracing::debug!(entries = table.len(), "Loaded glyph table");
        Ok(table)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let file: GlyphFile = toml::from_str(content).map_err(|source| PrepError::GlyphTable {
            path: path.to_path_buf(),
            source,
        })?;

        let base = if file.inherit_defaults {
            Self::default()
        } else {
            Self::new()
        };

        file.glyph.into_iter().try_fold(base, |table, entry| {
            if entry.emoji.is_empty() {
                return Err(PrepError::EmptyGlyph { tag: entry.tag });
            }
            Ok(table.with_entry(entry.emoji, entry.tag))
        })
    }
}

/// Replaces every table glyph with its tag, then strips [`STRIPPED_MARKS`].
///
/// Each entry is applied across the whole buffer before the next entry is
/// considered, so a tag containing a later entry's glyph would itself be
/// rewritten. The marks are removed everywhere, not only next to a
/// replaced glyph.
pub fn substitute_glyphs(content: &str, table: &GlyphTable) -> String {
    substitute_counting(content, table).0
}

/// Same as [`substitute_glyphs`], also returning how many glyphs were
/// replaced.
pub(crate) fn substitute_counting(content: &str, table: &GlyphTable) -> (String, usize) {
    let mut text = content.to_string();
    let mut replaced = 0;

    for (glyph, tag) in table.entries() {
        let hits = text.matches(glyph.as_str()).count();
        if hits == 0 {
            continue;
        }
        tracing::trace!(glyph = %glyph, tag = %tag, hits, "Substituting glyph");
        text = text.replace(glyph.as_str(), tag);
        replaced += hits;
    }

    text.retain(|c| !STRIPPED_MARKS.contains(&c));
    (text, replaced)
}
