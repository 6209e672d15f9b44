//! Parsed files and syntax formats.

use std::sync::Arc;

use smol_str::SmolStr;

use super::Body;

/// File extension of the native syntax.
pub const NATIVE_EXT: &str = ".strata";
/// File extension of the JSON-mapped syntax.
pub const JSON_EXT: &str = ".strata.json";

/// Which concrete syntax a body was parsed from.
///
/// Both map onto the same [`Body`] representation, but JSON bodies get
/// reduced-fidelity handling for some queries: interpolated traversals
/// inside JSON strings cannot be statically typed the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Native,
    Json,
}

impl FileFormat {
    /// Detect the format from a file name, or `None` for unknown names.
    pub fn detect(name: &str) -> Option<FileFormat> {
        if name.ends_with(JSON_EXT) {
            Some(FileFormat::Json)
        } else if name.ends_with(NATIVE_EXT) {
            Some(FileFormat::Native)
        } else {
            None
        }
    }
}

/// One parsed file within an analysis unit.
///
/// The source text is retained because some queries classify raw text
/// between syntax nodes (e.g. completion between container items).
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub name: SmolStr,
    pub format: FileFormat,
    pub src: Arc<str>,
    pub body: Body,
}

impl ParsedFile {
    pub fn new(
        name: impl Into<SmolStr>,
        format: FileFormat,
        src: impl Into<Arc<str>>,
        body: Body,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            src: src.into(),
            body,
        }
    }
}
