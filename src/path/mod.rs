//! Path contexts — per-analysis-unit state.
//!
//! A [`PathContext`] holds everything scoped to one analysis unit: the
//! schema, the parsed files, the collected reference origins/targets, and
//! the known function signatures. All of it is read-only during queries;
//! the schema is replaced wholesale behind a read-write lock so concurrent
//! readers finish before a swap, and collected references are rebuilt by
//! the caller afterwards.
//!
//! Multiple paths are independent; callers may process them in parallel and
//! pass the set of known paths explicitly where cross-path matching is
//! needed.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::FileId;
use crate::error::Error;
use crate::refs::{ReferenceOrigins, ReferenceTargets};
use crate::schema::BodySchema;
use crate::syntax::{Body, FileFormat, ParsedFile};
use crate::types::{FunctionSignature, FunctionTable};

/// Formats documentation URLs for schema elements.
///
/// Documentation-URL construction is the embedder's concern; the query
/// layer only links what the formatter returns.
pub trait DocUrlFormatter: Send + Sync {
    fn doc_url(&self, block_type: &str) -> Option<String>;
}

/// State scoped to one analysis unit.
pub struct PathContext {
    name: SmolStr,
    schema: RwLock<Option<Arc<BodySchema>>>,
    files: IndexMap<SmolStr, ParsedFile>,
    origins: ReferenceOrigins,
    targets: ReferenceTargets,
    functions: FunctionTable,
    doc_formatter: Option<Box<dyn DocUrlFormatter>>,
}

impl PathContext {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            schema: RwLock::new(None),
            files: IndexMap::new(),
            origins: ReferenceOrigins::new(),
            targets: ReferenceTargets::new(),
            functions: FunctionTable::default(),
            doc_formatter: None,
        }
    }

    /// The unit's name, used for path-qualified reference matching.
    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    /// Replace the schema. Blocks until in-flight readers finish.
    ///
    /// Collected origins/targets refer to the previous schema; re-run the
    /// collection passes after a swap.
    pub fn set_schema(&self, schema: Arc<BodySchema>) {
        let mut guard = self.schema.write();
        *guard = Some(schema);
        debug!(path = %self.name, "schema replaced");
    }

    /// The current schema, if one has been supplied.
    pub fn schema(&self) -> Option<Arc<BodySchema>> {
        self.schema.read().clone()
    }

    /// Add a parsed file. The format is detected from the file name.
    pub fn add_file(
        &mut self,
        name: impl Into<SmolStr>,
        src: impl Into<Arc<str>>,
        body: Body,
    ) -> Result<FileId, Error> {
        let name = name.into();
        let format = FileFormat::detect(&name).ok_or(Error::UnknownFileFormat(name.clone()))?;
        let id = FileId::new(self.files.len() as u32);
        self.files
            .insert(name.clone(), ParsedFile::new(name, format, src, body));
        Ok(id)
    }

    pub fn file(&self, id: FileId) -> Option<&ParsedFile> {
        self.files.get_index(id.raw() as usize).map(|(_, f)| f)
    }

    pub fn file_id(&self, name: &str) -> Option<FileId> {
        self.files
            .get_index_of(name)
            .map(|i| FileId::new(i as u32))
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &ParsedFile)> {
        self.files
            .values()
            .enumerate()
            .map(|(i, f)| (FileId::new(i as u32), f))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn add_function(&mut self, name: impl Into<SmolStr>, signature: FunctionSignature) {
        self.functions.insert(name.into(), signature);
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn set_doc_formatter(&mut self, formatter: Box<dyn DocUrlFormatter>) {
        self.doc_formatter = Some(formatter);
    }

    pub fn doc_url(&self, block_type: &str) -> Option<String> {
        self.doc_formatter
            .as_ref()
            .and_then(|f| f.doc_url(block_type))
    }

    /// Store collected origins (see `ide::references`).
    pub fn set_origins(&mut self, origins: ReferenceOrigins) {
        self.origins = origins;
    }

    pub fn origins(&self) -> &ReferenceOrigins {
        &self.origins
    }

    /// Store collected targets (see `ide::references`).
    pub fn set_targets(&mut self, targets: ReferenceTargets) {
        self.targets = targets;
    }

    pub fn targets(&self) -> &ReferenceTargets {
        &self.targets
    }
}
