//! Preprocessing cache: one normalized text file per document plus a `meta.json`.
//!
//! The cache only saves re-normalizing documents. Indexes and matrices are never persisted;
//! they are rebuilt from documents on every load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;

use crate::corpus::{list_txt_files, Corpus};
use crate::error::{CorpusError, Result};
use crate::normalize::Normalizer;
use crate::DocId;

/// Bumped whenever the normalization pipeline changes what it writes.
pub const CACHE_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    /// Written by this cache format for a corpus of `num_docs` documents.
    pub fn describes(&self, num_docs: usize) -> bool {
        self.version == CACHE_VERSION && self.num_docs as usize == num_docs
    }
}

pub struct ProcessedPaths {
    pub root: PathBuf,
}

impl ProcessedPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn document(&self, id: &str) -> PathBuf { self.root.join(id) }

    /// True when the directory holds at least one normalized document.
    pub fn is_populated(&self) -> bool {
        list_txt_files(&self.root).is_ok()
    }
}

/// Normalize every document of `corpus` and write it under `paths.root` with the same name.
pub fn write_processed(paths: &ProcessedPaths, corpus: &Corpus, normalizer: &Normalizer) -> Result<MetaFile> {
    create_dir_all(&paths.root).map_err(|e| CorpusError::io(&paths.root, e))?;
    for doc in corpus.documents() {
        let file = paths.document(&doc.id);
        fs::write(&file, normalizer.normalize(&doc.raw_text)).map_err(|e| CorpusError::io(&file, e))?;
    }
    let meta = MetaFile {
        num_docs: corpus.len() as u32,
        created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        version: CACHE_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(num_docs = meta.num_docs, path = %paths.root.display(), "wrote preprocessing cache");
    Ok(meta)
}

/// `(id, normalized text)` for each cached document, in id order.
pub fn load_processed(paths: &ProcessedPaths) -> Result<Vec<(DocId, String)>> {
    let corpus = Corpus::load_dir(&paths.root)?;
    Ok(corpus.documents().iter().map(|d| (d.id.clone(), d.raw_text.clone())).collect())
}

/// Cached normalized text for `corpus`, or `None` when the cache is absent or stale.
///
/// Stale means the metadata names another format version or document count, or the cached
/// file names differ from the corpus ids. Callers then normalize the raw documents inline.
pub fn load_current(paths: &ProcessedPaths, corpus: &Corpus) -> Result<Option<Vec<(DocId, String)>>> {
    if !paths.is_populated() {
        tracing::info!(path = %paths.root.display(), "no preprocessing cache");
        return Ok(None);
    }
    if let Some(meta) = load_meta(paths)? {
        if !meta.describes(corpus.len()) {
            tracing::warn!(
                path = %paths.root.display(),
                cached_docs = meta.num_docs,
                cached_version = meta.version,
                num_docs = corpus.len(),
                "stale preprocessing cache, ignoring it"
            );
            return Ok(None);
        }
    }
    let docs = load_processed(paths)?;
    let cached: BTreeSet<&str> = docs.iter().map(|(id, _)| id.as_str()).collect();
    if cached != corpus.ids().collect::<BTreeSet<_>>() {
        tracing::warn!(path = %paths.root.display(), "preprocessing cache holds other documents, ignoring it");
        return Ok(None);
    }
    Ok(Some(docs))
}

pub fn save_meta(paths: &ProcessedPaths, meta: &MetaFile) -> Result<()> {
    let file = paths.meta();
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(&file, json).map_err(|e| CorpusError::io(&file, e))?;
    Ok(())
}

/// Cache metadata, or `None` when the cache was produced without one.
pub fn load_meta(paths: &ProcessedPaths) -> Result<Option<MetaFile>> {
    let file = paths.meta();
    if !file.is_file() {
        return Ok(None);
    }
    let buf = fs::read_to_string(&file).map_err(|e| CorpusError::io(&file, e))?;
    Ok(Some(serde_json::from_str(&buf)?))
}
