use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{CorpusError, Result};
use crate::DocId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: DocId,
    pub raw_text: String,
}

/// Ordered, id-unique document collection. Order fixes the row order of the TF-IDF matrix.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Build from in-memory `(id, text)` pairs, keeping insertion order.
    pub fn from_documents<I, K, V>(docs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<DocId>,
        V: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut documents = Vec::new();
        for (id, text) in docs {
            let id = id.into();
            if !seen.insert(id.clone()) {
                tracing::warn!(doc_id = %id, "duplicate document id ignored");
                continue;
            }
            documents.push(Document { id, raw_text: text.into() });
        }
        Self { documents }
    }

    /// Load every `*.txt` file directly inside `dir`, sorted by file name.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let files = list_txt_files(dir)?;
        let mut documents = Vec::with_capacity(files.len());
        for (id, path) in files {
            let raw_text = fs::read_to_string(&path).map_err(|e| CorpusError::io(&path, e))?;
            documents.push(Document { id, raw_text });
        }
        tracing::info!(num_docs = documents.len(), path = %dir.display(), "loaded corpus");
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// `(file name, path)` of each `.txt` file in `dir`, non-recursive, sorted by name.
pub(crate) fn list_txt_files(dir: &Path) -> Result<Vec<(DocId, PathBuf)>> {
    if !dir.is_dir() {
        return Err(CorpusError::MissingCorpus { path: dir.to_path_buf() });
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let p = entry.path();
        if !entry.file_type().is_file() || p.extension().and_then(|s| s.to_str()) != Some("txt") {
            continue;
        }
        if let Some(name) = p.file_name().and_then(|s| s.to_str()) {
            files.push((name.to_string(), p.to_path_buf()));
        }
    }
    if files.is_empty() {
        return Err(CorpusError::EmptyCorpus { path: dir.to_path_buf() });
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_first_duplicate() {
        let corpus = Corpus::from_documents([("b.txt", "satu"), ("a.txt", "dua"), ("b.txt", "tiga")]);
        assert_eq!(corpus.ids().collect::<Vec<_>>(), vec!["b.txt", "a.txt"]);
        assert_eq!(corpus.get("b.txt").unwrap().raw_text, "satu");
    }

    #[test]
    fn load_dir_sorts_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("berita2.txt"), "kedua").unwrap();
        fs::write(dir.path().join("berita1.txt"), "pertama").unwrap();
        fs::write(dir.path().join("notes.md"), "bukan dokumen").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("berita3.txt"), "bersarang").unwrap();

        let corpus = Corpus::load_dir(dir.path()).unwrap();
        assert_eq!(corpus.ids().collect::<Vec<_>>(), vec!["berita1.txt", "berita2.txt"]);
    }

    #[test]
    fn missing_and_empty_dirs_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Corpus::load_dir(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, CorpusError::MissingCorpus { .. }));
        let err = Corpus::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CorpusError::EmptyCorpus { .. }));
        assert!(err.is_missing_data());
    }
}
