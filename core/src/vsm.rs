use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::corpus::Corpus;
use crate::normalize::Normalizer;
use crate::DocId;

/// Results scoring at or below this are dropped from a ranked list.
pub const RELEVANCE_FLOOR: f32 = 0.01;
pub const SNIPPET_CHARS: usize = 120;

/// Term-frequency scaling, fixed for the lifetime of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfIdfConfig {
    /// Use `1 + ln(count)` instead of the raw count.
    pub sublinear_tf: bool,
}

impl TfIdfConfig {
    pub fn linear() -> Self {
        Self { sublinear_tf: false }
    }

    pub fn sublinear() -> Self {
        Self { sublinear_tf: true }
    }
}

/// Vocabulary and IDF weights learned once from a tokenized corpus.
///
/// Columns are the vocabulary terms in lexicographic order. IDF is smoothed:
/// `ln((1 + N) / (1 + df)) + 1`. Vectors produced by [`FittedModel::transform`] are
/// L2-normalized.
#[derive(Debug, Clone, Serialize)]
pub struct FittedModel {
    config: TfIdfConfig,
    terms: Vec<String>,
    #[serde(skip)]
    columns: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl FittedModel {
    pub fn fit(documents: &[Vec<String>], config: TfIdfConfig) -> Self {
        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for tokens in documents {
            let distinct: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in distinct {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        let n = documents.len() as f64;
        let mut terms = Vec::with_capacity(df.len());
        let mut idf = Vec::with_capacity(df.len());
        for (term, df_t) in df {
            terms.push(term.to_string());
            idf.push((((1.0 + n) / (1.0 + df_t as f64)).ln() + 1.0) as f32);
        }
        let columns = terms.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();
        Self { config, terms, columns, idf }
    }

    pub fn config(&self) -> TfIdfConfig {
        self.config
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.columns.get(term).map(|&c| self.idf[c])
    }

    /// Project tokens into the fitted space. Terms outside the vocabulary are ignored.
    pub fn transform(&self, tokens: &[String]) -> Vec<f32> {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for t in tokens {
            if let Some(&col) = self.columns.get(t) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        let mut v = vec![0.0f32; self.terms.len()];
        for (col, tf_raw) in counts {
            let tf = if self.config.sublinear_tf { 1.0 + (tf_raw as f32).ln() } else { tf_raw as f32 };
            v[col] = tf * self.idf[col];
        }
        let norm = v.iter().map(|w| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for w in v.iter_mut() {
                *w /= norm;
            }
        }
        v
    }
}

/// Cosine of the angle between two vectors; 0 when either is all zeros.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

/// Raw text with newlines flattened, trimmed and cut to [`SNIPPET_CHARS`] characters.
pub fn snippet(raw: &str) -> String {
    let flat = raw.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() > SNIPPET_CHARS {
        let mut s: String = flat.chars().take(SNIPPET_CHARS).collect();
        s.push_str("...");
        s
    } else {
        flat.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    pub snippet: String,
}

/// Dense document-term weights labelled with document ids and vocabulary terms.
#[derive(Debug, Clone, Serialize)]
pub struct TfIdfTable {
    pub doc_ids: Vec<DocId>,
    pub terms: Vec<String>,
    pub rows: Vec<Vec<f32>>,
}

impl TfIdfTable {
    pub fn get(&self, doc_id: &str, term: &str) -> Option<f32> {
        let row = self.doc_ids.iter().position(|d| d == doc_id)?;
        let col = self.terms.iter().position(|t| t == term)?;
        Some(self.rows[row][col])
    }
}

/// Ranked retrieval by cosine similarity over a TF-IDF matrix. Row `i` is corpus document `i`.
pub struct VectorSpaceModel {
    normalizer: Arc<Normalizer>,
    doc_ids: Vec<DocId>,
    raw: Vec<String>,
    fitted: FittedModel,
    matrix: Vec<Vec<f32>>,
}

impl VectorSpaceModel {
    pub fn build(corpus: &Corpus, normalizer: Arc<Normalizer>, config: TfIdfConfig) -> Self {
        let docs = corpus.documents();
        let tokenized: Vec<Vec<String>> = docs.iter().map(|d| normalizer.tokens(&d.raw_text)).collect();
        let fitted = FittedModel::fit(&tokenized, config);
        let matrix: Vec<Vec<f32>> = tokenized.iter().map(|t| fitted.transform(t)).collect();
        tracing::info!(
            num_docs = docs.len(),
            num_terms = fitted.terms().len(),
            sublinear_tf = config.sublinear_tf,
            "built tf-idf matrix"
        );
        Self {
            normalizer,
            doc_ids: docs.iter().map(|d| d.id.clone()).collect(),
            raw: docs.iter().map(|d| d.raw_text.clone()).collect(),
            fitted,
            matrix,
        }
    }

    pub fn fitted(&self) -> &FittedModel {
        &self.fitted
    }

    pub fn config(&self) -> TfIdfConfig {
        self.fitted.config()
    }

    /// Cosine similarity of the query against every document, in corpus order.
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let q = self.fitted.transform(&self.normalizer.tokens(query));
        self.matrix.iter().map(|row| cosine(&q, row)).collect()
    }

    /// Top `k` documents by similarity, then drops those at or below [`RELEVANCE_FLOOR`], so
    /// fewer than `k` hits may come back. Ties keep corpus order.
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchHit> {
        if k == 0 || self.doc_ids.is_empty() {
            return Vec::new();
        }
        let scores = self.scores(query);
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

        let hits: Vec<SearchHit> = order
            .into_iter()
            .take(k)
            .filter(|&i| scores[i] > RELEVANCE_FLOOR)
            .map(|i| SearchHit {
                doc_id: self.doc_ids[i].clone(),
                score: scores[i],
                snippet: snippet(&self.raw[i]),
            })
            .collect();
        tracing::debug!(query, k, hits = hits.len(), "ranked query");
        hits
    }

    pub fn tfidf_table(&self) -> TfIdfTable {
        TfIdfTable {
            doc_ids: self.doc_ids.clone(),
            terms: self.fitted.terms().to_vec(),
            rows: self.matrix.clone(),
        }
    }
}
