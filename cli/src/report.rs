//! Evaluation driver and text rendering for the command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;
use warta_core::eval::{mean_average_precision, precision_at_k, precision_recall_f1};
use warta_core::{DocId, ModelKind, Retrieval, Retriever, TfIdfTable};

/// Relevance judgements per query, one section per model family.
#[derive(Debug, Default, Deserialize)]
pub struct GoldFile {
    #[serde(default)]
    pub boolean: BTreeMap<String, BTreeSet<DocId>>,
    #[serde(default)]
    pub vsm: BTreeMap<String, BTreeSet<DocId>>,
}

impl GoldFile {
    pub fn load(path: &Path) -> Result<Self> {
        let buf = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&buf).with_context(|| format!("parsing {}", path.display()))
    }
}

#[derive(Debug, Serialize)]
pub struct BooleanRow {
    pub query: String,
    pub retrieved: Vec<DocId>,
    pub relevant: Vec<DocId>,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub explain: String,
}

pub fn evaluate_boolean(model: &dyn Retriever, gold: &BTreeMap<String, BTreeSet<DocId>>) -> Vec<BooleanRow> {
    gold.iter()
        .map(|(query, relevant)| {
            let retrieval = model.retrieve(query, 0);
            let retrieved = retrieval.doc_ids();
            let retrieved_set: HashSet<DocId> = retrieved.iter().cloned().collect();
            let relevant_set: HashSet<DocId> = relevant.iter().cloned().collect();
            let m = precision_recall_f1(&retrieved_set, &relevant_set);
            BooleanRow {
                query: query.clone(),
                retrieved,
                relevant: relevant.iter().cloned().collect(),
                precision: m.precision,
                recall: m.recall,
                f1: m.f1,
                explain: retrieval.explain().unwrap_or_default().to_string(),
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct RankedRow {
    pub query: String,
    /// Precision@k per model, in the order the models were given.
    pub precision_at_k: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct SchemeScore {
    pub model: ModelKind,
    pub map: f64,
    pub runs: BTreeMap<String, Vec<DocId>>,
}

#[derive(Debug, Serialize)]
pub struct RankedComparison {
    pub p_k: usize,
    pub map_k: usize,
    pub rows: Vec<RankedRow>,
    pub schemes: Vec<SchemeScore>,
}

impl RankedComparison {
    /// Scheme with the highest MAP; on a tie the later scheme wins.
    pub fn best(&self) -> Option<ModelKind> {
        self.schemes
            .iter()
            .max_by(|a, b| a.map.partial_cmp(&b.map).unwrap_or(std::cmp::Ordering::Equal))
            .map(|s| s.model)
    }
}

/// Retrieve the top `map_k` for each gold query with every model, then score P@`p_k` per
/// query and MAP@`map_k` per model.
pub fn compare_ranked(
    models: &[&dyn Retriever],
    gold: &BTreeMap<String, BTreeSet<DocId>>,
    p_k: usize,
    map_k: usize,
) -> RankedComparison {
    let gold_sets: HashMap<String, HashSet<DocId>> =
        gold.iter().map(|(q, rel)| (q.clone(), rel.iter().cloned().collect())).collect();

    let runs: Vec<HashMap<String, Vec<DocId>>> = models
        .iter()
        .map(|m| gold.keys().map(|q| (q.clone(), m.retrieve(q, map_k).doc_ids())).collect())
        .collect();

    let rows = gold
        .keys()
        .map(|q| RankedRow {
            query: q.clone(),
            precision_at_k: runs.iter().map(|run| precision_at_k(&run[q], &gold_sets[q], p_k)).collect(),
        })
        .collect();

    let schemes = models
        .iter()
        .zip(&runs)
        .map(|(m, run)| SchemeScore {
            model: m.kind(),
            map: mean_average_precision(run, &gold_sets, map_k),
            runs: run.iter().map(|(q, ids)| (q.clone(), ids.clone())).collect(),
        })
        .collect();

    RankedComparison { p_k, map_k, rows, schemes }
}

pub fn render_retrieval(query: &str, kind: ModelKind, k: usize, retrieval: &Retrieval) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- {kind} model ---");
    let _ = writeln!(out, "Query: {query}");
    match retrieval {
        Retrieval::Matched(result) => {
            let _ = writeln!(out, "\nExplanation:\n{}", result.explain);
            let _ = writeln!(out, "\nFound {} documents", result.len());
            for id in &result.doc_ids {
                let _ = writeln!(out, "  {id}");
            }
        }
        Retrieval::Ranked(hits) => {
            let _ = writeln!(out, "\nTop-{k} results (score > 0.01):");
            if hits.is_empty() {
                let _ = writeln!(out, "No relevant documents found.");
            }
            for hit in hits {
                let _ = writeln!(out, "\n[{}] cosine {:.4}", hit.doc_id, hit.score);
                let _ = writeln!(out, "    {}", hit.snippet);
            }
        }
    }
    out
}

pub fn render_boolean_eval(rows: &[BooleanRow]) -> String {
    let mut out = String::from("Boolean evaluation (precision / recall / F1)\n");
    for row in rows {
        let retrieved = if row.retrieved.is_empty() { "none".to_string() } else { row.retrieved.join(", ") };
        let _ = writeln!(out, "\n{}", row.query);
        let _ = writeln!(out, "  retrieved: {retrieved}");
        let _ = writeln!(out, "  relevant:  {}", row.relevant.join(", "));
        let _ = writeln!(out, "  P={:.4} R={:.4} F1={:.4}", row.precision, row.recall, row.f1);
        let _ = writeln!(out, "  explain:   {}", row.explain);
    }
    out
}

pub fn render_ranked_eval(cmp: &RankedComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ranked evaluation: MAP@{}", cmp.map_k);
    for s in &cmp.schemes {
        let _ = writeln!(out, "  {:<14} {:.4}", s.model.as_str(), s.map);
    }
    let _ = write!(out, "\nP@{} per query:\n  {:<24}", cmp.p_k, "query");
    for s in &cmp.schemes {
        let _ = write!(out, " {:>14}", s.model.as_str());
    }
    out.push('\n');
    for row in &cmp.rows {
        let _ = write!(out, "  {:<24}", row.query);
        for p in &row.precision_at_k {
            let _ = write!(out, " {p:>14.4}");
        }
        out.push('\n');
    }
    if let Some(best) = cmp.best() {
        let _ = writeln!(out, "\nBest scheme by MAP@{}: {best}", cmp.map_k);
    }
    out
}

pub fn render_matrix(table: &TfIdfTable) -> String {
    let mut out = String::from("doc_id");
    for term in &table.terms {
        let _ = write!(out, "\t{term}");
    }
    out.push('\n');
    for (id, row) in table.doc_ids.iter().zip(&table.rows) {
        out.push_str(id);
        for w in row {
            let _ = write!(out, "\t{w:.4}");
        }
        out.push('\n');
    }
    out
}
