use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::corpus::Corpus;
use crate::normalize::Normalizer;
use crate::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    Or,
}

impl Op {
    fn as_str(self) -> &'static str {
        match self {
            Op::And => "AND",
            Op::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryToken {
    Op(Op),
    Not,
    Term(String),
}

/// Matching documents (sorted by id) and a trace of how the running set evolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanResult {
    pub doc_ids: Vec<DocId>,
    pub explain: String,
}

impl BooleanResult {
    fn empty(explain: impl Into<String>) -> Self {
        Self { doc_ids: Vec::new(), explain: explain.into() }
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }
}

/// Inverted index answering AND/OR/NOT queries evaluated strictly left to right.
pub struct BooleanIndex {
    normalizer: Arc<Normalizer>,
    postings: HashMap<String, BTreeSet<DocId>>,
    all_docs: BTreeSet<DocId>,
    bodies: BTreeMap<DocId, String>,
}

impl BooleanIndex {
    /// Normalize each raw document inline and index it.
    pub fn build(corpus: &Corpus, normalizer: Arc<Normalizer>) -> Self {
        let normalized: Vec<(DocId, String)> = corpus
            .documents()
            .iter()
            .map(|d| (d.id.clone(), normalizer.normalize(&d.raw_text)))
            .collect();
        Self::from_normalized(normalized, normalizer)
    }

    /// Index documents whose text is already normalized (e.g. read from the preprocessing cache).
    pub fn from_normalized<I>(docs: I, normalizer: Arc<Normalizer>) -> Self
    where
        I: IntoIterator<Item = (DocId, String)>,
    {
        let mut postings: HashMap<String, BTreeSet<DocId>> = HashMap::new();
        let mut all_docs = BTreeSet::new();
        let mut bodies = BTreeMap::new();
        for (doc_id, text) in docs {
            for term in text.split_whitespace() {
                postings.entry(term.to_string()).or_default().insert(doc_id.clone());
            }
            all_docs.insert(doc_id.clone());
            bodies.insert(doc_id, text);
        }
        tracing::info!(num_docs = all_docs.len(), num_terms = postings.len(), "built boolean index");
        Self { normalizer, postings, all_docs, bodies }
    }

    pub fn num_docs(&self) -> usize {
        self.all_docs.len()
    }

    /// Posting set of a normalized term, `None` if it occurs in no document.
    pub fn postings(&self, term: &str) -> Option<&BTreeSet<DocId>> {
        self.postings.get(term)
    }

    pub fn normalized_text(&self, doc_id: &str) -> Option<&str> {
        self.bodies.get(doc_id).map(String::as_str)
    }

    fn resolve(&self, term: &str, negated: bool) -> BTreeSet<DocId> {
        let hits = self.postings.get(term);
        if negated {
            match hits {
                Some(h) => self.all_docs.difference(h).cloned().collect(),
                None => self.all_docs.clone(),
            }
        } else {
            hits.cloned().unwrap_or_default()
        }
    }

    /// Normalize the whole query, then read `and`/`or`/`not` as operators. The stopword list
    /// leaves them in and the stemmer never shortens them.
    fn lex(&self, query: &str) -> Vec<QueryToken> {
        self.normalizer
            .tokens(query)
            .into_iter()
            .map(|t| match t.as_str() {
                "and" => QueryToken::Op(Op::And),
                "or" => QueryToken::Op(Op::Or),
                "not" => QueryToken::Not,
                _ => QueryToken::Term(t),
            })
            .collect()
    }

    /// Evaluate `[NOT] term ((AND|OR) [NOT] term)*` with no precedence. A missing connective
    /// between two operands means AND. A `NOT` directly after `NOT` is an ordinary term.
    /// Malformed queries give an empty result and a diagnostic.
    pub fn evaluate(&self, query: &str) -> BooleanResult {
        let tokens = self.lex(query);
        if tokens.is_empty() {
            return BooleanResult::empty("empty query");
        }

        let (mut result, mut explain, mut i) = match &tokens[0] {
            QueryToken::Term(t) => {
                let set = self.resolve(t, false);
                let explain = format!("{t} ({} docs)", set.len());
                (set, explain, 1)
            }
            QueryToken::Not => {
                let t = match tokens.get(1) {
                    Some(QueryToken::Term(t)) => t.as_str(),
                    Some(QueryToken::Not) => "not",
                    _ => return BooleanResult::empty("invalid query (NOT without operand)"),
                };
                let set = self.resolve(t, true);
                let explain = format!("NOT {t} ({} docs)", set.len());
                (set, explain, 2)
            }
            QueryToken::Op(op) => {
                return BooleanResult::empty(format!("invalid query (leading {})", op.as_str()))
            }
        };

        while i < tokens.len() {
            let mut op = Op::And;
            if let QueryToken::Op(explicit) = &tokens[i] {
                op = *explicit;
                i += 1;
                if i >= tokens.len() {
                    return BooleanResult::empty("invalid query (operator at end)");
                }
            }

            let mut negated = false;
            if tokens[i] == QueryToken::Not {
                negated = true;
                i += 1;
                if i >= tokens.len() {
                    return BooleanResult::empty("invalid query (NOT at end)");
                }
            }

            let term = match &tokens[i] {
                QueryToken::Term(t) => t.as_str(),
                QueryToken::Not => "not",
                QueryToken::Op(next) => {
                    return BooleanResult::empty(format!(
                        "invalid query ({} followed by {})",
                        op.as_str(),
                        next.as_str()
                    ))
                }
            };

            let operand = self.resolve(term, negated);
            result = match op {
                Op::And => result.intersection(&operand).cloned().collect(),
                Op::Or => result.union(&operand).cloned().collect(),
            };
            if negated {
                explain.push_str(&format!(" {} (NOT {term})", op.as_str()));
            } else {
                explain.push_str(&format!(" {} {term}", op.as_str()));
            }
            explain.push_str(&format!(" -> {} docs", result.len()));
            i += 1;
        }

        tracing::debug!(query, hits = result.len(), "evaluated boolean query");
        BooleanResult { doc_ids: result.into_iter().collect(), explain }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> BooleanIndex {
        let corpus = Corpus::from_documents([
            ("doc1", "vaksin delta jakarta"),
            ("doc2", "ppkm jakarta"),
            ("doc3", "vaksin amerika"),
        ]);
        BooleanIndex::build(&corpus, crate::normalize::shared())
    }

    fn ids(r: &BooleanResult) -> Vec<&str> {
        r.doc_ids.iter().map(String::as_str).collect()
    }

    #[test]
    fn postings_hold_each_document_once() {
        let idx = index();
        assert_eq!(idx.num_docs(), 3);
        assert_eq!(idx.postings("jakarta").unwrap().len(), 2);
        assert!(idx.postings("tokyo").is_none());
        assert_eq!(idx.normalized_text("doc2"), Some("ppkm jakarta"));
    }

    #[test]
    fn and_or_not() {
        let idx = index();
        assert_eq!(ids(&idx.evaluate("vaksin AND jakarta")), vec!["doc1"]);
        assert_eq!(ids(&idx.evaluate("vaksin OR ppkm")), vec!["doc1", "doc2", "doc3"]);
        assert_eq!(ids(&idx.evaluate("NOT vaksin")), vec!["doc2"]);
        assert_eq!(ids(&idx.evaluate("jakarta AND NOT delta")), vec!["doc2"]);
    }

    #[test]
    fn folds_strictly_left_to_right() {
        let idx = index();
        // (ppkm OR vaksin) AND amerika, not ppkm OR (vaksin AND amerika)
        assert_eq!(ids(&idx.evaluate("ppkm OR vaksin AND amerika")), vec!["doc3"]);
    }

    #[test]
    fn missing_connective_defaults_to_and() {
        let idx = index();
        assert_eq!(ids(&idx.evaluate("vaksin jakarta")), vec!["doc1"]);
        assert_eq!(ids(&idx.evaluate("jakarta NOT ppkm")), vec!["doc1"]);
    }

    #[test]
    fn operators_are_case_insensitive() {
        let idx = index();
        assert_eq!(ids(&idx.evaluate("vaksin and jakarta")), vec!["doc1"]);
        assert_eq!(ids(&idx.evaluate("Vaksin Or PPKM")), vec!["doc1", "doc2", "doc3"]);
    }

    #[test]
    fn unknown_terms_match_nothing() {
        let idx = index();
        assert!(idx.evaluate("tokyo").is_empty());
        assert_eq!(ids(&idx.evaluate("NOT tokyo")), vec!["doc1", "doc2", "doc3"]);
    }

    #[test]
    fn malformed_queries_degrade_to_empty() {
        let idx = index();
        for (q, why) in [
            ("", "empty query"),
            ("yang dan", "empty query"),
            ("vaksin AND", "invalid query (operator at end)"),
            ("vaksin OR NOT", "invalid query (NOT at end)"),
            ("NOT", "invalid query (NOT without operand)"),
            ("AND vaksin", "invalid query (leading AND)"),
            ("vaksin AND OR ppkm", "invalid query (AND followed by OR)"),
        ] {
            let r = idx.evaluate(q);
            assert!(r.is_empty(), "{q}");
            assert_eq!(r.explain, why, "{q}");
        }
    }

    #[test]
    fn second_not_is_read_as_a_term() {
        let idx = index();
        // NOT not matches every document, so the rest of the query decides
        let r = idx.evaluate("NOT NOT vaksin");
        assert_eq!(ids(&r), vec!["doc1", "doc3"]);
        assert_eq!(r.explain, "NOT not (3 docs) AND vaksin -> 2 docs");
        assert_eq!(ids(&idx.evaluate("jakarta AND NOT NOT vaksin")), vec!["doc1"]);
        assert_eq!(idx.evaluate("NOT NOT").len(), 3);
    }

    #[test]
    fn trace_records_running_set_sizes() {
        let idx = index();
        let r = idx.evaluate("vaksin AND jakarta OR NOT delta");
        assert_eq!(r.explain, "vaksin (2 docs) AND jakarta -> 1 docs OR (NOT delta) -> 3 docs");
    }
}
