use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::boolean::{BooleanIndex, BooleanResult};
use crate::corpus::Corpus;
use crate::normalize::Normalizer;
use crate::vsm::{SearchHit, TfIdfConfig, VectorSpaceModel};
use crate::DocId;

/// The retrieval model families a caller can pick by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    Boolean,
    Vsm,
    VsmSublinear,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Boolean, ModelKind::Vsm, ModelKind::VsmSublinear];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Boolean => "boolean",
            ModelKind::Vsm => "vsm",
            ModelKind::VsmSublinear => "vsm-sublinear",
        }
    }

    pub fn is_ranked(self) -> bool {
        !matches!(self, ModelKind::Boolean)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown model '{s}' (expected boolean, vsm or vsm-sublinear)"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum Retrieval {
    Ranked(Vec<SearchHit>),
    Matched(BooleanResult),
}

impl Retrieval {
    pub fn doc_ids(&self) -> Vec<DocId> {
        match self {
            Retrieval::Ranked(hits) => hits.iter().map(|h| h.doc_id.clone()).collect(),
            Retrieval::Matched(r) => r.doc_ids.clone(),
        }
    }

    pub fn explain(&self) -> Option<&str> {
        match self {
            Retrieval::Ranked(_) => None,
            Retrieval::Matched(r) => Some(&r.explain),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Retrieval::Ranked(hits) => hits.len(),
            Retrieval::Matched(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Common query surface over every model family. Ranked models honour `k`; boolean ignores it.
pub trait Retriever: Send + Sync {
    fn kind(&self) -> ModelKind;
    fn retrieve(&self, query: &str, k: usize) -> Retrieval;
}

impl Retriever for BooleanIndex {
    fn kind(&self) -> ModelKind {
        ModelKind::Boolean
    }

    fn retrieve(&self, query: &str, _k: usize) -> Retrieval {
        Retrieval::Matched(self.evaluate(query))
    }
}

impl Retriever for VectorSpaceModel {
    fn kind(&self) -> ModelKind {
        if self.config().sublinear_tf {
            ModelKind::VsmSublinear
        } else {
            ModelKind::Vsm
        }
    }

    fn retrieve(&self, query: &str, k: usize) -> Retrieval {
        Retrieval::Ranked(self.search(query, k))
    }
}

pub fn build_retriever(kind: ModelKind, corpus: &Corpus, normalizer: Arc<Normalizer>) -> Box<dyn Retriever> {
    match kind {
        ModelKind::Boolean => Box::new(BooleanIndex::build(corpus, normalizer)),
        ModelKind::Vsm => Box::new(VectorSpaceModel::build(corpus, normalizer, TfIdfConfig::linear())),
        ModelKind::VsmSublinear => {
            Box::new(VectorSpaceModel::build(corpus, normalizer, TfIdfConfig::sublinear()))
        }
    }
}
