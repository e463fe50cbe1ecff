//! Boolean and TF-IDF retrieval over a small plain-text news corpus, plus the usual
//! ranking-quality metrics.

pub mod boolean;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod model;
pub mod normalize;
pub mod persist;
pub mod stemmer;
pub mod stopwords;
pub mod vsm;

pub use boolean::{BooleanIndex, BooleanResult};
pub use corpus::{Corpus, Document};
pub use error::{CorpusError, Result};
pub use model::{build_retriever, ModelKind, Retrieval, Retriever};
pub use normalize::{normalize, Normalizer};
pub use vsm::{FittedModel, SearchHit, TfIdfConfig, TfIdfTable, VectorSpaceModel};

/// Documents are identified by their source file name.
pub type DocId = String;
