use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CorpusError {
    #[error("document directory '{}' not found", .path.display())]
    MissingCorpus { path: PathBuf },

    #[error("no .txt documents in '{}'", .path.display())]
    EmptyCorpus { path: PathBuf },

    #[error("failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error("malformed cache metadata: {0}")]
    Meta(#[from] serde_json::Error),
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// True when the corpus itself is absent, as opposed to a failure while reading it.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, Self::MissingCorpus { .. } | Self::EmptyCorpus { .. })
    }
}

pub type Result<T> = core::result::Result<T, CorpusError>;
