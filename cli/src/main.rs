use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};
use warta_core::persist::{load_current, write_processed, ProcessedPaths};
use warta_core::{
    build_retriever, normalize, BooleanIndex, Corpus, ModelKind, Normalizer, Retrieval, Retriever, TfIdfConfig,
    VectorSpaceModel,
};

mod report;

#[derive(Parser)]
#[command(name = "warta")]
#[command(about = "Boolean and TF-IDF retrieval over a news corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw documents into the preprocessing cache
    Preprocess {
        /// Directory of raw .txt documents
        #[arg(long, default_value = "data/raw")]
        raw: PathBuf,
        /// Output directory for normalized documents
        #[arg(long, default_value = "data/processed")]
        processed: PathBuf,
    },
    /// Run one query against a retrieval model
    Search {
        /// boolean, vsm or vsm-sublinear
        #[arg(long)]
        model: ModelKind,
        #[arg(long)]
        query: String,
        /// Number of ranked results (ignored by the boolean model)
        #[arg(long, default_value_t = 3)]
        k: usize,
        #[arg(long, default_value = "data/raw")]
        raw: PathBuf,
        /// Preprocessing cache used by the boolean model when present
        #[arg(long, default_value = "data/processed")]
        processed: PathBuf,
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the TF-IDF document-term matrix
    Matrix {
        #[arg(long, default_value = "data/raw")]
        raw: PathBuf,
        /// Use 1 + ln(tf) term frequencies
        #[arg(long, default_value_t = false)]
        sublinear: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Score the models against a gold standard
    Evaluate {
        /// JSON file with "boolean" and "vsm" sections mapping query -> relevant ids
        #[arg(long, default_value = "data/gold.json")]
        gold: PathBuf,
        #[arg(long, default_value = "data/raw")]
        raw: PathBuf,
        #[arg(long, default_value = "data/processed")]
        processed: PathBuf,
        /// Cutoff for per-query precision
        #[arg(long, default_value_t = 3)]
        p_k: usize,
        /// Cutoff for mean average precision (also the retrieval depth)
        #[arg(long, default_value_t = 5)]
        map_k: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    query: &'a str,
    model: ModelKind,
    took_s: f64,
    total_hits: usize,
    retrieval: &'a Retrieval,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Preprocess { raw, processed } => preprocess(&raw, &processed),
        Commands::Search { model, query, k, raw, processed, json } => search(model, &query, k, &raw, &processed, json),
        Commands::Matrix { raw, sublinear, json } => matrix(&raw, sublinear, json),
        Commands::Evaluate { gold, raw, processed, p_k, map_k, json } => {
            evaluate(&gold, &raw, &processed, p_k, map_k, json)
        }
    }
}

/// Load the raw corpus, or print a diagnostic and return `None` when it is missing.
fn load_corpus(raw: &Path) -> Result<Option<Corpus>> {
    match Corpus::load_dir(raw) {
        Ok(corpus) => Ok(Some(corpus)),
        Err(e) if e.is_missing_data() => {
            println!("Error: {e}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Boolean index from the preprocessing cache when it still describes `corpus`, otherwise
/// from the raw documents normalized inline.
fn boolean_index(corpus: &Corpus, processed: &Path, normalizer: Arc<Normalizer>) -> Result<BooleanIndex> {
    Ok(match load_current(&ProcessedPaths::new(processed), corpus)? {
        Some(docs) => BooleanIndex::from_normalized(docs, normalizer),
        None => BooleanIndex::build(corpus, normalizer),
    })
}

fn preprocess(raw: &Path, processed: &Path) -> Result<()> {
    let Some(corpus) = load_corpus(raw)? else { return Ok(()) };
    let meta = write_processed(&ProcessedPaths::new(processed), &corpus, &Normalizer::new())?;
    println!("Normalized {} documents into {}", meta.num_docs, processed.display());
    Ok(())
}

fn search(
    kind: ModelKind,
    query: &str,
    k: usize,
    raw: &Path,
    processed: &Path,
    json: bool,
) -> Result<()> {
    let Some(corpus) = load_corpus(raw)? else { return Ok(()) };
    let normalizer = normalize::shared();
    let model: Box<dyn Retriever> = match kind {
        ModelKind::Boolean => Box::new(boolean_index(&corpus, processed, normalizer)?),
        _ => build_retriever(kind, &corpus, normalizer),
    };

    let start = Instant::now();
    let retrieval = model.retrieve(query, k);
    let elapsed = start.elapsed();

    if json {
        let resp = SearchResponse {
            query,
            model: kind,
            took_s: elapsed.as_secs_f64(),
            total_hits: retrieval.len(),
            retrieval: &retrieval,
        };
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else {
        print!("{}", report::render_retrieval(query, kind, k, &retrieval));
    }
    Ok(())
}

fn matrix(raw: &Path, sublinear: bool, json: bool) -> Result<()> {
    let Some(corpus) = load_corpus(raw)? else { return Ok(()) };
    let config = TfIdfConfig { sublinear_tf: sublinear };
    let vsm = VectorSpaceModel::build(&corpus, normalize::shared(), config);
    let table = vsm.tfidf_table();
    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        print!("{}", report::render_matrix(&table));
    }
    Ok(())
}

fn evaluate(
    gold: &Path,
    raw: &Path,
    processed: &Path,
    p_k: usize,
    map_k: usize,
    json: bool,
) -> Result<()> {
    if !gold.is_file() {
        println!("Error: gold standard '{}' not found", gold.display());
        return Ok(());
    }
    let gold = report::GoldFile::load(gold)?;
    let Some(corpus) = load_corpus(raw)? else { return Ok(()) };
    let normalizer = normalize::shared();
    let boolean = boolean_index(&corpus, processed, normalizer.clone())?;

    let linear = build_retriever(ModelKind::Vsm, &corpus, normalizer.clone());
    let sublinear = build_retriever(ModelKind::VsmSublinear, &corpus, normalizer);

    let boolean_rows = report::evaluate_boolean(&boolean, &gold.boolean);
    let ranked = report::compare_ranked(&[linear.as_ref(), sublinear.as_ref()], &gold.vsm, p_k, map_k);
    tracing::info!(boolean_queries = boolean_rows.len(), ranked_queries = ranked.rows.len(), "evaluation done");

    if json {
        let out = serde_json::json!({ "boolean": boolean_rows, "ranked": ranked });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", report::render_boolean_eval(&boolean_rows));
        println!();
        print!("{}", report::render_ranked_eval(&ranked));
    }
    Ok(())
}
