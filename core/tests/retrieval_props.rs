//! Property tests for the set algebra of boolean queries, ranked search bounds and metrics.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};

use warta_core::eval::{average_precision, mean_average_precision, precision_at_k, precision_recall_f1};
use warta_core::vsm::RELEVANCE_FLOOR;
use warta_core::{normalize, BooleanIndex, Corpus, TfIdfConfig, VectorSpaceModel};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Words from a small fixed vocabulary of stems that survive normalization unchanged.
fn word_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["vaksin", "delta", "jakarta", "ppkm", "amerika", "kasus", "tular", "booster"])
}

fn document_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 1..8).prop_map(|words| words.join(" "))
}

fn corpus_strategy() -> impl Strategy<Value = Corpus> {
    prop::collection::vec(document_strategy(), 1..6).prop_map(|docs| {
        Corpus::from_documents(docs.into_iter().enumerate().map(|(i, d)| (format!("doc{i}.txt"), d)))
    })
}

fn as_set(ids: Vec<String>) -> BTreeSet<String> {
    ids.into_iter().collect()
}

// ============================================================================
// BOOLEAN PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_and_is_subset_of_each_operand(corpus in corpus_strategy(), x in word_strategy(), y in word_strategy()) {
        let index = BooleanIndex::build(&corpus, normalize::shared());
        let both = as_set(index.evaluate(&format!("{x} AND {y}")).doc_ids);
        let xs = as_set(index.evaluate(x).doc_ids);
        let ys = as_set(index.evaluate(y).doc_ids);
        prop_assert!(both.is_subset(&xs));
        prop_assert!(both.is_subset(&ys));
    }

    #[test]
    fn prop_or_is_superset(corpus in corpus_strategy(), x in word_strategy(), y in word_strategy()) {
        let index = BooleanIndex::build(&corpus, normalize::shared());
        let either = as_set(index.evaluate(&format!("{x} OR {y}")).doc_ids);
        let xs = as_set(index.evaluate(x).doc_ids);
        prop_assert!(either.is_superset(&xs));
    }

    #[test]
    fn prop_not_partitions_the_corpus(corpus in corpus_strategy(), x in word_strategy()) {
        let index = BooleanIndex::build(&corpus, normalize::shared());
        let with = as_set(index.evaluate(x).doc_ids);
        let without = as_set(index.evaluate(&format!("NOT {x}")).doc_ids);
        let all: BTreeSet<String> = corpus.ids().map(String::from).collect();
        prop_assert!(with.is_disjoint(&without));
        prop_assert_eq!(with.union(&without).cloned().collect::<BTreeSet<_>>(), all);
    }
}

// ============================================================================
// VECTOR SPACE PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_self_similarity_is_maximal(corpus in corpus_strategy(), pick in any::<prop::sample::Index>(), sublinear in any::<bool>()) {
        let config = if sublinear { TfIdfConfig::sublinear() } else { TfIdfConfig::linear() };
        let vsm = VectorSpaceModel::build(&corpus, normalize::shared(), config);
        let doc = &corpus.documents()[pick.index(corpus.len())];
        let hits = vsm.search(&doc.raw_text, corpus.len());
        let own = hits.iter().find(|h| h.doc_id == doc.id);
        prop_assert!(own.is_some(), "{} missing from its own results", doc.id);
        let best = hits.iter().map(|h| h.score).fold(f32::MIN, f32::max);
        prop_assert!((own.unwrap().score - best).abs() < 1e-5);
        prop_assert!((best - 1.0).abs() < 1e-5);
    }

    #[test]
    fn prop_search_respects_k_and_floor(corpus in corpus_strategy(), query in document_strategy(), k in 0usize..8) {
        let vsm = VectorSpaceModel::build(&corpus, normalize::shared(), TfIdfConfig::linear());
        let hits = vsm.search(&query, k);
        prop_assert!(hits.len() <= k);
        prop_assert!(hits.iter().all(|h| h.score > RELEVANCE_FLOOR));
        prop_assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

// ============================================================================
// METRIC PROPERTIES
// ============================================================================

fn id_set() -> impl Strategy<Value = HashSet<u8>> {
    prop::collection::hash_set(0u8..20, 0..10)
}

proptest! {
    #[test]
    fn prop_metrics_stay_in_unit_range(retrieved in prop::collection::vec(0u8..20, 0..10), relevant in id_set(), k in 1usize..10) {
        let retrieved_set: HashSet<u8> = retrieved.iter().copied().collect();
        let m = precision_recall_f1(&retrieved_set, &relevant);
        for v in [m.precision, m.recall, m.f1, precision_at_k(&retrieved, &relevant, k)] {
            prop_assert!((0.0..=1.0).contains(&v));
        }
        prop_assert!(average_precision(&retrieved, &relevant) >= 0.0);
    }

    #[test]
    fn prop_degenerate_inputs_score_zero(relevant in id_set(), k in 1usize..10) {
        prop_assert_eq!(precision_at_k(&[], &relevant, k), 0.0);
        prop_assert_eq!(average_precision(&[1u8, 2, 3], &HashSet::new()), 0.0);
        let gold: HashMap<String, HashSet<u8>> = [("q".to_string(), relevant)].into_iter().collect();
        prop_assert_eq!(mean_average_precision(&HashMap::new(), &gold, k), 0.0);
    }

    #[test]
    fn prop_identical_nonempty_sets_are_perfect(relevant in prop::collection::hash_set(0u8..20, 1..10)) {
        let m = precision_recall_f1(&relevant, &relevant);
        prop_assert_eq!((m.precision, m.recall, m.f1), (1.0, 1.0, 1.0));
    }
}
