use warta_core::normalize::{normalize, Normalizer};

#[test]
fn it_cleans_stems_and_filters_stopwords() {
    let out = normalize("Penularan varian Delta di Jakarta meningkat, menurut https://berita.id/123!");
    let words: Vec<&str> = out.split(' ').collect();
    assert!(words.contains(&"tular"));
    assert!(words.contains(&"delta"));
    assert!(words.contains(&"jakarta"));
    // stopwords, URLs and digits are gone
    assert!(!words.contains(&"di"));
    assert!(!words.contains(&"menurut"));
    assert!(!out.contains("berita"));
    assert!(!out.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn it_folds_compatibility_forms() {
    // full-width letters fold to ASCII before lowercasing
    assert_eq!(normalize("ＶＡＫＳＩＮ"), "vaksin");
}

#[test]
fn it_is_idempotent_on_clean_roots() {
    for text in ["vaksin jakarta amerika", "ppkm delta", "tular kasus"] {
        let once = normalize(text);
        assert_eq!(normalize(&once), once);
    }
}

#[test]
fn it_reduces_noise_to_empty() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("yang, dan... di 2021"), "");
}

#[test]
fn it_keeps_boolean_operator_words() {
    let n = Normalizer::new();
    assert_eq!(n.normalize("vaksin AND NOT delta OR ppkm"), "vaksin and not delta or ppkm");
}

#[test]
fn it_maps_affixed_forms_to_one_root() {
    let n = Normalizer::new();
    assert_eq!(n.normalize("menurunkan"), n.normalize("penurunan"));
    assert_eq!(n.normalize("Menular"), "tular");
}
