use kira_dxeval::taxonomy::{Urgency, load_builtin, parse_taxonomy_tsv};

#[test]
fn builtin_has_fifteen_contiguous_conditions() {
    let tax = load_builtin().unwrap();
    assert_eq!(tax.len(), 15);
    for (i, c) in tax.conditions().iter().enumerate() {
        assert_eq!(c.index, i);
        assert!(!c.recommendation.is_empty());
    }
    assert_eq!(tax.name(0), "No Finding");
    assert_eq!(tax.name(13), "Pneumonia");
}

#[test]
fn builtin_urgency_table() {
    let tax = load_builtin().unwrap();
    assert_eq!(tax.urgency(5), Some(Urgency::High));
    assert_eq!(tax.urgency(2), Some(Urgency::Moderate));
    assert_eq!(tax.urgency(6), Some(Urgency::Moderate));
    assert_eq!(tax.urgency(0), Some(Urgency::Low));
    assert_eq!(tax.urgency(13), Some(Urgency::Standard));
    assert_eq!(tax.urgency(15), None);
}

#[test]
fn labels_resolve_by_index_or_name() {
    let tax = load_builtin().unwrap();
    assert_eq!(tax.resolve_label("13"), Some(13));
    assert_eq!(tax.resolve_label("pleural_thickening"), Some(8));
    assert_eq!(tax.resolve_label("No Finding"), Some(0));
    assert_eq!(tax.resolve_label("15"), None);
    assert_eq!(tax.resolve_label("Flu"), None);
}

#[test]
fn urgency_orders_high_last() {
    assert!(Urgency::High > Urgency::Moderate);
    assert!(Urgency::Moderate > Urgency::Standard);
    assert!(Urgency::Standard > Urgency::Low);
}

#[test]
fn rows_may_be_unordered() {
    let tsv = "1\tB\thigh\trec b\n0\tA\tlow\trec a\n";
    let tax = parse_taxonomy_tsv(tsv, "test", "t").unwrap();
    assert_eq!(tax.name(0), "A");
    assert_eq!(tax.urgency(1), Some(Urgency::High));
}

#[test]
fn gaps_and_duplicates_are_rejected() {
    let gap = "0\tA\tlow\trec\n2\tC\tlow\trec\n";
    let err = parse_taxonomy_tsv(gap, "gap.tsv", "t").unwrap_err();
    assert!(err.to_string().contains("contiguous"));

    let dup = "0\tA\tlow\trec\n0\tB\tlow\trec\n";
    assert!(parse_taxonomy_tsv(dup, "dup.tsv", "t").is_err());

    let bad_urgency = "0\tA\turgent\trec\n";
    let err = parse_taxonomy_tsv(bad_urgency, "u.tsv", "t").unwrap_err();
    assert!(err.to_string().contains("u.tsv:1"));

    let columns = "0\tA\tlow\n";
    assert!(parse_taxonomy_tsv(columns, "c.tsv", "t").is_err());
}
