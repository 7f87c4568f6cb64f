use split_check::{
    actual::ActualDoc,
    ground_truth::{ExpectedDoc, ExpectedResultSet, PageEntry},
    scoring::{validate_doc, validate_split},
};

fn doc(doc_type: &str, code: Option<&str>, pages: &[i64]) -> ExpectedDoc {
    ExpectedDoc {
        doc_type: doc_type.into(),
        primary_num: None,
        pages: pages
            .iter()
            .map(|&n| PageEntry {
                page_num: n,
                rotate: 0,
            })
            .collect(),
        filing_doc_type_code: code.map(String::from),
        filing_doc_type_name: None,
        processed_file: None,
    }
}

fn sample() -> ExpectedResultSet {
    ExpectedResultSet {
        split_docs: vec![doc("FSI", Some("FSI"), &[1]), doc("FPL", Some("FPL"), &[41])],
        ..Default::default()
    }
}

#[test]
fn perfect_match() {
    let actual = vec![ActualDoc::new("FSI", 1, vec![1]), ActualDoc::new("FPL", 1, vec![41])];
    let r = validate_split(&sample(), &actual);

    assert_eq!(r.total_docs, 2);
    assert_eq!(r.validated_docs, 2);
    assert_eq!(r.overall_score, 1.0);
    assert!(r.summary.count_match);
    assert!(r.summary.all_docs_valid);
    assert_eq!(r.summary.avg_doc_type_match, 1.0);
}

#[test]
fn wrong_type_and_count_on_first_doc() {
    let actual = vec![
        ActualDoc::new("WRONG_TYPE", 2, vec![1, 2]),
        ActualDoc::new("FPL", 1, vec![41]),
    ];
    let r = validate_split(&sample(), &actual);

    assert_eq!(r.doc_results[0].score, 0.0);
    assert_eq!(r.doc_results[1].score, 1.0);
    assert_eq!(r.overall_score, 0.5);
    assert!(!r.summary.all_docs_valid);
    assert_eq!(r.summary.avg_doc_type_match, 0.5);
    assert_eq!(r.summary.avg_page_count_match, 0.5);
    assert_eq!(r.summary.avg_page_numbers_match, 0.5);
}

#[test]
fn missing_second_document_is_penalised() {
    let actual = vec![ActualDoc::new("FSI", 1, vec![1])];
    let r = validate_split(&sample(), &actual);

    assert_eq!(r.total_docs, 2);
    assert_eq!(r.validated_docs, 1);
    assert!(!r.summary.count_match);
    assert!(!r.summary.all_docs_valid);
    assert_eq!(r.overall_score, 0.8);
}

#[test]
fn penalty_is_flat_regardless_of_mismatch_size() {
    let expected = ExpectedResultSet {
        split_docs: vec![doc("A", None, &[1])],
        ..Default::default()
    };
    let one_extra = vec![ActualDoc::new("A", 1, vec![1]); 2];
    let ten_extra = vec![ActualDoc::new("A", 1, vec![1]); 11];

    let a = validate_split(&expected, &one_extra);
    let b = validate_split(&expected, &ten_extra);
    assert_eq!(a.validated_docs, 1);
    assert_eq!(b.validated_docs, 1);
    assert_eq!(a.overall_score, 0.8);
    assert_eq!(b.overall_score, a.overall_score);
}

#[test]
fn type_only_mismatch_scores_point_six() {
    let r = validate_doc(&doc("FSI", Some("FSI"), &[1]), &ActualDoc::new("X", 1, vec![1]), 0);
    assert!(!r.doc_type_match);
    assert!(r.page_count_match);
    assert!(r.page_numbers_match);
    assert_eq!(r.score, 0.6);
    assert_eq!(r.details.score_components.doc_type, 0.0);
    assert_eq!(r.details.score_components.page_numbers, 1.0);
}

#[test]
fn filing_code_is_an_accepted_alias() {
    let expected = doc("Supplier Invoice", Some("FSI"), &[1]);
    assert!(validate_doc(&expected, &ActualDoc::new("FSI", 1, vec![1]), 0).doc_type_match);
    assert!(validate_doc(&expected, &ActualDoc::new("Supplier Invoice", 1, vec![1]), 0).doc_type_match);
    assert!(!validate_doc(&expected, &ActualDoc::new("FPL", 1, vec![1]), 0).doc_type_match);
}

#[test]
fn page_count_mismatch_also_breaks_numbers() {
    let r = validate_doc(&doc("FSI", None, &[1, 2]), &ActualDoc::new("FSI", 1, vec![1]), 0);
    assert!(!r.page_count_match);
    assert!(!r.page_numbers_match);
    assert_eq!(r.score, 0.4);
}

#[test]
fn page_numbers_mismatch_only() {
    let r = validate_doc(&doc("FSI", None, &[1, 2]), &ActualDoc::new("FSI", 2, vec![1, 3]), 0);
    assert_eq!(r.score, 0.7);
}

#[test]
fn page_order_is_irrelevant_but_duplicates_count() {
    let expected = doc("A", None, &[3, 1, 2, 2]);
    let shuffled = validate_doc(&expected, &ActualDoc::new("A", 4, vec![2, 3, 2, 1]), 0);
    assert!(shuffled.page_numbers_match);
    assert_eq!(shuffled.details.expected_page_numbers, vec![1, 2, 2, 3]);

    let deduped = validate_doc(&expected, &ActualDoc::new("A", 4, vec![1, 2, 3]), 0);
    assert!(deduped.page_count_match);
    assert!(!deduped.page_numbers_match);
    assert_eq!(deduped.score, 0.7);
}

#[test]
fn count_and_numbers_are_not_cross_checked() {
    let r = validate_doc(&doc("A", None, &[5]), &ActualDoc::new("B", 1, vec![9, 10]), 0);
    assert!(r.page_count_match);
    assert!(!r.page_numbers_match);
    assert_eq!(r.score, 0.3);
}

#[test]
fn only_six_scores_are_reachable() {
    let expected = doc("A", Some("a"), &[1, 2]);
    let types = ["A", "a", "Z"];
    let counts = [0, 2, 3];
    let numbers = [vec![], vec![1, 2], vec![2, 1], vec![1, 3]];
    let allowed = [0.0, 0.3, 0.4, 0.6, 0.7, 1.0];

    for t in types {
        for c in counts {
            for n in &numbers {
                let r = validate_doc(&expected, &ActualDoc::new(t, c, n.clone()), 0);
                assert!(allowed.contains(&r.score), "unexpected score {}", r.score);
            }
        }
    }
}

#[test]
fn empty_overlap_scores_zero() {
    let empty_actual = validate_split(&sample(), &[]);
    assert_eq!(empty_actual.validated_docs, 0);
    assert_eq!(empty_actual.overall_score, 0.0);
    assert!(!empty_actual.summary.count_match);
    assert!(!empty_actual.summary.all_docs_valid);
    assert_eq!(empty_actual.summary.avg_page_count_match, 0.0);

    let both_empty = validate_split(&ExpectedResultSet::default(), &[]);
    assert_eq!(both_empty.total_docs, 0);
    assert_eq!(both_empty.overall_score, 0.0);
    assert!(both_empty.summary.count_match);
    assert_eq!(both_empty.summary.avg_doc_type_match, 0.0);

    let no_expected = validate_split(&ExpectedResultSet::default(), &[ActualDoc::new("A", 1, vec![1])]);
    assert_eq!(no_expected.validated_docs, 0);
    assert_eq!(no_expected.overall_score, 0.0);
}

#[test]
fn zero_page_expected_doc_degrades_gracefully() {
    let expected = ExpectedResultSet {
        split_docs: vec![doc("A", None, &[])],
        ..Default::default()
    };
    let r = validate_split(&expected, &[ActualDoc::new("A", 0, vec![])]);
    assert_eq!(r.overall_score, 1.0);
    assert!(r.summary.all_docs_valid);
}

#[test]
fn scoring_is_deterministic() {
    let actual = vec![ActualDoc::new("FSI", 2, vec![2, 1]), ActualDoc::new("X", 1, vec![41])];
    let a = validate_split(&sample(), &actual);
    let b = validate_split(&sample(), &actual);
    assert_eq!(a, b);
    assert_eq!(a.doc_results[0].doc_index, 0);
    assert_eq!(a.doc_results[1].doc_index, 1);
}
