use split_check::{actual::parse_actual_json, error::SplitCheckError};

#[test]
fn accepts_bare_list() {
    let req = parse_actual_json(r#"[{"doc_type":"FSI","page_count":1,"page_numbers":[1]}]"#).unwrap();
    assert_eq!(req.xml_file_id, None);
    assert_eq!(req.split_docs.len(), 1);
    assert_eq!(req.split_docs[0].page_numbers, vec![1]);
}

#[test]
fn accepts_request_object() {
    let raw = r#"{
        "xml_file_id": "0b6f3f7e-3d55-4c8e-9f1f-5a3c2b1d0e9f",
        "split_docs": [
            {"doc_type": "FSI", "page_count": 1, "page_numbers": [1]},
            {"doc_type": "FPL", "page_count": 1, "page_numbers": [41]}
        ]
    }"#;
    let req = parse_actual_json(raw).unwrap();
    assert_eq!(req.xml_file_id.as_deref(), Some("0b6f3f7e-3d55-4c8e-9f1f-5a3c2b1d0e9f"));
    assert_eq!(req.split_docs[1].doc_type, "FPL");
}

#[test]
fn missing_fields_default() {
    let req = parse_actual_json(r#"[{}, {"doc_type": "X"}]"#).unwrap();
    assert_eq!(req.split_docs[0].doc_type, "");
    assert_eq!(req.split_docs[0].page_count, 0);
    assert!(req.split_docs[1].page_numbers.is_empty());
}

#[test]
fn invalid_json_is_malformed() {
    let err = parse_actual_json("[{").unwrap_err();
    assert!(matches!(err, SplitCheckError::MalformedInput(_)));
}
