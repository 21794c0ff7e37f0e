use super::*;

#[test]
fn kv_pairs_decode_from_consul_json() {
    let json = r#"[
        {
            "LockIndex": 1,
            "Key": "service/svc/lock/abc",
            "Flags": 0,
            "Value": "bm9uZQ==",
            "CreateIndex": 10,
            "ModifyIndex": 12
        },
        {
            "LockIndex": 0,
            "Key": "service/svc/lock/.lock",
            "Flags": 0,
            "Value": null,
            "CreateIndex": 11,
            "ModifyIndex": 15
        }
    ]"#;
    let pairs: Vec<KvPair> = serde_json::from_str(json).unwrap();
    let entries = entries_from_pairs(pairs).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].key, "service/svc/lock/abc");
    assert_eq!(entries[0].value, b"none");
    assert_eq!(entries[0].modify_version, 12);
    assert!(entries[1].value.is_empty());
    assert_eq!(entries[1].modify_version, 15);
}

#[test]
fn bad_base64_is_an_unexpected_response() {
    let pairs = vec![KvPair {
        key: "k".to_string(),
        value: Some("!!not-base64!!".to_string()),
        modify_index: 1,
    }];
    assert!(matches!(
        entries_from_pairs(pairs),
        Err(StoreError::UnexpectedResponse(_))
    ));
}

#[test]
fn session_created_decodes_id() {
    let created: SessionCreated =
        serde_json::from_str(r#"{"ID": "adf4238a-882b-9ddc-4a9d-5b6758e4159e"}"#).unwrap();
    assert_eq!(created.id, "adf4238a-882b-9ddc-4a9d-5b6758e4159e");
}

#[test]
fn condition_bodies_parse_as_bools() {
    assert!(parse_condition("true\n").unwrap());
    assert!(!parse_condition("false").unwrap());
    assert!(matches!(
        parse_condition("maybe"),
        Err(StoreError::UnexpectedResponse(_))
    ));
}
