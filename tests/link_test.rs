use nodelink::{GraphError, LinkData, LinkRecord, NamedLink};
use serde_json::json;

#[test]
fn test_serialize_then_configure_round_trip() {
    let samples = [
        LinkRecord::new(1, "number", 10, 0, 20, 1),
        LinkRecord::new(42, "", 7, 3, 7, 2),
        LinkRecord::new(u64::MAX, "image/rgba", 0, 12, 99, 0),
    ];

    for original in samples {
        let mut restored = LinkRecord::default();
        restored.configure(LinkData::Ordered(original.serialize()));
        assert_eq!(restored.serialize(), original.serialize());
        assert_eq!(restored, original);
    }
}

#[test]
fn test_ordered_and_named_forms_are_equivalent() {
    let ordered = LinkRecord::from_data(LinkData::Ordered((9, 4, 1, 5, 0, "string".to_string())));
    let named = LinkRecord::from_data(LinkData::Named(NamedLink {
        id: Some(9),
        slot_type: Some("string".to_string()),
        origin_id: Some(4),
        origin_slot: Some(1),
        target_id: Some(5),
        target_slot: Some(0),
    }));

    assert_eq!(ordered.serialize(), named.serialize());
    assert_eq!(LinkRecord::from_data(LinkData::Named(ordered.to_named())), ordered);
}

#[test]
fn test_wire_form_matches_expected_layout() {
    let link = LinkRecord::new(1, "number", 10, 0, 20, 1);
    let wire = serde_json::to_string(&LinkData::from(link.serialize())).unwrap();
    assert_eq!(wire, r#"[1,10,0,20,1,"number"]"#);

    let named = serde_json::to_value(LinkData::from(link.to_named())).unwrap();
    assert_eq!(
        named,
        json!({
            "id": 1,
            "type": "number",
            "origin_id": 10,
            "origin_slot": 0,
            "target_id": 20,
            "target_slot": 1
        })
    );
}

#[test]
fn test_decoder_picks_form_from_shape() {
    let ordered: LinkData = serde_json::from_str(r#"[5, 100, 2, 200, 3, "boolean"]"#).unwrap();
    assert_eq!(ordered, LinkData::Ordered((5, 100, 2, 200, 3, "boolean".to_string())));

    let named: LinkData =
        serde_json::from_str(r#"{"id": 5, "origin_id": 100, "extra": {"color": "red"}}"#).unwrap();
    match named {
        LinkData::Named(n) => {
            assert_eq!(n.id, Some(5));
            assert_eq!(n.origin_id, Some(100));
            assert_eq!(n.target_id, None);
        }
        other => panic!("expected named form, got {:?}", other),
    }
}

#[test]
fn test_yaml_accepts_both_forms() {
    let yaml = r#"
- [3, 1, 0, 2, 0, "number"]
- id: 4
  type: "boolean"
  origin_id: 2
  origin_slot: 0
  target_id: 3
  target_slot: 1
"#;
    let links: Vec<LinkData> = serde_yaml::from_str(yaml).expect("Failed to parse YAML links");
    let records: Vec<LinkRecord> = links.into_iter().map(LinkRecord::from_data).collect();

    assert_eq!(records[0].serialize(), (3, 1, 0, 2, 0, "number".to_string()));
    assert_eq!(records[1].serialize(), (4, 2, 0, 3, 1, "boolean".to_string()));
}

#[test]
fn test_malformed_values_are_rejected() {
    let cases = [
        json!([1, 10, 0, 20, 1]),
        json!([1, 10, 0, 20, 1, "number", 7]),
        // Type tag in second position is the classic misordering.
        json!([1, "number", 10, 0, 20, 1]),
        json!([1, 10, -1, 20, 1, "number"]),
        json!({ "origin_slot": "zero" }),
        json!(17),
        json!("1,10,0,20,1,number"),
        json!(null),
    ];

    for value in cases {
        let err = LinkData::from_value(&value).expect_err("value should be rejected");
        assert!(
            matches!(err, GraphError::MalformedLinkData(_)),
            "unexpected error for {}: {:?}",
            value,
            err
        );
    }
}

#[test]
fn test_failed_configure_leaves_record_untouched() {
    let mut link = LinkRecord::new(2, "number", 1, 0, 3, 0);
    let before = link.serialize();

    assert!(link.configure_from_value(&json!([9, 9, 9])).is_err());
    assert_eq!(link.serialize(), before);
}

#[test]
fn test_named_configure_merges_onto_existing_values() {
    let mut link = LinkRecord::new(8, "number", 1, 0, 2, 0);
    link.configure(LinkData::Named(NamedLink {
        origin_slot: Some(3),
        ..NamedLink::default()
    }));

    assert_eq!(link.id, 8);
    assert_eq!(link.origin_slot, 3);
    assert_eq!(link.slot_type, "number");
}

#[test]
fn test_midpoint_never_changes_identity() {
    let mut a = LinkRecord::new(1, "number", 10, 0, 20, 1);
    let b = a.clone();
    assert_eq!(a.midpoint(), [0.0, 0.0]);

    a.set_midpoint([55.0, 12.5]);
    assert_eq!(a, b);
    assert_eq!(a.serialize(), b.serialize());
    assert_eq!(a.to_named(), b.to_named());
}
