use super::*;
use serde_json::json;

fn sample_frame() -> Frame {
    Frame {
        version: FRAME_PROTOCOL_VERSION,
        id: "id-1".to_owned(),
        parent_id: Some("parent-1".to_owned()),
        ts: 42,
        creator_id: Some("creator-1".to_owned()),
        from: Some("client-1".to_owned()),
        syscall: "preview:update".to_owned(),
        status: Status::Done,
        data: json!({
            "opacity": 0.25,
            "ok": true,
            "tags": ["a", "b"],
            "nested": {"k": "v"},
            "nil": null
        }),
    }
}

fn wire(status: i32, data: Option<prost_types::Value>, version: u32) -> Vec<u8> {
    WireFrame {
        id: "id-1".to_owned(),
        parent_id: None,
        ts: 1,
        creator_id: None,
        from: None,
        syscall: "preview:join".to_owned(),
        status,
        data,
        version,
    }
    .encode_to_vec()
}

#[test]
fn status_numeric_mapping_matches_wire_enum() {
    assert_eq!(Status::Request.as_i32(), 0);
    assert_eq!(Status::Done.as_i32(), 1);
    assert_eq!(Status::Error.as_i32(), 2);
    assert_eq!(Status::Cancel.as_i32(), 3);
    assert_eq!(Status::Item.as_i32(), 4);
}

#[test]
fn status_from_wire_rejects_out_of_range_value() {
    let err = Status::from_i32(99).expect_err("status should be invalid");
    assert!(matches!(err, CodecError::InvalidStatus(99)));
}

#[test]
fn binary_round_trip_preserves_frame() {
    let frame = sample_frame();
    let bytes = encode_frame(&frame);
    assert!(!bytes.is_empty());
    assert_eq!(decode_frame(&bytes).expect("decode"), frame);
}

#[test]
fn decode_frame_rejects_malformed_bytes() {
    let err = decode_frame(&[0xff, 0x00, 0x01]).expect_err("bytes should fail");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn decode_frame_rejects_invalid_wire_status() {
    let err = decode_frame(&wire(77, None, FRAME_PROTOCOL_VERSION)).expect_err("status should fail");
    assert!(matches!(err, CodecError::InvalidStatus(77)));
}

#[test]
fn decode_frame_rejects_other_versions() {
    let err = decode_frame(&wire(0, None, 0)).expect_err("version 0 predates the protocol");
    assert!(matches!(err, CodecError::UnsupportedVersion(0)));
}

#[test]
fn decode_frame_defaults_missing_data_to_empty_object() {
    let frame = decode_frame(&wire(0, None, FRAME_PROTOCOL_VERSION)).expect("decode");
    assert_eq!(frame.data, json!({}));
}

#[test]
fn decode_frame_converts_nan_number_to_json_null() {
    let data = prost_types::Value { kind: Some(prost_types::value::Kind::NumberValue(f64::NAN)) };
    let frame = decode_frame(&wire(0, Some(data), FRAME_PROTOCOL_VERSION)).expect("decode");
    assert_eq!(frame.data, Value::Null);
}

#[test]
fn whole_numbers_come_back_as_integers() {
    let mut frame = sample_frame();
    frame.data = json!({"order": 2, "followers": 1_200_000, "blur": 8.0, "opacity": 0.5, "delta": -3});

    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded.data["order"], json!(2));
    assert_eq!(decoded.data["followers"], json!(1_200_000));
    assert_eq!(decoded.data["blur"], json!(8));
    assert_eq!(decoded.data["opacity"], json!(0.5));
    assert_eq!(decoded.data["delta"], json!(-3));

    let order: u32 = serde_json::from_value(decoded.data["order"].clone()).expect("integer");
    assert_eq!(order, 2);
}

#[test]
fn text_round_trip_preserves_frame() {
    let frame = sample_frame();
    let text = encode_text_frame(&frame).expect("encode");
    assert_eq!(decode_text_frame(&text).expect("decode"), frame);
}

#[test]
fn text_frame_fills_optional_fields() {
    let frame = decode_text_frame(r#"{"id":"a","syscall":"preview:ready","status":"request"}"#).expect("decode");
    assert_eq!(frame.version, FRAME_PROTOCOL_VERSION);
    assert_eq!(frame.creator_id, None);
    assert_eq!(frame.data, json!({}));
}

#[test]
fn text_frame_rejects_garbage_and_other_versions() {
    assert!(matches!(decode_text_frame("not json"), Err(CodecError::Json(_))));
    let err = decode_text_frame(r#"{"version":2,"id":"a","syscall":"x","status":"request"}"#);
    assert!(matches!(err, Err(CodecError::UnsupportedVersion(2))));
}

#[test]
fn status_serializes_as_lowercase_json() {
    assert_eq!(serde_json::to_string(&Status::Request).expect("serialize"), "\"request\"");
    assert_eq!(serde_json::to_string(&Status::Item).expect("serialize"), "\"item\"");
    assert!(serde_json::from_str::<Status>("\"Error\"").is_err());
}

#[test]
fn codec_errors_name_the_failing_field() {
    assert_eq!(CodecError::InvalidStatus(9).to_string(), "invalid frame status: 9");
    assert_eq!(CodecError::UnsupportedVersion(3).to_string(), "unsupported frame version 3 (expected 1)");
    let json_err = decode_text_frame("{").expect_err("truncated json");
    assert!(json_err.to_string().starts_with("failed to decode json frame"));
}
