//! End-to-end tests of negotiation, reassembly and parsing together.

use crate::client::MultipartReader;
use crate::error::ParsingError;
use crate::protocol::{parse_content_type, select_parser, ProtocolSpec, SpecificationRegistry};
use crate::types::Outcome;
use serde_json::{json, Value};

fn decode(content_type: &str, body: &[u8], split_at: usize) -> Vec<Result<Value, ParsingError>> {
    let content_type = parse_content_type(content_type).unwrap();
    let registry = SpecificationRegistry::default();
    let spec = registry.select(&content_type).unwrap();
    let mut reader = MultipartReader::new(content_type.boundary().unwrap(), 1 << 20);

    let mut parts = Vec::new();
    for piece in body.chunks(split_at.max(1)) {
        parts.extend(reader.feed(piece).unwrap());
    }
    parts.extend(reader.finish().unwrap());

    let mut results = Vec::new();
    for part in &parts {
        for outcome in spec.outcomes(part) {
            results.push(
                outcome
                    .into_result()
                    .map(|bytes| serde_json::from_slice(&bytes).unwrap()),
            );
        }
    }
    results
}

fn crlf(text: &str) -> Vec<u8> {
    text.replace('\n', "\r\n").into_bytes()
}

#[test]
fn test_subscription_body_any_split() {
    let body = crlf(
        "--graphql\n\
         content-type: application/json\n\
         \n\
         {}\n\
         --graphql\n\
         content-type: application/json\n\
         \n\
         {\"payload\":{\"data\":{\"reviewAdded\":{\"stars\":5}}}}\n\
         --graphql\n\
         content-type: application/json\n\
         \n\
         {\"payload\":null}\n\
         --graphql--\n",
    );

    for split_at in [1, 3, 7, 64, body.len()] {
        let results = decode(
            "multipart/mixed;boundary=\"graphql\";subscriptionSpec=1.0",
            &body,
            split_at,
        );
        assert_eq!(
            results,
            vec![Ok(json!({"data": {"reviewAdded": {"stars": 5}}}))],
            "split at {}",
            split_at
        );
    }
}

#[test]
fn test_defer_body() {
    let body = crlf(
        "--graphql\n\
         content-type: application/json\n\
         \n\
         {\n  \"data\": {\"__typename\": \"Hero\", \"name\": \"Luke Skywalker\"},\n  \"hasNext\": true\n}\n\
         --graphql\n\
         content-type: application/json\n\
         \n\
         {\"incremental\":[{\"data\":{\"films\":[\"A New Hope\"]},\"path\":[]}],\"hasNext\":false}\n\
         --graphql--\n",
    );

    let results = decode("multipart/mixed;boundary=\"graphql\";deferSpec=20220824", &body, 5);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap()["data"]["name"], "Luke Skywalker");
    assert_eq!(results[1].as_ref().unwrap()["hasNext"], false);
}

#[test]
fn test_defer_incorrect_content_type() {
    let body = crlf(
        "--graphql\n\
         content-type: test/custom\n\
         \n\
         {\n  \"data\" : {\n    \"key\" : \"value\"\n  }\n}\n\
         --graphql--\n",
    );

    let results = decode("multipart/mixed;boundary=graphql;deferSpec=20220824", &body, 4096);
    assert_eq!(
        results,
        vec![Err(ParsingError::unsupported_content_type("test/custom"))]
    );
}

#[test]
fn test_defer_unrecognizable_chunk() {
    let body = crlf(
        "--graphql\n\
         content-type: application/json\n\
         \n\
         not_a_valid_json_object\n\
         --graphql--\n",
    );

    let results = decode("multipart/mixed;boundary=graphql;deferSpec=20220824", &body, 4096);
    assert_eq!(results, vec![Err(ParsingError::CannotParseChunkData)]);
}

#[test]
fn test_heartbeat_only_chunks_are_silent() {
    for spec in [ProtocolSpec::DEFER, ProtocolSpec::SUBSCRIPTION] {
        assert_eq!(spec.outcomes("{}").count(), 0);
        assert_eq!(spec.outcomes("{}\n\n{}").count(), 0);
    }
}

#[test]
fn test_content_type_rejected_exactly_once() {
    for spec in [ProtocolSpec::DEFER, ProtocolSpec::SUBSCRIPTION] {
        let outcomes: Vec<_> = spec
            .outcomes("content-type: text/html\n\ncontent-type: text/plain\n\n{\"payload\":{}}")
            .collect();
        assert_eq!(
            outcomes,
            vec![Outcome::Error(ParsingError::unsupported_content_type("text/html"))]
        );
    }
}

#[test]
fn test_errors_without_payload_for_both_variants() {
    for spec in [ProtocolSpec::DEFER, ProtocolSpec::SUBSCRIPTION] {
        let outcomes: Vec<_> = spec
            .outcomes(r#"{"errors":[{"message":"Forced test error"}]}"#)
            .collect();
        assert_eq!(
            outcomes,
            vec![Outcome::Error(ParsingError::irrecoverable(Some("Forced test error")))]
        );
    }
}

#[test]
fn test_parser_is_shareable_across_threads() {
    let spec = select_parser("subscriptionSpec=1.0").unwrap();
    let handles: Vec<_> = (0..4)
        .map(|n| {
            std::thread::spawn(move || {
                let chunk = format!("{{\"payload\":{{\"n\":{}}}}}", n);
                spec.outcomes(&chunk).collect::<Vec<_>>()
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let outcomes = handle.join().unwrap();
        let expected = format!("{{\"n\":{}}}", n);
        assert_eq!(outcomes, vec![Outcome::Data(expected.into_bytes().into())]);
    }
}
