//! Verify normalization, classification and routing against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Envelopes are compared as parsed JSON, not strings, so field order in the
//! vectors does not matter.

use hostnine_core::{format_filters, ClientConfig, ErrorKind, HostnineClient, HttpResponse, Params};

fn client() -> HostnineClient {
    HostnineClient::new(ClientConfig::new("vector-key").with_base_url("http://localhost:3000/api/")).unwrap()
}

fn parse_kind(s: &str) -> ErrorKind {
    match s {
        "Transport" => ErrorKind::Transport,
        "MalformedResponse" => ErrorKind::MalformedResponse,
        "InvalidEndpoint" => ErrorKind::InvalidEndpoint,
        "InvalidCredential" => ErrorKind::InvalidCredential,
        other => panic!("unknown error kind: {other}"),
    }
}

fn params_from(pairs: &serde_json::Value) -> Params {
    pairs
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap(), pair[1].as_str().unwrap())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[test]
fn envelope_test_vectors() {
    let raw = include_str!("../../test-vectors/envelope.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = c.parse_envelope(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(err.kind(), parse_kind(expected_error.as_str().unwrap()), "{name}: error kind");
        } else {
            let envelope = result.unwrap();
            let actual = serde_json::to_value(&envelope).unwrap();
            assert_eq!(actual, case["expected"], "{name}: envelope");
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[test]
fn routing_test_vectors() {
    let raw = include_str!("../../test-vectors/routing.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["routing"].as_array().unwrap() {
        let value = case["value"].as_str().unwrap();
        let id_field = case["id_field"].as_str().unwrap();
        let name_field = case["name_field"].as_str().unwrap();
        let expected = case["expected_field"].as_str().unwrap();

        let mut params = Params::new();
        params.route(value, id_field, name_field);
        assert_eq!(params.len(), 1, "{value}: one field");
        assert_eq!(params.get(expected), Some(value), "{value}: routed to {expected}");
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[test]
fn filter_test_vectors() {
    let raw = include_str!("../../test-vectors/routing.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["filters"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = params_from(&case["input"]);
        let allowed: Option<Vec<&str>> = case["allowed"]
            .as_array()
            .map(|names| names.iter().map(|n| n.as_str().unwrap()).collect());

        let out = format_filters(&input, allowed.as_deref());
        assert_eq!(out, case["expected"].as_str().unwrap(), "{name}: formatted filters");
    }
}
