//! Verify formatting, splitting and request building against JSON test
//! vectors stored in `test-vectors/`.
//!
//! Arguments are written as one-key objects (`{"int": 1}`, `{"body": "{}"}`)
//! so the same files can drive any implementation of the route contract.

use std::cell::RefCell;
use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};

use rest_route::{
    executor_fn, split, sprintf, Arg, Body, BuildError, Error, FormatError, Headers, HttpMethod,
    HttpRequest, HttpResponse, PayloadValue, Route, WithBaseUrl,
};
use serde_json::Value;

/// Decode one `{"kind": value}` argument.
fn parse_arg(v: &Value) -> Arg {
    let (kind, value) = v.as_object().unwrap().iter().next().unwrap();
    match kind.as_str() {
        "int" => Arg::from(value.as_i64().unwrap()),
        "uint" => Arg::from(value.as_u64().unwrap()),
        "float" => Arg::from(value.as_f64().unwrap()),
        "str" => Arg::from(value.as_str().unwrap()),
        "bool" => Arg::from(value.as_bool().unwrap()),
        "char" => Arg::from(value.as_str().unwrap().chars().next().unwrap()),
        "body" => Arg::from(Body::from(value.as_str().unwrap().to_string())),
        "headers" => Arg::from(parse_headers(value)),
        other => panic!("unknown argument kind: {other}"),
    }
}

fn parse_args(v: &Value) -> Vec<Arg> {
    v.as_array().unwrap().iter().map(parse_arg).collect()
}

fn parse_headers(v: &Value) -> Headers {
    v.as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let pair = pair.as_array().unwrap();
            (pair[0].as_str().unwrap(), pair[1].as_str().unwrap())
        })
        .collect()
}

fn format_error_name(err: &FormatError) -> &'static str {
    match err {
        FormatError::MissingArgument { .. } => "MissingArgument",
        FormatError::ExtraArguments { .. } => "ExtraArguments",
        FormatError::Mismatch { .. } => "Mismatch",
        FormatError::UnsupportedVerb { .. } => "UnsupportedVerb",
        FormatError::NoVerb { .. } => "NoVerb",
        FormatError::NotFormattable { .. } => "NotFormattable",
    }
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

#[test]
fn format_test_vectors() {
    let raw = include_str!("../../test-vectors/format.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let template = case["template"].as_str().unwrap();

        let result = parse_args(&case["args"])
            .into_iter()
            .enumerate()
            .map(|(index, arg)| arg.into_format_arg(index))
            .collect::<Result<Vec<_>, _>>()
            .and_then(|args| sprintf(template, &args));

        match case.get("expected_error") {
            Some(expected) => {
                let err = result.expect_err(name);
                assert_eq!(format_error_name(&err), expected.as_str().unwrap(), "{name}: error kind");
            }
            None => {
                let out = result.unwrap_or_else(|e| panic!("{name}: {e}"));
                assert_eq!(out, case["expected"].as_str().unwrap(), "{name}: output");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

#[test]
fn split_test_vectors() {
    let raw = include_str!("../../test-vectors/split.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let template = case["template"].as_str().unwrap();
        let args = parse_args(&case["args"]);

        if case["panics"].as_bool().unwrap_or(false) {
            let result = panic::catch_unwind(AssertUnwindSafe(|| split(template, args)));
            assert!(result.is_err(), "{name}: expected panic");
            continue;
        }

        let (substitutions, payload) = split(template, args);
        assert_eq!(
            substitutions.len() as u64,
            case["substitutions"].as_u64().unwrap(),
            "{name}: substitutions"
        );

        let kinds: Vec<&str> = payload
            .iter()
            .map(|value| match value {
                PayloadValue::Body(_) => "body",
                PayloadValue::Headers(_) => "headers",
            })
            .collect();
        let expected: Vec<&str> = case["payload"]
            .as_array()
            .unwrap()
            .iter()
            .map(|k| k.as_str().unwrap())
            .collect();
        assert_eq!(kinds, expected, "{name}: payload");
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct Sent {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

#[test]
fn build_test_vectors() {
    let raw = include_str!("../../test-vectors/build.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method: HttpMethod = case["method"].as_str().unwrap().parse().unwrap();
        // Routes hold a 'static template.
        let template: &'static str = Box::leak(case["template"].as_str().unwrap().to_string().into_boxed_str());
        let route: Route<()> = Route::new(method, template);

        let sent = RefCell::new(None);
        let exec = executor_fn(|req: HttpRequest| -> Result<HttpResponse, Infallible> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = req;
            *sent.borrow_mut() = Some(Sent {
                method,
                url,
                headers: headers.into_iter().collect(),
                body: body.map(|b| b.read_to_string().unwrap()),
            });
            Ok(HttpResponse::ok("null"))
        });

        let args = parse_args(&case["args"]);
        let result = match case["base_url"].as_str() {
            Some(base) => route.dispatch(&WithBaseUrl::new(&exec, base), args),
            None => route.dispatch(&exec, args),
        };

        if let Some(expected) = case.get("expected_error") {
            let err = result.expect_err(name);
            let kind = match err {
                Error::Build(BuildError::Format(_)) => "Format",
                Error::Build(BuildError::InvalidUrl { .. }) => "InvalidUrl",
                other => panic!("{name}: unexpected error {other}"),
            };
            assert_eq!(kind, expected.as_str().unwrap(), "{name}: error kind");
            assert!(sent.borrow().is_none(), "{name}: nothing should be sent");
            continue;
        }

        result.unwrap_or_else(|e| panic!("{name}: {e}"));
        let expected_req = &case["expected_request"];
        let expected = Sent {
            method: expected_req["method"].as_str().unwrap().parse().unwrap(),
            url: expected_req["url"].as_str().unwrap().to_string(),
            headers: parse_headers(&expected_req["headers"]).into_iter().collect(),
            body: expected_req["body"].as_str().map(str::to_string),
        };
        assert_eq!(sent.borrow_mut().take(), Some(expected), "{name}: request");
    }
}
