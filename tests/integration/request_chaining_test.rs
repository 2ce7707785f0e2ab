//! Request variables: one request feeding another.

use super::{host, local_poster};
use chrono::{Duration, Utc};
use httpmock::prelude::*;
use poster::models::{HttpMethod, Request, Variable};
use poster::store::{MemoryStore, Store};
use poster::variables::GenerationError;
use poster::{Error, Poster, RunOptions};

/// `login` and `profile`; `profile` sends `Bearer :token`.
fn chained_poster(server: &MockServer) -> Poster<MemoryStore> {
    let mut poster = local_poster();
    poster
        .create_variable(Variable::constant("host", host(server), "local"))
        .unwrap();
    poster
        .create_request(Request::new("login", HttpMethod::POST, ":host/login", "local"))
        .unwrap();
    poster
        .create_request(
            Request::new("profile", HttpMethod::GET, ":host/profile", "local")
                .with_header("Authorization", "Bearer :token"),
        )
        .unwrap();
    poster
}

fn token_variable() -> Variable {
    Variable::from_request("token", "login", "local", "$.data.token", "local")
}

#[test]
fn test_request_variable_runs_sub_request() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data": {"token": "abc123"}}"#);
    });
    let profile = server.mock(|when, then| {
        when.method(GET)
            .path("/profile")
            .header("authorization", "Bearer abc123");
        then.status(200).body("me");
    });

    let mut poster = chained_poster(&server);
    poster.create_variable(token_variable()).unwrap();

    let output = poster.run("profile", &RunOptions::new()).unwrap();

    login.assert();
    profile.assert();
    assert_eq!(output.response.body_as_string().unwrap(), "me");

    let stored = poster.store().variable("token", "local").unwrap();
    assert_eq!(stored.value, "abc123");
    assert!(stored.last_generated.is_some());
}

#[test]
fn test_fresh_request_variable_is_not_rerun() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(200).body(r#"{"data": {"token": "new"}}"#);
    });
    let profile = server.mock(|when, then| {
        when.path("/profile").header("authorization", "Bearer cached");
        then.status(200);
    });

    let mut poster = chained_poster(&server);
    let mut token = token_variable().with_timeout(60);
    token.value = "cached".to_string();
    token.last_generated = Some(Utc::now() - Duration::minutes(5));
    poster.create_variable(token).unwrap();

    poster.run("profile", &RunOptions::new()).unwrap();

    assert_eq!(login.hits(), 0);
    profile.assert();
}

#[test]
fn test_zero_timeout_regenerates_every_run() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(200).body(r#"{"data": {"token": "abc123"}}"#);
    });
    let profile = server.mock(|when, then| {
        when.path("/profile");
        then.status(200);
    });

    let mut poster = chained_poster(&server);
    poster.create_variable(token_variable()).unwrap();

    poster.run("profile", &RunOptions::new()).unwrap();
    poster.run("profile", &RunOptions::new()).unwrap();

    assert_eq!(login.hits(), 2);
    assert_eq!(profile.hits(), 2);
}

#[test]
fn test_self_referencing_request_is_a_cycle() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.path_contains("/login");
        then.status(200).body(r#"{"data": {"token": "abc123"}}"#);
    });

    let mut poster = local_poster();
    poster
        .create_variable(Variable::constant("host", host(&server), "local"))
        .unwrap();
    poster
        .create_request(Request::new(
            "login",
            HttpMethod::POST,
            ":host/login/:token",
            "local",
        ))
        .unwrap();
    poster.create_variable(token_variable()).unwrap();

    let err = poster.run("login", &RunOptions::new()).unwrap_err();

    assert!(matches!(
        err,
        Error::Generation(GenerationError::CycleDetected { ref name, ref environment })
            if name == "token" && environment == "local"
    ));
    assert_eq!(login.hits(), 0);
}

#[test]
fn test_malformed_json_keeps_previous_value() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(200).body("<html>maintenance</html>");
    });
    let profile = server.mock(|when, then| {
        when.path("/profile").header("authorization", "Bearer old");
        then.status(200);
    });

    let mut poster = chained_poster(&server);
    let mut token = token_variable();
    token.value = "old".to_string();
    poster.create_variable(token).unwrap();

    let output = poster.run("profile", &RunOptions::new()).unwrap();

    profile.assert();
    assert_eq!(output.warnings.len(), 1);
    assert!(matches!(
        output.warnings[0],
        GenerationError::MalformedJson(_)
    ));
    let stored = poster.store().variable("token", "local").unwrap();
    assert_eq!(stored.value, "old");
    assert!(stored.last_generated.is_none());
}

#[test]
fn test_non_string_json_value_aborts_run() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(200).body(r#"{"data": {"token": 42}}"#);
    });
    let profile = server.mock(|when, then| {
        when.path("/profile");
        then.status(200);
    });

    let mut poster = chained_poster(&server);
    poster.create_variable(token_variable()).unwrap();

    let err = poster.run("profile", &RunOptions::new()).unwrap_err();

    assert!(matches!(
        err,
        Error::Generation(GenerationError::TypeMismatch { .. })
    ));
    assert_eq!(profile.hits(), 0);
}

#[test]
fn test_overrides_reach_sub_requests() {
    let server = MockServer::start();
    let as_alice = server.mock(|when, then| {
        when.method(POST).path("/login").query_param("user", "alice");
        then.status(200).body(r#"{"data": {"token": "alice-token"}}"#);
    });
    let as_bob = server.mock(|when, then| {
        when.method(POST).path("/login").query_param("user", "bob");
        then.status(200).body(r#"{"data": {"token": "bob-token"}}"#);
    });
    let profile = server.mock(|when, then| {
        when.path("/profile").header("authorization", "Bearer bob-token");
        then.status(200);
    });

    let mut poster = chained_poster(&server);
    poster
        .update_request(Request::new(
            "login",
            HttpMethod::POST,
            ":host/login?user=:user",
            "local",
        ))
        .unwrap();
    poster
        .create_variable(Variable::constant("user", "alice", "local"))
        .unwrap();
    poster.create_variable(token_variable()).unwrap();

    poster
        .run("profile", &RunOptions::new().variable("user", "bob"))
        .unwrap();

    assert_eq!(as_alice.hits(), 0);
    as_bob.assert();
    profile.assert();
    assert_eq!(poster.store().variable("user", "local").unwrap().value, "alice");
}

#[test]
fn test_nested_malformed_json_is_reported_at_top() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/inner");
        then.status(200).body("not json");
    });
    server.mock(|when, then| {
        when.method(GET).path("/middle").header("x-inner", "stale");
        then.status(200).body(r#"{"data": {"token": "outer-value"}}"#);
    });
    let top = server.mock(|when, then| {
        when.method(GET).path("/top").header("x-outer", "outer-value");
        then.status(200);
    });

    let mut poster = local_poster();
    poster
        .create_variable(Variable::constant("host", host(&server), "local"))
        .unwrap();
    poster
        .create_request(Request::new("inner", HttpMethod::GET, ":host/inner", "local"))
        .unwrap();
    poster
        .create_request(
            Request::new("middle", HttpMethod::GET, ":host/middle", "local")
                .with_header("X-Inner", ":inner-value"),
        )
        .unwrap();
    poster
        .create_request(
            Request::new("top", HttpMethod::GET, ":host/top", "local")
                .with_header("X-Outer", ":outer-value"),
        )
        .unwrap();

    let mut inner = Variable::from_request("inner-value", "inner", "local", "$.id", "local");
    inner.value = "stale".to_string();
    poster.create_variable(inner).unwrap();
    poster
        .create_variable(Variable::from_request(
            "outer-value",
            "middle",
            "local",
            "$.data.token",
            "local",
        ))
        .unwrap();

    let direct = poster.run("middle", &RunOptions::new()).unwrap();
    assert_eq!(direct.warnings.len(), 1);

    let nested = poster.run("top", &RunOptions::new()).unwrap();
    top.assert();
    assert_eq!(nested.warnings.len(), 1);
    assert!(matches!(
        nested.warnings[0],
        GenerationError::MalformedJson(_)
    ));
}

#[test]
fn test_raw_body_script_and_request_variables_together() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/login");
        then.status(200).body("raw-token\n");
    });
    let item = server.mock(|when, then| {
        when.path("/items/42").header("authorization", "Bearer raw-token");
        then.status(200);
    });

    let mut poster = chained_poster(&server);
    poster
        .create_variable(Variable::from_request("token", "login", "local", "", "local"))
        .unwrap();
    poster
        .create_variable(Variable::script("id", "echo 42", "local"))
        .unwrap();
    poster
        .create_request(
            Request::new("item", HttpMethod::GET, ":host/items/:id", "local")
                .with_header("Authorization", "Bearer :token"),
        )
        .unwrap();

    poster.run("item", &RunOptions::new()).unwrap();

    item.assert();
    assert_eq!(poster.store().variable("id", "local").unwrap().value, "42");
}

#[test]
fn test_missing_sub_request_is_not_found() {
    let server = MockServer::start();
    let mut poster = chained_poster(&server);
    poster
        .create_variable(Variable::from_request("token", "nope", "local", "", "local"))
        .unwrap();

    let err = poster.run("profile", &RunOptions::new()).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        Error::Generation(GenerationError::NotFound(_))
    ));
}

#[test]
fn test_sub_request_transport_failure_names_request() {
    let server = MockServer::start();
    let mut poster = chained_poster(&server);
    poster
        .update_request(Request::new("login", HttpMethod::POST, "127.0.0.1:1/login", "local"))
        .unwrap();
    poster.create_variable(token_variable()).unwrap();

    let err = poster.run("profile", &RunOptions::new()).unwrap_err();
    match err {
        Error::Generation(GenerationError::Request { request, source }) => {
            assert_eq!(request, "login");
            assert!(matches!(*source, Error::Request(_)));
        }
        other => panic!("expected a wrapped request failure, got {:?}", other),
    }
}
