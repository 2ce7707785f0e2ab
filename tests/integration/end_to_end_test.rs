//! Full runs: create resources, run a request, inspect what was sent.

use super::{host, local_poster, test_config};
use chrono::Utc;
use httpmock::prelude::*;
use poster::executor::RequestError;
use poster::models::{Environment, HttpMethod, Request, Variable};
use poster::store::{MemoryStore, Store};
use poster::{Error, Poster, RunOptions};

#[test]
fn test_const_variable_resolves_into_url() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).body("ok");
    });

    let mut poster = local_poster();
    poster
        .create_variable(Variable::constant("host", host(&server), "local"))
        .unwrap();
    poster
        .create_request(Request::new("health", HttpMethod::GET, ":host/health", "local"))
        .unwrap();

    let output = poster.run("health", &RunOptions::new()).unwrap();

    mock.assert();
    assert_eq!(
        output.request.url.as_str(),
        format!("http://{}/health", host(&server))
    );
    assert_eq!(output.environment, "local");
    assert_eq!(output.response.status_code, 200);
    assert_eq!(output.response.body_as_string().unwrap(), "ok");
    assert!(output.warnings.is_empty());
}

#[test]
fn test_environment_variable_shadows_global() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/items").query_param("page", "2");
        then.status(200);
    });

    let mut poster = local_poster();
    poster
        .create_variable(Variable::constant("host", host(&server), "global"))
        .unwrap();
    poster
        .create_variable(Variable::constant("page", "1", "global"))
        .unwrap();
    poster
        .create_variable(Variable::constant("page", "2", "local"))
        .unwrap();
    poster
        .create_request(Request::new(
            "items",
            HttpMethod::GET,
            ":host/items?page=:page",
            "local",
        ))
        .unwrap();

    poster.run("items", &RunOptions::new()).unwrap();
    mock.assert();
}

#[test]
fn test_environment_override_selects_scope() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(204);
    });

    let mut poster = local_poster();
    poster.create_environment(Environment::new("staging")).unwrap();
    poster
        .create_variable(Variable::constant("host", "127.0.0.1:1", "local"))
        .unwrap();
    poster
        .create_variable(Variable::constant("host", host(&server), "staging"))
        .unwrap();
    poster
        .create_request(Request::new("health", HttpMethod::GET, ":host/health", "local"))
        .unwrap();

    let output = poster
        .run("health", &RunOptions::new().environment("staging"))
        .unwrap();

    mock.assert();
    assert_eq!(output.environment, "staging");
    assert_eq!(output.response.status_code, 204);
}

#[test]
fn test_variable_override_wins_and_skips_generation() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/users/7");
        then.status(200);
    });

    let mut poster = local_poster();
    poster
        .create_variable(Variable::constant("host", "127.0.0.1:1", "local"))
        .unwrap();
    poster
        .create_variable(Variable::script("id", "exit 3", "local"))
        .unwrap();
    poster
        .create_request(Request::new("user", HttpMethod::GET, ":host/users/:id", "local"))
        .unwrap();

    let options = RunOptions::new()
        .variable("host", host(&server))
        .variable("id", "7");
    poster.run("user", &options).unwrap();

    mock.assert();
    // Overrides are never persisted.
    let stored = poster.store().variable("host", "local").unwrap();
    assert_eq!(stored.value, "127.0.0.1:1");
    assert!(poster.store().variable("id", "local").unwrap().last_generated.is_none());
}

#[test]
fn test_header_and_body_overrides_apply_to_one_run() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/items")
            .header("x-mode", "override")
            .header("x-extra", "1")
            .body(r#"{"name":"new"}"#);
        then.status(201);
    });

    let mut poster = local_poster();
    poster
        .create_variable(Variable::constant("host", host(&server), "local"))
        .unwrap();
    poster
        .create_request(
            Request::new("create", HttpMethod::POST, ":host/items", "local")
                .with_header("X-Mode", "stored")
                .with_body(r#"{"name":"stored"}"#),
        )
        .unwrap();

    let options = RunOptions::new()
        .header("x-mode", "override")
        .header("X-Extra", "1")
        .body(r#"{"name":"new"}"#);
    let output = poster.run("create", &options).unwrap();

    mock.assert();
    assert_eq!(output.request.headers.len(), 2);
    let stored = poster.store().request("create").unwrap();
    assert_eq!(stored.headers.len(), 1);
    assert_eq!(stored.headers[0].value, "stored");
    assert_eq!(stored.body, r#"{"name":"stored"}"#);
}

#[test]
fn test_placeholders_in_headers_and_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/profile")
            .header("authorization", "Bearer s3cr3t")
            .body("user=alice-smith");
        then.status(200);
    });

    let mut poster = local_poster();
    poster
        .create_variable(Variable::constant("host", host(&server), "local"))
        .unwrap();
    poster
        .create_variable(Variable::constant("token", "s3cr3t", "global"))
        .unwrap();
    poster
        .create_variable(Variable::constant("user", "alice", "local"))
        .unwrap();
    poster
        .create_variable(Variable::constant("user-last", "smith", "local"))
        .unwrap();
    poster
        .create_request(
            Request::new("profile", HttpMethod::PUT, ":host/profile", "local")
                .with_header("Authorization", "Bearer :token")
                .with_body("user=:user-:user-last"),
        )
        .unwrap();

    poster.run("profile", &RunOptions::new()).unwrap();
    mock.assert();
}

#[test]
fn test_error_status_is_returned_not_raised() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/broken");
        then.status(500).body("boom");
    });

    let mut poster = local_poster();
    poster
        .create_request(Request::new(
            "broken",
            HttpMethod::GET,
            server.url("/broken"),
            "local",
        ))
        .unwrap();

    let output = poster.run("broken", &RunOptions::new()).unwrap();
    assert_eq!(output.response.status_code, 500);
    assert!(!output.response.is_success());
}

#[test]
fn test_connection_failure_is_a_request_error() {
    let mut poster = local_poster();
    poster
        .create_request(Request::new("down", HttpMethod::GET, "127.0.0.1:1/", "local"))
        .unwrap();

    let err = poster.run("down", &RunOptions::new()).unwrap_err();
    assert!(matches!(
        err,
        Error::Request(RequestError::RequestFailed(ref reason)) if reason.starts_with("Connection failed")
    ));
}

#[test]
fn test_unresolved_host_is_invalid_url() {
    let mut poster = local_poster();
    poster
        .create_request(Request::new("r", HttpMethod::GET, ":host/health", "local"))
        .unwrap();

    let err = poster.run("r", &RunOptions::new()).unwrap_err();
    assert!(matches!(err, Error::Request(RequestError::InvalidUrl(_))));
}

#[test]
fn test_out_of_range_timeout_in_store_keeps_value() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path("/users/7");
        then.status(200);
    });

    // Written straight to the store, bypassing validation.
    let mut id = Variable::script("id", "exit 1", "local").with_timeout(i64::MAX / 2);
    id.value = "7".to_string();
    id.last_generated = Some(Utc::now());

    let mut store = MemoryStore::new();
    store.save_environments(&[Environment::new("local")]).unwrap();
    store
        .save_variables(&[Variable::constant("host", host(&server), "local"), id.clone()])
        .unwrap();
    store
        .save_requests(&[Request::new("user", HttpMethod::GET, ":host/users/:id", "local")])
        .unwrap();

    let mut poster = Poster::new(store, test_config()).unwrap();
    poster.run("user", &RunOptions::new()).unwrap();
    mock.assert();

    assert!(matches!(
        poster.create_variable(Variable { environment: "global".to_string(), ..id }),
        Err(Error::Validation(_))
    ));
}
