//! Cached reads stay consistent with writes made through the same context.

use super::{host, test_config, with_local};
use httpmock::prelude::*;
use poster::cache::{CachedStore, NoopCache};
use poster::models::{Environment, HttpMethod, Request, Variable};
use poster::store::{MemoryStore, Store};
use poster::{Poster, RunOptions};

#[test]
fn test_reads_after_writes_see_new_state() {
    let mut store = CachedStore::new(MemoryStore::new());
    store.save_environments(&[Environment::new("local")]).unwrap();

    assert!(store.variables_by_environment("local").unwrap().is_empty());
    assert!(store.variables().unwrap().is_empty());
    assert!(store.variables_by_name("host").unwrap().is_empty());

    store
        .save_variables(&[Variable::constant("host", "a", "local")])
        .unwrap();
    assert_eq!(store.variables_by_environment("local").unwrap().len(), 1);
    assert_eq!(store.variables().unwrap().len(), 1);
    assert_eq!(store.variables_by_name("host").unwrap().len(), 1);
    assert_eq!(store.variable("host", "local").unwrap().value, "a");

    store
        .update_variable(&Variable::constant("host", "b", "local"))
        .unwrap();
    assert_eq!(store.variable("host", "local").unwrap().value, "b");
    assert_eq!(store.variables_by_environment("local").unwrap()[0].value, "b");

    store.delete_variable("host", "local").unwrap();
    assert!(store.variable("host", "local").unwrap_err().is_not_found());
    assert!(store.variables().unwrap().is_empty());
}

#[test]
fn test_moving_a_request_refreshes_both_environments() {
    let mut store = CachedStore::new(MemoryStore::new());
    store
        .save_environments(&[Environment::new("local"), Environment::new("staging")])
        .unwrap();
    store
        .save_requests(&[Request::new("r", HttpMethod::GET, "localhost", "local")])
        .unwrap();

    assert_eq!(store.requests_by_environment("local").unwrap().len(), 1);
    assert!(store.requests_by_environment("staging").unwrap().is_empty());

    store
        .update_request(&Request::new("r", HttpMethod::GET, "localhost", "staging"))
        .unwrap();

    assert!(store.requests_by_environment("local").unwrap().is_empty());
    assert_eq!(store.requests_by_environment("staging").unwrap().len(), 1);
    assert_eq!(store.request("r").unwrap().environment, "staging");
}

#[test]
fn test_failed_lookup_is_not_cached() {
    let mut store = CachedStore::new(MemoryStore::new());
    assert!(store.environment("local").is_err());
    store.save_environments(&[Environment::new("local")]).unwrap();
    assert_eq!(store.environment("local").unwrap().name, "local");
}

#[test]
fn test_run_refreshes_cached_variable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/ping");
        then.status(200);
    });

    let mut poster = with_local(Poster::new(MemoryStore::new(), test_config()).unwrap());
    poster
        .create_variable(Variable::constant("host", host(&server), "local"))
        .unwrap();
    poster
        .create_variable(Variable::script("stamp", "echo fresh", "local"))
        .unwrap();
    poster
        .create_request(Request::new(
            "ping",
            HttpMethod::GET,
            ":host/ping?s=:stamp",
            "local",
        ))
        .unwrap();

    // Warm every variable key before the run regenerates `stamp`.
    assert_eq!(poster.store().variable("stamp", "local").unwrap().value, "");
    assert_eq!(poster.store().variables_by_environment("local").unwrap().len(), 2);

    poster.run("ping", &RunOptions::new()).unwrap();

    assert_eq!(poster.store().variable("stamp", "local").unwrap().value, "fresh");
    let names = poster.store().variable_names("local").unwrap();
    assert_eq!(names, vec!["host", "stamp"]);
    let by_env = poster.store().variables_by_environment("local").unwrap();
    assert!(by_env.iter().any(|v| v.name == "stamp" && v.value == "fresh"));
}

#[test]
fn test_disabled_cache_behaves_the_same() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path("/ping").query_param("s", "fresh");
        then.status(200);
    });

    let mut poster = Poster::with_cache(MemoryStore::new(), NoopCache, test_config()).unwrap();
    poster.create_environment(Environment::new("local")).unwrap();
    poster
        .create_variable(Variable::script("stamp", "echo fresh", "local"))
        .unwrap();
    poster
        .create_request(Request::new(
            "ping",
            HttpMethod::GET,
            format!("{}/ping?s=:stamp", host(&server)),
            "local",
        ))
        .unwrap();

    poster.run("ping", &RunOptions::new()).unwrap();
    mock.assert();
    assert_eq!(poster.store().variable("stamp", "local").unwrap().value, "fresh");
}
