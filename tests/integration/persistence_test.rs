//! Runs against the JSON file store.

use super::{host, test_config, with_local};
use httpmock::prelude::*;
use poster::config::load_config_file;
use poster::models::{HttpMethod, Request, Variable};
use poster::store::{FileStore, Store, StoreError};
use poster::{Error, Poster, RunOptions};
use std::fs;
use tempfile::TempDir;

fn file_poster(dir: &TempDir) -> Poster<FileStore> {
    let store = FileStore::open(dir.path().join("store.json")).unwrap();
    Poster::new(store, test_config()).unwrap()
}

#[test]
fn test_regenerated_value_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path("/orders/1001");
        then.status(200);
    });

    {
        let mut poster = with_local(file_poster(&temp_dir));
        poster
            .create_variable(Variable::constant("host", host(&server), "local"))
            .unwrap();
        poster
            .create_variable(Variable::script("order", "printf '1001\\n\\n'", "local").with_timeout(30))
            .unwrap();
        poster
            .create_request(Request::new(
                "order",
                HttpMethod::GET,
                ":host/orders/:order",
                "local",
            ))
            .unwrap();
        poster.run("order", &RunOptions::new()).unwrap();
    }
    mock.assert();

    let reopened = FileStore::open(temp_dir.path().join("store.json")).unwrap();
    let order = reopened.variable("order", "local").unwrap();
    assert_eq!(order.value, "1001");
    assert!(order.last_generated.is_some());

    // Still fresh, so a second process does not rerun the script.
    let mut poster = Poster::new(reopened, test_config()).unwrap();
    poster
        .update_variable(Variable {
            generator: poster::models::Generator::Script {
                command: "exit 1".to_string(),
            },
            ..order
        })
        .unwrap();
    poster.run("order", &RunOptions::new()).unwrap();
    assert_eq!(mock.hits(), 2);
}

#[test]
fn test_environment_in_use_cannot_be_deleted() {
    let temp_dir = TempDir::new().unwrap();
    let mut poster = with_local(file_poster(&temp_dir));
    poster
        .create_variable(Variable::constant("host", "localhost", "local"))
        .unwrap();

    let err = poster.delete_environment("local").unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::InUse(_))));

    poster.delete_variable("host", "local").unwrap();
    poster.delete_environment("local").unwrap();
    assert!(poster.store().environment("local").unwrap_err().is_not_found());
}

#[test]
fn test_global_environment_is_reserved() {
    let temp_dir = TempDir::new().unwrap();
    let mut poster = file_poster(&temp_dir);
    let err = poster.delete_environment("global").unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::Reserved(_))));
}

#[test]
fn test_failed_validation_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut poster = with_local(file_poster(&temp_dir));
    let before = fs::read_to_string(temp_dir.path().join("store.json")).unwrap();

    assert!(poster
        .create_request(Request::new("has space", HttpMethod::GET, "localhost", "local"))
        .is_err());
    assert!(poster
        .create_variable(Variable::script("now", "  ", "local"))
        .is_err());

    let after = fs::read_to_string(temp_dir.path().join("store.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_config_file_drives_script_shell() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"shell": "sh", "shellArgs": ["-c"], "defaultScheme": "http"}"#,
    )
    .unwrap();
    let config = load_config_file(&config_path).unwrap();
    assert_eq!(config.shell, "sh");

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path("/echo/hello");
        then.status(200);
    });

    let store = FileStore::open(temp_dir.path().join("store.json")).unwrap();
    let mut poster = with_local(Poster::new(store, config).unwrap());
    poster
        .create_variable(Variable::script("word", "echo hello", "local"))
        .unwrap();
    poster
        .create_request(Request::new(
            "echo",
            HttpMethod::GET,
            format!("{}/echo/:word", host(&server)),
            "local",
        ))
        .unwrap();
    poster.run("echo", &RunOptions::new()).unwrap();
    mock.assert();
}
