//! Shared fixtures for the integration tests.

pub mod cache_consistency_test;
pub mod end_to_end_test;
pub mod persistence_test;
pub mod request_chaining_test;

use httpmock::MockServer;
use poster::config::PosterConfig;
use poster::models::Environment;
use poster::store::{MemoryStore, Store};
use poster::Poster;

/// Config that runs scripts through `sh`, which every test host has.
pub fn test_config() -> PosterConfig {
    PosterConfig {
        shell: "sh".to_string(),
        shell_args: vec!["-c".to_string()],
        ..Default::default()
    }
}

/// A poster over an empty memory store with a `local` environment.
pub fn local_poster() -> Poster<MemoryStore> {
    with_local(Poster::new(MemoryStore::new(), test_config()).unwrap())
}

/// Creates the `local` environment and returns the poster.
pub fn with_local<S: Store>(mut poster: Poster<S>) -> Poster<S> {
    poster.create_environment(Environment::new("local")).unwrap();
    poster
}

/// `host:port` of the mock server, without a scheme.
pub fn host(server: &MockServer) -> String {
    server.address().to_string()
}
