//! Test configuration helpers for pointing a client at a mock site

use std::time::Duration;
use subdivx_dl::{Config, SubdivxClient};
use wiremock::MockServer;

/// Config for a site served by `server`, with a fast retry schedule
pub fn mock_site_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.site.search_url = format!("{}/index.php", server.uri());
    config.site.origin = format!("{}/", server.uri());
    config.site.request_timeout = Duration::from_secs(5);
    config.retry.initial_delay = Duration::from_millis(10);
    config.retry.max_delay = Duration::from_millis(10);
    config
}

/// Create a SubdivxClient talking to `server`
pub fn create_mock_client(server: &MockServer) -> SubdivxClient {
    SubdivxClient::new(mock_site_config(server)).unwrap()
}

/// Create a client for the public site (live tests only)
pub fn create_live_client() -> SubdivxClient {
    SubdivxClient::new(Config::default()).unwrap()
}
