//! Shared fixtures for the gateway and session integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use opsdeck_core::api::{Navigator, Notifier};
use opsdeck_core::auth::{FileTokenStore, TokenStore};
use opsdeck_core::{ApiClient, Config, SessionStore};
use wiremock::MockServer;

/// Base URL nothing listens on.
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1/api";

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn hard_redirect(&self, path: &str) {
        self.redirects.lock().unwrap().push(path.to_string());
    }
}

pub struct Harness {
    pub api: ApiClient,
    pub storage: Arc<FileTokenStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new(base_url: &str, dir: &Path) -> Self {
        let storage = Arc::new(FileTokenStore::new(dir.to_path_buf()));
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let config = Config {
            api_base_url: base_url.to_string(),
            request_timeout_secs: 5,
            ..Config::default()
        };
        let api = ApiClient::new(&config, storage.clone(), notifier.clone(), navigator.clone())
            .expect("client should build");
        Self {
            api,
            storage,
            notifier,
            navigator,
        }
    }

    pub fn for_server(server: &MockServer, dir: &Path) -> Self {
        Self::new(&format!("{}/api", server.uri()), dir)
    }

    pub fn session(&self) -> SessionStore {
        SessionStore::restore(self.api.clone(), self.storage.clone())
    }

    pub fn stored_token(&self) -> Option<String> {
        self.storage.load().expect("token file should be readable")
    }
}
