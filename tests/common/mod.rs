//! Shared test utilities for API and store integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::thread::JoinHandle;

use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;

use donow::config::Config;
use donow::domain::User;
use donow::server::{ApiServer, AppState, ShutdownHandle};
use donow::store::Store;

/// Opens a fresh on-disk store inside a temp directory
pub fn create_test_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = Store::open(&temp_dir.path().join("donow.db")).expect("Failed to open store");
    (temp_dir, store)
}

/// Creates a user and returns it with a fresh bearer token
pub fn create_user(store: &Store, email: &str) -> (User, String) {
    let user = User::new(email, None, Utc::now());
    store.insert_user(&user).expect("Failed to insert user");
    let session = store
        .create_session(&user.id)
        .expect("Failed to create session");
    (user, session.token)
}

/// API server on an ephemeral port, stopped on drop
pub struct TestServer {
    pub base_url: String,
    pub store: Store,
    pub export_dir: PathBuf,
    handle: ShutdownHandle,
    join: Option<JoinHandle<()>>,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn start() -> Self {
        let (temp_dir, store) = create_test_store();
        let export_dir = temp_dir.path().join("exports");

        let mut config = Config::with_defaults();
        config.server.port = 0;
        config.export.temp_dir = Some(export_dir.clone());

        let addr = config.server.bind_addr();
        let server = ApiServer::bind(&addr, AppState::new(store.clone(), config))
            .expect("Failed to bind test server");
        let local = server.local_addr().expect("Server has no IP address");
        let (handle, join) = server.spawn();

        Self {
            base_url: format!("http://{}", local),
            store,
            export_dir,
            handle,
            join: Some(join),
            _temp_dir: temp_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> ureq::Request {
        ureq::get(&self.url(path)).set("Authorization", &format!("Bearer {}", token))
    }

    pub fn post(&self, path: &str, token: &str) -> ureq::Request {
        ureq::post(&self.url(path)).set("Authorization", &format!("Bearer {}", token))
    }

    pub fn put(&self, path: &str, token: &str) -> ureq::Request {
        ureq::put(&self.url(path)).set("Authorization", &format!("Bearer {}", token))
    }

    pub fn delete(&self, path: &str, token: &str) -> ureq::Request {
        ureq::delete(&self.url(path)).set("Authorization", &format!("Bearer {}", token))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.shutdown();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Status and JSON body of a response, including 4xx/5xx ones
pub fn json_of(result: Result<ureq::Response, ureq::Error>) -> (u16, Value) {
    match result {
        Ok(resp) => {
            let status = resp.status();
            (status, resp.into_json().expect("Response is not JSON"))
        }
        Err(ureq::Error::Status(code, resp)) => {
            (code, resp.into_json().expect("Error response is not JSON"))
        }
        Err(e) => panic!("Transport error: {}", e),
    }
}
