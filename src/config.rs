//! Backend resolution from flags and environment.
//!
//! The store backend is decided once per invocation:
//!
//! - `DOCBATCH_BACKEND=memory` selects the in-memory store (tests, offline
//!   experiments).
//! - Otherwise the Firestore backend is used. The project id comes from
//!   `--project`, `DOCBATCH_PROJECT`, or `GOOGLE_CLOUD_PROJECT`; the
//!   access token from `DOCBATCH_ACCESS_TOKEN` or a `gcloud auth
//!   print-access-token` subprocess. With `FIRESTORE_EMULATOR_HOST` set,
//!   no token is needed and traffic goes to the emulator over plain HTTP.

use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};
use crate::store::firestore::{FirestoreConfig, FirestoreStore};
use crate::store::memory::MemoryStore;
use crate::store::DocumentStore;

/// Environment variable selecting the backend (`memory` or `firestore`).
pub const BACKEND_ENV: &str = "DOCBATCH_BACKEND";
/// Environment variable carrying a ready-made OAuth2 access token.
pub const TOKEN_ENV: &str = "DOCBATCH_ACCESS_TOKEN";
/// Project id fallbacks, in priority order after `--project`.
pub const PROJECT_ENVS: [&str; 2] = ["DOCBATCH_PROJECT", "GOOGLE_CLOUD_PROJECT"];
/// Emulator host variable shared with the official SDKs.
pub const EMULATOR_ENV: &str = "FIRESTORE_EMULATOR_HOST";

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the effective project id.
pub fn resolve_project(flag: Option<&str>) -> Result<String> {
    if let Some(project) = flag {
        return Ok(project.to_string());
    }
    for name in PROJECT_ENVS {
        if let Some(project) = env_non_empty(name) {
            return Ok(project);
        }
    }
    Err(Error::Config("no project id configured".to_string()))
}

/// Fetch an access token, preferring the environment over gcloud.
fn resolve_token() -> Result<String> {
    if let Some(token) = env_non_empty(TOKEN_ENV) {
        return Ok(token);
    }

    debug!("no {TOKEN_ENV} set, asking gcloud for an access token");
    let output = Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .map_err(|e| Error::Config(format!("could not run gcloud: {e}")))?;
    if !output.status.success() {
        return Err(Error::Config(format!(
            "gcloud auth print-access-token failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(Error::Config("gcloud returned an empty token".to_string()));
    }
    Ok(token)
}

/// Open the configured document store.
pub fn open_store(project_flag: Option<&str>, database: &str) -> Result<Box<dyn DocumentStore>> {
    if env_non_empty(BACKEND_ENV).as_deref() == Some("memory") {
        debug!("using in-memory store backend");
        return Ok(Box::new(MemoryStore::new()));
    }

    let project_id = resolve_project(project_flag)?;
    let emulator_host = env_non_empty(EMULATOR_ENV);
    let access_token = if emulator_host.is_some() {
        None
    } else {
        Some(resolve_token()?)
    };

    let store = FirestoreStore::connect(&FirestoreConfig {
        project_id,
        database_id: database.to_string(),
        access_token,
        emulator_host,
    })?;
    Ok(Box::new(store))
}
