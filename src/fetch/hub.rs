//! HuggingFace Hub fetches through the `hf-hub` client.
use super::{FetchError, Fetcher};
use crate::plan::FetchEntry;
use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use std::path::PathBuf;

pub struct HubFetcher {
    repo_id: String,
    repo: ApiRepo,
}

impl HubFetcher {
    /// Build a client for `repo_id` whose cache lives in `cache_dir`.
    pub fn new(
        repo_id: &str,
        token: Option<String>,
        cache_dir: PathBuf,
    ) -> Result<Self, FetchError> {
        let api = ApiBuilder::new()
            .with_progress(true)
            .with_token(token)
            .with_cache_dir(cache_dir)
            .build()
            .map_err(|err| FetchError::Setup(format!("build hub client: {err}")))?;
        Ok(Self {
            repo_id: repo_id.to_string(),
            repo: api.model(repo_id.to_string()),
        })
    }
}

impl Fetcher for HubFetcher {
    fn retrieve(&self, entry: &FetchEntry) -> Result<PathBuf, FetchError> {
        tracing::debug!(repo = %self.repo_id, file = %entry.remote, "hub fetch");
        self.repo
            .get(&entry.remote)
            .map_err(|err| classify(&entry.remote, &err.to_string()))
    }
}

/// Gated repositories answer 401/403 until the license is accepted.
fn classify(remote: &str, message: &str) -> FetchError {
    let denied = ["401", "403", "gated", "Unauthorized", "Forbidden"]
        .iter()
        .any(|needle| message.contains(needle));
    if denied {
        FetchError::Unauthorized {
            remote: remote.to_string(),
            message: message.to_string(),
        }
    } else {
        FetchError::Transfer {
            remote: remote.to_string(),
            message: message.to_string(),
        }
    }
}
