//! GitHub repository lookup, proxied through the backend so the client never
//! talks to the GitHub API directly and the optional API token stays
//! server-side. The upstream body is forwarded verbatim.

use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::warn;

use crate::{error::AppError, state::State};

pub async fn fetch_repos(state: &State, username: &str) -> Result<Value, AppError> {
    let url = format!("https://api.github.com/users/{username}/repos?per_page=5&sort=created:asc");

    let mut request = state
        .http_client
        .get(&url)
        .header(USER_AGENT, "devlink")
        .header(ACCEPT, "application/vnd.github.v3+json");

    if let Some(token) = &state.config.github_token {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|cause| upstream_miss(username, &cause.to_string()))?;

    if !response.status().is_success() {
        return Err(upstream_miss(username, response.status().as_str()));
    }

    response
        .json()
        .await
        .map_err(|cause| upstream_miss(username, &cause.to_string()))
}

fn upstream_miss(username: &str, cause: &str) -> AppError {
    warn!("github lookup for {username} failed: {cause}");

    AppError::not_found("No Github profile found!")
}
