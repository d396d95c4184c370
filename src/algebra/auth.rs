use crate::domain::{ErrorKind, Outcome, User};
use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Resolves a bearer token to a registry user. Success content is the user
/// object; a missing or rejected token is an `unauthorized` failure.
#[async_trait]
pub trait AuthExt: Send + Sync {
    async fn authenticate(&self, token: Option<&str>) -> Outcome;
}

fn unauthorized(detail: &str) -> Outcome {
    Outcome::failure()
        .with_short(ErrorKind::Unauthorized)
        .with_content(json!(detail))
}

/// Classified resolution failure: a rejected token is `unauthorized`, but a
/// broken identity endpoint must not masquerade as one.
#[derive(Debug, Clone)]
struct AuthError {
    kind: ErrorKind,
    detail: String,
}

impl AuthError {
    fn server(detail: String) -> Self {
        Self {
            kind: ErrorKind::ServerError,
            detail,
        }
    }

    fn rejected(detail: String) -> Self {
        Self {
            kind: ErrorKind::Unauthorized,
            detail,
        }
    }
}

/// Token verification against the GitHub user endpoint, with a future cache
/// in front so repeated requests with the same PAT do not fan out to GitHub.
pub struct GithubAuth {
    client: Client,
    api_base: String,
    cache: Cache<String, Arc<User>>,
}

impl GithubAuth {
    pub fn new(client: Client, api_base: &str, cache_size: u64) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            cache: Cache::new(cache_size),
        }
    }

    async fn fetch_user(&self, token: &str) -> Result<Arc<User>, AuthError> {
        let response = self
            .client
            .get(format!("{}/user", self.api_base))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "registry-api")
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach the identity endpoint: {}", e);
                AuthError::server(format!("Failed to reach the identity endpoint: {}", e))
            })?;

        if response.status() != StatusCode::OK {
            return Err(AuthError::rejected(format!(
                "Token rejected with status {}",
                response.status()
            )));
        }

        let user = response.json::<User>().await.map_err(|e| {
            warn!("Failed to decode identity response: {}", e);
            AuthError::server(format!("Failed to decode identity response: {}", e))
        })?;

        Ok(Arc::new(user))
    }
}

#[async_trait]
impl AuthExt for GithubAuth {
    async fn authenticate(&self, token: Option<&str>) -> Outcome {
        let Some(token) = token else {
            return unauthorized("No token provided");
        };

        let user = self
            .cache
            .try_get_with(token.to_string(), self.fetch_user(token))
            .await;

        match user {
            Ok(user) => match serde_json::to_value(user.as_ref()) {
                Ok(value) => Outcome::success(value),
                Err(error) => Outcome::failure()
                    .with_short(ErrorKind::ServerError)
                    .with_content(json!(error.to_string())),
            },
            Err(error) => Outcome::failure()
                .with_short(error.kind)
                .with_content(json!(error.detail.as_str())),
        }
    }
}

/// Fixture table for development and tests: a static token to user mapping,
/// substituted for [`GithubAuth`] through the collaborator bundle.
#[derive(Debug, Default)]
pub struct StaticAuth {
    users: HashMap<String, User>,
}

impl StaticAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, token: &str, user: User) -> Self {
        self.users.insert(token.to_string(), user);
        self
    }
}

#[async_trait]
impl AuthExt for StaticAuth {
    async fn authenticate(&self, token: Option<&str>) -> Outcome {
        let Some(token) = token else {
            return unauthorized("No token provided");
        };

        match self.users.get(token) {
            Some(user) => match serde_json::to_value(user) {
                Ok(value) => Outcome::success(value),
                Err(error) => Outcome::failure()
                    .with_short(ErrorKind::ServerError)
                    .with_content(json!(error.to_string())),
            },
            None => unauthorized("Token rejected"),
        }
    }
}
