mod configuration;
mod http;

pub use configuration::*;
pub use http::*;

use crate::algebra::{Collaborators, GithubAuth, GithubVcs, MemoryStorage, Metrics};
use anyhow::Context;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Process-wide state handed to handlers: the configuration and the
/// collaborator bundle. Initialized once at startup; everything request
/// scoped lives in the outcomes themselves.
#[derive(Clone)]
pub struct AppState {
    configuration: Config,
    collaborators: Collaborators,
}

impl AppState {
    pub async fn try_from(config: Config) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.server().timeout()))
            .build()
            .context("Failed to build the outbound HTTP client")?;

        let metrics = Metrics::new()?;
        let collaborators = Collaborators::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(GithubAuth::new(
                client.clone(),
                config.registry().vcs_api_url(),
                config.server().cache_size(),
            )),
            Arc::new(GithubVcs::new(client, config.registry().vcs_api_url())),
            metrics,
        );

        Ok(Self::with_collaborators(config, collaborators))
    }

    /// Injection point for tests and alternative deployments: any bundle of
    /// collaborator implementations can back the same handlers.
    pub fn with_collaborators(configuration: Config, collaborators: Collaborators) -> Self {
        Self {
            configuration,
            collaborators,
        }
    }

    pub fn configuration(&self) -> &Config {
        &self.configuration
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }
}
