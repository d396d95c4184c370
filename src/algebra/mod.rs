mod auth;
mod metrics;
mod publish;
mod query;
mod sequence;
mod star;
mod storage;
mod vcs;

pub use auth::*;
pub use metrics::*;
pub use publish::*;
pub use query::*;
pub use sequence::*;
pub use star::*;
pub use storage::*;
pub use vcs::*;

use std::sync::Arc;

/// Explicit dependency bundle handed to every business procedure. Nothing in
/// a procedure reaches into ambient global state, so tests substitute fakes
/// here without touching process-wide singletons.
#[derive(Clone)]
pub struct Collaborators {
    storage: Arc<dyn StorageExt>,
    auth: Arc<dyn AuthExt>,
    vcs: Arc<dyn VcsExt>,
    metrics: Metrics,
}

impl Collaborators {
    pub fn new(
        storage: Arc<dyn StorageExt>,
        auth: Arc<dyn AuthExt>,
        vcs: Arc<dyn VcsExt>,
        metrics: Metrics,
    ) -> Self {
        Self {
            storage,
            auth,
            vcs,
            metrics,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageExt> {
        &self.storage
    }

    pub fn auth(&self) -> &Arc<dyn AuthExt> {
        &self.auth
    }

    pub fn vcs(&self) -> &Arc<dyn VcsExt> {
        &self.vcs
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
