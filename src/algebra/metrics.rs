use metrics_exporter_prometheus::PrometheusBuilder;

pub const PUBLISHED_TOTAL: &str = "packages_published";
pub const STARRED_TOTAL: &str = "packages_starred";
pub const DOWNLOADS_TOTAL: &str = "package_downloads";
pub const FAILED_REQUESTS_TOTAL: &str = "failed_requests";

/// Counter facade around the prometheus exporter. Installation can fail
/// (another recorder already registered, as in the test suite); in that case
/// the counters degrade to no-ops instead of taking the process down.
#[derive(Clone, Debug)]
pub struct Metrics {
    is_installed: bool,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let exporter = PrometheusBuilder::new()
            .install()
            .map_err(|e| {
                tracing::error!("Failed to install prometheus exporter: {}", e);
            })
            .ok();

        if exporter.is_some() {
            metrics::describe_counter!(PUBLISHED_TOTAL, "Packages and versions published");
            metrics::describe_counter!(STARRED_TOTAL, "Star operations applied");
            metrics::describe_counter!(DOWNLOADS_TOTAL, "Tarball downloads served");
            metrics::describe_counter!(FAILED_REQUESTS_TOTAL, "Requests rendered as failures");

            Ok(Self { is_installed: true })
        } else {
            Ok(Self {
                is_installed: false,
            })
        }
    }

    pub fn disabled() -> Self {
        Self {
            is_installed: false,
        }
    }

    pub fn add_published(&self, value: u64) {
        if self.is_installed {
            metrics::counter!(PUBLISHED_TOTAL, value);
        }
    }

    pub fn add_starred(&self, value: u64) {
        if self.is_installed {
            metrics::counter!(STARRED_TOTAL, value);
        }
    }

    pub fn add_downloads(&self, value: u64) {
        if self.is_installed {
            metrics::counter!(DOWNLOADS_TOTAL, value);
        }
    }

    pub fn add_failed_request(&self, value: u64) {
        if self.is_installed {
            metrics::counter!(FAILED_REQUESTS_TOTAL, value);
        }
    }
}
