mod algebra;
mod domain;
mod service;

pub use algebra::*;
pub use domain::*;
pub use service::*;

pub mod prelude {
    pub use crate::algebra::*;
    pub use crate::domain::*;
    pub use crate::service::*;
    pub use crate::PREFIX;
}

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{
    dev::Server,
    web::{scope, Data},
    App, HttpServer,
};
use anyhow::Context;
use std::net::TcpListener;

pub const PREFIX: &str = "/api";

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn start(configuration: &Config) -> Result<Self, anyhow::Error> {
        let state = AppState::try_from(configuration.clone()).await?;

        Self::start_with(configuration, state).await
    }

    /// Starts the server with an explicit state, letting tests substitute
    /// fake collaborators without mutating anything global.
    pub async fn start_with(
        configuration: &Config,
        state: AppState,
    ) -> Result<Self, anyhow::Error> {
        tracing::info!(
            "Starting application with configuration: {}{:#?}{}",
            "\n",
            &configuration,
            "\n"
        );
        let address = format!(
            "{}:{}",
            configuration.server().host(),
            configuration.server().port()
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, configuration.clone(), state).await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn spawn(self) -> Result<(), anyhow::Error> {
        self.server
            .await
            .context("Failed to run the http application.")
    }
}

async fn run(
    listener: TcpListener,
    configuration: Config,
    state: AppState,
) -> Result<Server, anyhow::Error> {
    let governor = GovernorConfigBuilder::default()
        .per_second(configuration.server().burst_rate_limit())
        .permissive(configuration.server().is_development())
        .burst_size(configuration.server().burst_size_limit())
        .finish()
        .context("Failed to create governor.")?;

    let server = HttpServer::new(move || {
        let trace: Tracer = Tracer::default();
        App::new()
            .wrap(trace.tracer())
            .wrap(
                Cors::default()
                    .allowed_methods(vec!["GET", "POST", "DELETE"])
                    .allow_any_origin()
                    .allow_any_header()
                    .supports_credentials()
                    .max_age(3600),
            )
            .wrap(Governor::new(&governor))
            .service(
                scope(PREFIX)
                    .service(health_check)
                    // `/packages/search` must be registered ahead of the
                    // `/packages/{name}` matcher.
                    .service(search)
                    .service(list_packages)
                    .service(download_tarball)
                    .service(show_version)
                    .service(show_package)
                    .service(user_stars)
                    .service(create_package)
                    .service(create_version)
                    .service(delete_version)
                    .service(delete_package)
                    .service(star)
                    .service(unstar),
            )
            .service(landing)
            .app_data(Data::new(state.clone()))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
