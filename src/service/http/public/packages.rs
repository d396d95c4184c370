use crate::prelude::{
    download, get_package, get_version, list_user_stars, render, search_packages, AppState,
    RenderKind,
};
use actix_web::web::{Data, Path, Query};
use actix_web::{get, HttpRequest, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

impl SearchParams {
    /// Normalizes page/limit against the configured bounds; invalid input
    /// degrades to defaults, it does not error.
    fn normalized(&self, state: &AppState) -> (String, u64, u64) {
        let registry = state.configuration().registry();
        let query = self.q.clone().unwrap_or_default().trim().to_string();
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(registry.default_page_limit())
            .clamp(1, registry.max_page_limit());

        (query, page, limit)
    }
}

#[tracing::instrument(name = "List packages", skip(request, state))]
#[get("/packages")]
pub async fn list_packages(
    request: HttpRequest,
    state: Data<AppState>,
    params: Query<SearchParams>,
) -> HttpResponse {
    let (query, page, limit) = params.normalized(&state);
    let outcome = search_packages(query, page, limit, state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::PaginatedJson,
        state.collaborators().metrics(),
    )
}

#[tracing::instrument(name = "Search packages", skip(request, state))]
#[get("/packages/search")]
pub async fn search(
    request: HttpRequest,
    state: Data<AppState>,
    params: Query<SearchParams>,
) -> HttpResponse {
    let (query, page, limit) = params.normalized(&state);
    let outcome = search_packages(query, page, limit, state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::PaginatedJson,
        state.collaborators().metrics(),
    )
}

#[tracing::instrument(name = "Show package", skip(request, state))]
#[get("/packages/{name}")]
pub async fn show_package(
    request: HttpRequest,
    state: Data<AppState>,
    name: Path<String>,
) -> HttpResponse {
    let outcome = get_package(name.into_inner(), state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}

#[tracing::instrument(name = "Show version", skip(request, state))]
#[get("/packages/{name}/versions/{version}")]
pub async fn show_version(
    request: HttpRequest,
    state: Data<AppState>,
    path: Path<(String, String)>,
) -> HttpResponse {
    let (name, version) = path.into_inner();
    let outcome = get_version(name, version, state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}

#[tracing::instrument(name = "Download tarball", skip(request, state))]
#[get("/packages/{name}/versions/{version}/tarball")]
pub async fn download_tarball(
    request: HttpRequest,
    state: Data<AppState>,
    path: Path<(String, String)>,
) -> HttpResponse {
    let (name, version) = path.into_inner();
    let (outcome, follow_up) = download(name, version, state.collaborators()).await;

    let response = render(
        &request,
        outcome,
        RenderKind::Redirect,
        state.collaborators().metrics(),
    );

    // Download accounting runs after the redirect is on the wire; a failure
    // there is logged by the hook and never reaches this client.
    if let Some(follow_up) = follow_up {
        tokio::spawn(follow_up);
    }

    response
}

#[tracing::instrument(name = "List user stars", skip(request, state))]
#[get("/users/{login}/stars")]
pub async fn user_stars(
    request: HttpRequest,
    state: Data<AppState>,
    login: Path<String>,
) -> HttpResponse {
    let outcome = list_user_stars(login.into_inner(), state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}
