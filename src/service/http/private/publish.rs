use crate::prelude::{
    bearer_token, publish_package, publish_version, render, unpublish_package, unpublish_version,
    AppState, RenderKind,
};
use actix_web::web::{Data, Json, Path};
use actix_web::{delete, post, HttpRequest, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishBody {
    pub repository: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBody {
    pub version: String,
    #[serde(default)]
    pub tarball_url: Option<String>,
}

#[tracing::instrument(name = "Publish package", skip(request, state, body))]
#[post("/packages")]
pub async fn create_package(
    request: HttpRequest,
    state: Data<AppState>,
    body: Json<PublishBody>,
) -> HttpResponse {
    let token = bearer_token(&request);
    let (outcome, follow_up) =
        publish_package(token, body.into_inner().repository, state.collaborators()).await;

    let response = render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    );

    if let Some(follow_up) = follow_up {
        tokio::spawn(follow_up);
    }

    response
}

#[tracing::instrument(name = "Publish version", skip(request, state, body))]
#[post("/packages/{name}/versions")]
pub async fn create_version(
    request: HttpRequest,
    state: Data<AppState>,
    name: Path<String>,
    body: Json<VersionBody>,
) -> HttpResponse {
    let token = bearer_token(&request);
    let body = body.into_inner();
    let outcome = publish_version(
        token,
        name.into_inner(),
        body.version,
        body.tarball_url,
        state.collaborators(),
    )
    .await;

    render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}

#[tracing::instrument(name = "Unpublish package", skip(request, state))]
#[delete("/packages/{name}")]
pub async fn delete_package(
    request: HttpRequest,
    state: Data<AppState>,
    name: Path<String>,
) -> HttpResponse {
    let token = bearer_token(&request);
    let outcome = unpublish_package(token, name.into_inner(), state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}

#[tracing::instrument(name = "Unpublish version", skip(request, state))]
#[delete("/packages/{name}/versions/{version}")]
pub async fn delete_version(
    request: HttpRequest,
    state: Data<AppState>,
    path: Path<(String, String)>,
) -> HttpResponse {
    let token = bearer_token(&request);
    let (name, version) = path.into_inner();
    let outcome = unpublish_version(token, name, version, state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}
