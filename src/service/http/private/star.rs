use crate::prelude::{bearer_token, render, star_package, unstar_package, AppState, RenderKind};
use actix_web::web::{Data, Path};
use actix_web::{delete, post, HttpRequest, HttpResponse};

#[tracing::instrument(name = "Star package", skip(request, state))]
#[post("/packages/{name}/star")]
pub async fn star(
    request: HttpRequest,
    state: Data<AppState>,
    name: Path<String>,
) -> HttpResponse {
    let token = bearer_token(&request);
    let outcome = star_package(token, name.into_inner(), state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}

#[tracing::instrument(name = "Unstar package", skip(request, state))]
#[delete("/packages/{name}/star")]
pub async fn unstar(
    request: HttpRequest,
    state: Data<AppState>,
    name: Path<String>,
) -> HttpResponse {
    let token = bearer_token(&request);
    let outcome = unstar_package(token, name.into_inner(), state.collaborators()).await;

    render(
        &request,
        outcome,
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}
