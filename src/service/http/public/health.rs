use crate::prelude::{render, AppState, Outcome, RenderKind};
use actix_web::web::Data;
use actix_web::{get, HttpRequest, HttpResponse};
use serde_json::json;

#[get("/health_check")]
pub async fn health_check(request: HttpRequest, state: Data<AppState>) -> HttpResponse {
    render(
        &request,
        Outcome::success(json!({"message": "I'm alive!"})),
        RenderKind::Json,
        state.collaborators().metrics(),
    )
}

const LANDING: &str = "<!doctype html>\
<html><head><title>registry-api</title></head>\
<body><h1>registry-api</h1>\
<p>Package registry backend. See <code>/api/packages</code>.</p>\
</body></html>";

#[get("/")]
pub async fn landing(request: HttpRequest, state: Data<AppState>) -> HttpResponse {
    render(
        &request,
        Outcome::success(json!(LANDING)),
        RenderKind::Html,
        state.collaborators().metrics(),
    )
}
