use crate::algebra::Metrics;
use crate::domain::{ErrorKind, Outcome};
use crate::PREFIX;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};
use serde_json::{json, Value};
use tracing::warn;

/// Response strategy declared by each endpoint. A single outcome type plus a
/// render kind replaces per-shape response subclassing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Json,
    Html,
    Redirect,
    PaginatedJson,
}

/// Deterministically turns a terminal outcome into the wire response. This
/// is the single consumption point of an outcome: the failure taxonomy is
/// resolved here, the call trace goes to the log here, and the structured
/// access-log line is written here, exactly once, after the response is
/// built. Must not panic for any well-formed outcome.
pub fn render(
    request: &HttpRequest,
    outcome: Outcome,
    kind: RenderKind,
    metrics: &Metrics,
) -> HttpResponse {
    let response = if outcome.ok() {
        render_success(request, &outcome, kind)
    } else {
        render_failure(&outcome, metrics)
    };

    // Health probes run at TRACE like their root span, so they stay out of
    // the INFO access log entirely.
    if demoted_access_log(request.path()) {
        tracing::trace!(
            method = %request.method(),
            path = %request.path(),
            status = response.status().as_u16(),
            ok = outcome.ok(),
            "request completed"
        );
    } else {
        tracing::info!(
            method = %request.method(),
            path = %request.path(),
            status = response.status().as_u16(),
            ok = outcome.ok(),
            "request completed"
        );
    }

    response
}

fn demoted_access_log(path: &str) -> bool {
    path == PREFIX.to_owned() + "/health_check"
}

fn render_failure(outcome: &Outcome, metrics: &Metrics) -> HttpResponse {
    let kind = outcome
        .short()
        .or_else(|| outcome.nested_short())
        .unwrap_or(ErrorKind::ServerError);

    let message = if outcome.message().is_empty() {
        kind.default_message().to_string()
    } else {
        format!("{}: {}", kind.default_message(), outcome.message())
    };

    // Full outcome (trace included) goes to the log sink only; the client
    // sees nothing but the resolved message.
    warn!(
        short = %kind,
        outcome = %serde_json::to_string(outcome).unwrap_or_default(),
        "request failed"
    );
    metrics.add_failed_request(1);

    HttpResponseBuilder::new(kind.status()).json(json!({ "message": message }))
}

fn render_success(request: &HttpRequest, outcome: &Outcome, kind: RenderKind) -> HttpResponse {
    let status =
        StatusCode::from_u16(outcome.success_status()).unwrap_or(StatusCode::OK);

    // The literal `false` signals "operation succeeded, nothing to return".
    if outcome.content() == &Value::Bool(false) {
        return HttpResponseBuilder::new(status).finish();
    }

    match kind {
        RenderKind::Json => json_body(status, outcome.content()),
        RenderKind::Html => {
            let body = match outcome.content().as_str() {
                Some(html) => html.to_string(),
                None => {
                    warn!("HTML render got non-string content");
                    String::new()
                }
            };
            HttpResponseBuilder::new(status)
                .content_type("text/html; charset=utf-8")
                .body(body)
        }
        RenderKind::Redirect => {
            let location = outcome.content().as_str().unwrap_or_default().to_string();
            let status = if status.is_redirection() {
                status
            } else {
                StatusCode::FOUND
            };
            HttpResponseBuilder::new(status)
                .insert_header(("Location", location))
                .finish()
        }
        RenderKind::PaginatedJson => {
            let Some(page) = outcome.page() else {
                warn!("Paginated render got an outcome without page info");
                return json_body(status, outcome.content());
            };

            let last = page.last_page();
            let path = request.path();
            let mut links = vec![format!(
                "<{}?page={}&limit={}>; rel=\"self\"",
                path, page.page, page.limit
            )];
            if page.page < last {
                links.push(format!(
                    "<{}?page={}&limit={}>; rel=\"next\"",
                    path,
                    page.page + 1,
                    page.limit
                ));
            }
            links.push(format!(
                "<{}?page={}&limit={}>; rel=\"last\"",
                path, last, page.limit
            ));

            HttpResponseBuilder::new(status)
                .insert_header(("Link", links.join(", ")))
                .insert_header(("Query-Total", page.total.to_string()))
                .insert_header(("Query-Limit", page.limit.to_string()))
                .json(outcome.content())
        }
    }
}

fn json_body(status: StatusCode, content: &Value) -> HttpResponse {
    // A success with no content at all is a procedure bug; degrade to an
    // empty object rather than crash.
    if content.is_null() {
        warn!("Success outcome rendered with null content");
        return HttpResponseBuilder::new(status).json(json!({}));
    }

    HttpResponseBuilder::new(status).json(content)
}
