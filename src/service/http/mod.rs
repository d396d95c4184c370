mod private;
mod public;
mod render;

pub use private::*;
pub use public::*;
pub use render::*;

use actix_web::HttpRequest;

/// Parameter extraction, not authentication: pulls the bearer token out of
/// the Authorization header as a plain value. Whether the token is any good
/// is the auth collaborator's call, made inside the procedure.
pub fn bearer_token(request: &HttpRequest) -> Option<String> {
    request
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .map(|header| header.strip_prefix("Bearer ").unwrap_or(header))
        .map(|token| token.to_string())
        .filter(|token| !token.is_empty())
}
