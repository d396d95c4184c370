use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Closed classification table for failed outcomes.
///
/// Handlers and procedures never pick HTTP status codes directly; they tag
/// the outcome with one of these kinds and the renderer resolves the status
/// and default message from this table. Anything unrecognized falls back to
/// `ServerError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ServerError,
    NotSupported,
    Unauthorized,
    BadRepo,
    PackageExists,
    BadVersion,
    BadPackageName,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::NotSupported => StatusCode::NOT_IMPLEMENTED,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::BadRepo => StatusCode::BAD_REQUEST,
            ErrorKind::PackageExists => StatusCode::CONFLICT,
            ErrorKind::BadVersion => StatusCode::BAD_REQUEST,
            ErrorKind::BadPackageName => StatusCode::BAD_REQUEST,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Not Found",
            ErrorKind::ServerError => "Application Error",
            ErrorKind::NotSupported => "Not supported",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::BadRepo => "That repo does not exist, or is inaccessible",
            ErrorKind::PackageExists => "A Package by that name already exists",
            ErrorKind::BadVersion => "Version provided is invalid",
            ErrorKind::BadPackageName => "Package name is invalid",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::ServerError => "server_error",
            ErrorKind::NotSupported => "not_supported",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::BadRepo => "bad_repo",
            ErrorKind::PackageExists => "package_exists",
            ErrorKind::BadVersion => "bad_version",
            ErrorKind::BadPackageName => "bad_package_name",
        };

        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownKind;

impl FromStr for ErrorKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "not_found" => Ok(ErrorKind::NotFound),
            "server_error" => Ok(ErrorKind::ServerError),
            "not_supported" => Ok(ErrorKind::NotSupported),
            "unauthorized" => Ok(ErrorKind::Unauthorized),
            "bad_repo" => Ok(ErrorKind::BadRepo),
            "package_exists" => Ok(ErrorKind::PackageExists),
            "bad_version" => Ok(ErrorKind::BadVersion),
            "bad_package_name" => Ok(ErrorKind::BadPackageName),
            _ => Err(UnknownKind),
        }
    }
}
