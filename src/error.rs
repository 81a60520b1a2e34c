//! Error types for the catalog server

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("{0} is required.")]
  MissingField(&'static str),

  #[error(
    "At least one platform file (file_android, file_windows, file_ios, \
     file_linux) is required for this version."
  )]
  MissingPlatformFile,

  #[error("New App requires Logo and Screenshots.")]
  MissingBranding,

  #[error("Upload Error: too many files ({field}, max {max})")]
  TooManyFiles { field: String, max: usize },

  #[error("Upload Error: unexpected field ({0})")]
  UnknownField(String),

  #[error("Unknown logo shape `{0}`")]
  InvalidLogoShape(String),

  #[error("Upload Error: {0}")]
  Multipart(#[from] axum::extract::multipart::MultipartError),

  #[error("Invalid Credentials")]
  InvalidCredentials,

  #[error("Security Alert: Unauthorized Access Attempt")]
  Unauthorized,

  #[error("App not found")]
  AppNotFound,

  #[error("Unknown platform `{0}`")]
  UnknownPlatform(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Registry document error: {0}")]
  Json(#[from] json::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::MissingField(_)
      | Error::MissingPlatformFile
      | Error::MissingBranding
      | Error::TooManyFiles { .. }
      | Error::UnknownField(_)
      | Error::InvalidLogoShape(_) => StatusCode::BAD_REQUEST,
      Error::Multipart(err) => err.status(),
      Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
      Error::Unauthorized => StatusCode::FORBIDDEN,
      Error::AppNotFound | Error::UnknownPlatform(_) => StatusCode::NOT_FOUND,
      Error::Io(_) | Error::Json(_) | Error::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();

    let message = if status.is_server_error() {
      tracing::error!("Request failed: {self}");
      String::from("Internal Server Error")
    } else {
      self.to_string()
    };

    let body = json::json!({
      "success": false,
      "message": message,
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validation_is_client_error() {
    assert_eq!(Error::MissingPlatformFile.status(), StatusCode::BAD_REQUEST);
    assert_eq!(Error::MissingBranding.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      Error::MissingField("Name").to_string(),
      "Name is required."
    );
  }

  #[test]
  fn test_auth_errors_are_distinct() {
    assert_eq!(Error::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(Error::Unauthorized.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn test_internal_detail_not_leaked() {
    let err = Error::Internal(String::from("disk on fire at /srv/uploads"));
    let res = err.into_response();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("Internal Server Error"));
    assert!(!body.contains("/srv/uploads"));
  }
}
