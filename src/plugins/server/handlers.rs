use axum::{
  Json,
  extract::{Multipart, Path, Request, State},
  http::{StatusCode, header},
  middleware::Next,
  response::Response,
};
use serde::{Deserialize, Serialize};

use super::form::UploadForm;
use crate::{
  entity::{Platform, app, version},
  prelude::*,
  state::AppState,
};

pub async fn health() -> &'static str {
  "OK"
}

#[derive(Debug, Deserialize)]
pub struct LoginReq {
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRes {
  pub success: bool,
  pub token: String,
}

pub async fn login(
  State(app): State<Arc<AppState>>,
  Json(req): Json<LoginReq>,
) -> Result<Json<LoginRes>> {
  let token = app.sv().auth.login(&req.password)?;
  Ok(Json(LoginRes { success: true, token }))
}

/// Rejects requests without a live session token.
pub async fn require_auth(
  State(app): State<Arc<AppState>>,
  request: Request,
  next: Next,
) -> Result<Response> {
  let token = request
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
    .unwrap_or_default();

  app.sv().auth.verify(token)?;
  Ok(next.run(request).await)
}

pub async fn list(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Vec<app::View>>> {
  let apps = app.sv().registry.list().await?;
  Ok(Json(apps.into_iter().map(app::View::from).collect()))
}

pub async fn show(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<app::View>> {
  Ok(Json(app.sv().registry.by_id(&id).await?.into()))
}

pub async fn latest(
  State(app): State<Arc<AppState>>,
  Path((id, platform)): Path<(String, String)>,
) -> Result<Json<version::Model>> {
  let platform: Platform = platform.parse()?;
  Ok(Json(app.sv().registry.latest(&id, platform).await?))
}

#[derive(Debug, Serialize)]
pub struct UploadRes {
  pub message: &'static str,
  pub app: app::View,
}

pub async fn upload(
  State(app): State<Arc<AppState>>,
  multipart: Multipart,
) -> Result<(StatusCode, Json<UploadRes>)> {
  let release = UploadForm::read(multipart).await?.into_release()?;
  let ingested = app.sv().registry.ingest(release).await?;

  let status = if ingested.created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((
    status,
    Json(UploadRes {
      message: "Deployment Successful",
      app: ingested.app.into(),
    }),
  ))
}
