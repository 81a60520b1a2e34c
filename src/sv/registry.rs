//! Registry service - app catalog and versioned release ingestion

use std::collections::BTreeMap;

use uuid::Uuid;

use super::storage::{Purpose, Storage, Stored, Upload};
use crate::{
  entity::{LogoShape, Platform, app, version},
  prelude::*,
  state::Locks,
  store::Repository,
};

pub const MAX_SCREENSHOTS: usize = 5;

/// One upload request, already decoded from the wire.
///
/// `None`/empty fields leave the stored value untouched on update, except
/// that a non-empty `screenshots` replaces the whole set.
#[derive(Debug, Default)]
pub struct Release {
  pub name: String,
  pub version: String,
  pub description: Option<String>,
  pub logo_shape: Option<LogoShape>,
  pub logo: Option<Upload>,
  pub screenshots: Vec<Upload>,
  pub binaries: BTreeMap<Platform, Upload>,
}

#[derive(Debug)]
pub struct Ingested {
  pub app: app::Model,
  pub created: bool,
}

/// Public URLs of the files stored for one release.
struct Assets {
  logo: Option<String>,
  screenshots: Vec<String>,
  files: version::Files,
  size: u64,
  stored: Vec<Stored>,
}

pub struct Registry<'a> {
  repo: &'a dyn Repository,
  storage: Storage<'a>,
  locks: &'a Locks,
}

impl<'a> Registry<'a> {
  pub fn new(
    repo: &'a dyn Repository,
    storage: Storage<'a>,
    locks: &'a Locks,
  ) -> Self {
    Self { repo, storage, locks }
  }

  /// Every app, most recently touched first.
  pub async fn list(&self) -> Result<Vec<app::Model>> {
    let mut apps = self.repo.all().await?;
    apps.sort_by_key(|app| std::cmp::Reverse(app.last_touched()));
    Ok(apps)
  }

  pub async fn by_id(&self, id: &str) -> Result<app::Model> {
    self.repo.find_by_id(id).await?.ok_or(Error::AppNotFound)
  }

  pub async fn latest(
    &self,
    id: &str,
    platform: Platform,
  ) -> Result<version::Model> {
    self.by_id(id).await?.latest(platform).cloned().ok_or(Error::AppNotFound)
  }

  pub async fn ingest(&self, release: Release) -> Result<Ingested> {
    let name = release.name.trim();
    if name.is_empty() {
      return Err(Error::MissingField("Name"));
    }
    let tag = release.version.trim();
    if tag.is_empty() {
      return Err(Error::MissingField("Version"));
    }

    let lock = self.locks.entry(name.to_lowercase()).or_default().clone();
    let _guard = lock.lock().await;

    let existing = self.repo.find_by_name(name).await?;
    check(&release, existing.as_ref(), tag)?;

    let assets = self.store_assets(&utils::slug(name), &release).await?;
    let ingested = match apply(existing, name, tag, &release, &assets) {
      Ok(ingested) => ingested,
      Err(err) => {
        self.storage.discard(&assets.stored).await;
        return Err(err);
      }
    };

    if let Err(err) = self.repo.upsert(ingested.app.clone()).await {
      self.storage.discard(&assets.stored).await;
      return Err(err);
    }

    info!(
      "{} `{}` version {} ({} files)",
      if ingested.created { "Created" } else { "Updated" },
      ingested.app.name,
      tag,
      assets.stored.len(),
    );
    Ok(ingested)
  }

  async fn store_assets(&self, slug: &str, release: &Release) -> Result<Assets> {
    let mut uploads = Vec::new();
    if let Some(logo) = &release.logo {
      uploads.push((Purpose::Icons, logo));
    }
    for shot in &release.screenshots {
      uploads.push((Purpose::Screenshots, shot));
    }
    for binary in release.binaries.values() {
      uploads.push((Purpose::App, binary));
    }

    let stored = self.storage.store_all(slug, &uploads).await?;

    let mut files = stored.iter();
    let logo = match release.logo {
      Some(_) => files.next().map(|file| file.url.clone()),
      None => None,
    };
    let screenshots = files
      .by_ref()
      .take(release.screenshots.len())
      .map(|file| file.url.clone())
      .collect();

    let mut binaries = version::Files::default();
    let mut size = 0;
    for (&platform, file) in release.binaries.keys().zip(files) {
      binaries.set(platform, file.url.clone());
      size += file.size;
    }

    Ok(Assets { logo, screenshots, files: binaries, size, stored })
  }
}

/// Rejects a release before any of its files touch the disk.
fn check(
  release: &Release,
  existing: Option<&app::Model>,
  tag: &str,
) -> Result<()> {
  if release.binaries.is_empty() {
    let inherited = existing
      .and_then(|app| app.version(tag))
      .is_some_and(|version| !version.files.is_empty());
    if !inherited {
      return Err(Error::MissingPlatformFile);
    }
  }

  if existing.is_none()
    && (release.logo.is_none() || release.screenshots.is_empty())
  {
    return Err(Error::MissingBranding);
  }

  if release.screenshots.len() > MAX_SCREENSHOTS {
    return Err(Error::TooManyFiles {
      field: String::from("screenshot"),
      max: MAX_SCREENSHOTS,
    });
  }

  Ok(())
}

fn apply(
  existing: Option<app::Model>,
  name: &str,
  tag: &str,
  release: &Release,
  assets: &Assets,
) -> Result<Ingested> {
  let now = Utc::now();

  let Some(mut app) = existing else {
    let app = app::Model {
      id: Uuid::new_v4().to_string(),
      name: name.to_owned(),
      description: release
        .description
        .clone()
        .unwrap_or_else(|| app::DEFAULT_DESCRIPTION.to_owned()),
      logo_url: assets.logo.clone().ok_or(Error::MissingBranding)?,
      logo_shape: release.logo_shape.unwrap_or_default(),
      screenshots: assets.screenshots.clone(),
      versions: vec![version::Model {
        version: tag.to_owned(),
        date: now,
        files: assets.files.clone(),
        size: assets.size,
      }],
    };
    return Ok(Ingested { app, created: true });
  };

  if let Some(description) = &release.description {
    app.description = description.clone();
  }
  if let Some(shape) = release.logo_shape {
    app.logo_shape = shape;
  }
  if let Some(logo) = &assets.logo {
    app.logo_url = logo.clone();
  }
  if !assets.screenshots.is_empty() {
    app.screenshots = assets.screenshots.clone();
  }

  match app.versions.iter_mut().find(|version| version.version == tag) {
    Some(version) => {
      version.files.merge(&assets.files);
      version.date = now;
    }
    None => app.versions.insert(0, version::Model {
      version: tag.to_owned(),
      date: now,
      files: assets.files.clone(),
      size: assets.size,
    }),
  }

  Ok(Ingested { app, created: false })
}
