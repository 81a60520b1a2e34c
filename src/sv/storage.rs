//! Upload storage - files land under `<root>/<slug>/<purpose>/`

use std::{
  borrow::Cow,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use axum::body::Bytes;
use futures::future;
use tokio::{fs, io::AsyncWriteExt};

use crate::prelude::*;

/// One file received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name: String,
  pub bytes: Bytes,
}

impl Upload {
  pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
    Self { file_name: file_name.into(), bytes: bytes.into() }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
  Icons,
  Screenshots,
  App,
}

impl Purpose {
  pub fn dir(self) -> &'static str {
    match self {
      Purpose::Icons => "icons",
      Purpose::Screenshots => "screenshots",
      Purpose::App => "app",
    }
  }
}

#[derive(Debug, Clone)]
pub struct Stored {
  pub path: PathBuf,
  pub url: String,
  pub size: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Storage<'a> {
  root: &'a Path,
  public_url: &'a str,
}

impl<'a> Storage<'a> {
  pub fn new(root: &'a Path, public_url: &'a str) -> Self {
    Self { root, public_url: public_url.trim_end_matches('/') }
  }

  /// Public URL for a file below the storage root.
  pub fn url(&self, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(self.root).map_err(|_| {
      Error::Internal(format!(
        "{} is outside the uploads directory",
        path.display()
      ))
    })?;

    let parts: Vec<Cow<'_, str>> = relative
      .components()
      .map(|component| component.as_os_str().to_string_lossy())
      .collect();

    Ok(format!("{}/uploads/{}", self.public_url, parts.join("/")))
  }

  pub async fn store(
    &self,
    slug: &str,
    purpose: Purpose,
    upload: &Upload,
  ) -> Result<Stored> {
    let dir = self.root.join(slug).join(purpose.dir());
    fs::create_dir_all(&dir).await?;

    let mut suffix = Utc::now().timestamp_millis();
    loop {
      let path = dir.join(utils::stored_name(&upload.file_name, suffix));

      let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
      {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
          suffix += 1;
          continue;
        }
        Err(err) => return Err(err.into()),
      };

      let written = async {
        file.write_all(&upload.bytes).await?;
        file.flush().await
      };
      if let Err(err) = written.await {
        drop(file);
        let _ = fs::remove_file(&path).await;
        return Err(err.into());
      }

      return Ok(Stored {
        url: self.url(&path)?,
        path,
        size: upload.bytes.len() as u64,
      });
    }
  }

  /// Stores every upload concurrently, in input order.
  ///
  /// If any write fails the ones that succeeded are removed again.
  pub async fn store_all(
    &self,
    slug: &str,
    uploads: &[(Purpose, &Upload)],
  ) -> Result<Vec<Stored>> {
    let results = future::join_all(
      uploads.iter().map(|&(purpose, upload)| self.store(slug, purpose, upload)),
    )
    .await;

    let mut stored = Vec::with_capacity(results.len());
    let mut failure = None;
    for result in results {
      match result {
        Ok(file) => stored.push(file),
        Err(err) if failure.is_none() => failure = Some(err),
        Err(err) => warn!("Additional upload failure: {err}"),
      }
    }

    if let Some(err) = failure {
      self.discard(&stored).await;
      return Err(err);
    }
    Ok(stored)
  }

  pub async fn discard(&self, stored: &[Stored]) {
    for file in stored {
      if let Err(err) = fs::remove_file(&file.path).await {
        warn!("Failed to remove orphaned upload {}: {err}", file.path.display());
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn test_url_mirrors_layout() {
    let root = Path::new("/srv/uploads");
    let storage = Storage::new(root, "http://localhost:5000/");

    let url = storage
      .url(&root.join("my_app_").join("icons").join("logo-17.png"))
      .unwrap();

    assert_eq!(url, "http://localhost:5000/uploads/my_app_/icons/logo-17.png");
    assert!(storage.url(Path::new("/etc/passwd")).is_err());
  }

  #[tokio::test]
  async fn test_store_creates_directories() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path(), "http://cdn");

    let stored = storage
      .store("foo", Purpose::Screenshots, &Upload::new("shot.png", &b"png"[..]))
      .await
      .unwrap();

    assert!(stored.path.starts_with(dir.path().join("foo").join("screenshots")));
    assert!(stored.url.starts_with("http://cdn/uploads/foo/screenshots/shot-"));
    assert!(stored.url.ends_with(".png"));
    assert_eq!(stored.size, 3);
    assert_eq!(std::fs::read(&stored.path).unwrap(), b"png");
  }

  #[tokio::test]
  async fn test_same_name_never_overwrites() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path(), "http://cdn");
    let a = Upload::new("shot.png", &b"a"[..]);
    let b = Upload::new("shot.png", &b"b"[..]);

    let stored = storage
      .store_all("foo", &[(Purpose::Screenshots, &a), (Purpose::Screenshots, &b)])
      .await
      .unwrap();

    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].path, stored[1].path);
    assert_eq!(std::fs::read(&stored[0].path).unwrap(), b"a");
    assert_eq!(std::fs::read(&stored[1].path).unwrap(), b"b");
  }

  #[tokio::test]
  async fn test_failed_batch_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path(), "http://cdn");

    // a file where the `icons` directory should be
    std::fs::create_dir_all(dir.path().join("foo")).unwrap();
    std::fs::write(dir.path().join("foo").join("icons"), b"").unwrap();

    let logo = Upload::new("logo.png", &b"l"[..]);
    let apk = Upload::new("game.apk", &b"apk"[..]);
    let result = storage
      .store_all("foo", &[(Purpose::Icons, &logo), (Purpose::App, &apk)])
      .await;

    assert!(matches!(result, Err(Error::Io(_))));
    let left = std::fs::read_dir(dir.path().join("foo").join("app"))
      .map(|entries| entries.count())
      .unwrap_or(0);
    assert_eq!(left, 0);
  }
}
