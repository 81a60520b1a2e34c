//! Flat JSON document holding the whole registry

use std::path::PathBuf;

use tokio::{fs, sync::RwLock};

use super::Repository;
use crate::{entity::app, prelude::*};

/// Registry persisted as a single JSON array, rewritten on every change.
///
/// The document is read once on open and served from memory afterwards.
pub struct JsonFile {
  path: PathBuf,
  apps: RwLock<Vec<app::Model>>,
}

impl JsonFile {
  pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();

    let apps = match fs::read(&path).await {
      Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
      Ok(bytes) => json::from_slice(&bytes)?,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        if let Some(parent) = path.parent()
          && !parent.as_os_str().is_empty()
        {
          fs::create_dir_all(parent).await?;
        }
        fs::write(&path, b"[]").await?;
        info!("Created empty registry at {}", path.display());
        Vec::new()
      }
      Err(err) => return Err(err.into()),
    };

    debug!("Loaded {} apps from {}", apps.len(), path.display());
    Ok(Self { path, apps: RwLock::new(apps) })
  }

  async fn persist(&self, apps: &[app::Model]) -> Result<()> {
    let bytes = json::to_vec_pretty(apps)?;

    let mut tmp = self.path.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, &bytes).await?;
    if let Err(err) = fs::rename(&tmp, &self.path).await {
      let _ = fs::remove_file(&tmp).await;
      return Err(err.into());
    }
    Ok(())
  }
}

#[async_trait]
impl Repository for JsonFile {
  async fn all(&self) -> Result<Vec<app::Model>> {
    Ok(self.apps.read().await.clone())
  }

  async fn upsert(&self, app: app::Model) -> Result<()> {
    let mut apps = self.apps.write().await;

    let mut next = apps.clone();
    super::upsert_into(&mut next, app);
    self.persist(&next).await?;

    *apps = next;
    Ok(())
  }
}
