//! Registry persistence behind a swappable repository interface

mod file;
mod memory;

pub use file::JsonFile;
pub use memory::Memory;

use crate::{entity::app, prelude::*};

#[async_trait]
pub trait Repository: Send + Sync {
  /// Every app in registry order (most recently created first).
  async fn all(&self) -> Result<Vec<app::Model>>;

  async fn find_by_name(&self, name: &str) -> Result<Option<app::Model>> {
    Ok(self.all().await?.into_iter().find(|app| app.is_named(name)))
  }

  async fn find_by_id(&self, id: &str) -> Result<Option<app::Model>> {
    Ok(self.all().await?.into_iter().find(|app| app.id == id))
  }

  /// Replace the app with the same id, or insert it at the front.
  async fn upsert(&self, app: app::Model) -> Result<()>;
}

fn upsert_into(apps: &mut Vec<app::Model>, app: app::Model) {
  match apps.iter_mut().find(|old| old.id == app.id) {
    Some(old) => *old = app,
    None => apps.insert(0, app),
  }
}
