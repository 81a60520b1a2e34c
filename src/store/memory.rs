use tokio::sync::RwLock;

use super::Repository;
use crate::{entity::app, prelude::*};

#[derive(Default)]
pub struct Memory {
  apps: RwLock<Vec<app::Model>>,
}

#[async_trait]
impl Repository for Memory {
  async fn all(&self) -> Result<Vec<app::Model>> {
    Ok(self.apps.read().await.clone())
  }

  async fn upsert(&self, app: app::Model) -> Result<()> {
    super::upsert_into(&mut *self.apps.write().await, app);
    Ok(())
  }
}
