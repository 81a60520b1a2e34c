use crate::{plugins::Plugin, prelude::*, state::AppState};

/// Sweeps expired admin sessions once a minute.
pub struct Janitor;

#[async_trait]
impl Plugin for Janitor {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut interval = time::interval(Duration::from_secs(60));
    loop {
      interval.tick().await;

      let dropped = app.sv().auth.gc();
      if dropped > 0 {
        debug!("Dropped {dropped} expired sessions");
      }
    }
  }
}
