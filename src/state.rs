use std::{env, path::PathBuf};

use crate::{
  prelude::*,
  store::{JsonFile, Repository},
  sv,
};

/// Bearer token -> expiry.
pub type Sessions = DashMap<String, DateTime>;

/// Per-app mutation locks keyed by lowercase name.
pub type Locks = DashMap<String, Arc<tokio::sync::Mutex<()>>>;

#[derive(Debug, Clone)]
pub struct Config {
  pub port: u16,
  pub uploads_directory: PathBuf,
  pub registry_file: PathBuf,
  /// Base for derived download URLs, without trailing slash
  pub public_url: String,
  pub admin_password: String,
  pub session_lifetime: Duration,
  pub max_upload_size: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      port: 5000,
      uploads_directory: PathBuf::from("./uploads"),
      registry_file: PathBuf::from("./apps.json"),
      public_url: String::from("http://localhost:5000"),
      admin_password: String::new(),

      session_lifetime: Duration::from_secs(12 * 3600),
      max_upload_size: 512 * 1024 * 1024,
    }
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let mut config = Self::default();

    if let Ok(port) = env::var("PORT") {
      config.port = port.parse().context("Invalid PORT")?;
    }
    if let Ok(dir) = env::var("UPLOADS_DIR") {
      config.uploads_directory = dir.into();
    }
    if let Ok(file) = env::var("REGISTRY_FILE") {
      config.registry_file = file.into();
    }
    config.public_url = env::var("PUBLIC_URL")
      .unwrap_or_else(|_| format!("http://localhost:{}", config.port))
      .trim_end_matches('/')
      .to_string();
    if let Ok(ttl) = env::var("SESSION_TTL") {
      config.session_lifetime =
        humantime::parse_duration(&ttl).context("Invalid SESSION_TTL")?;
    }
    if let Ok(size) = env::var("MAX_UPLOAD_SIZE") {
      config.max_upload_size =
        size.parse().context("Invalid MAX_UPLOAD_SIZE")?;
    }

    config.admin_password =
      env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD not set")?;
    anyhow::ensure!(
      !config.admin_password.is_empty(),
      "ADMIN_PASSWORD must not be empty"
    );

    Ok(config)
  }
}

pub struct Services<'a> {
  pub auth: sv::Auth<'a>,
  pub registry: sv::Registry<'a>,
}

pub struct AppState {
  pub config: Config,
  pub repo: Arc<dyn Repository>,
  pub sessions: Sessions,
  locks: Locks,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Opening registry {}...", config.registry_file.display());
    let repo = JsonFile::open(&config.registry_file)
      .await
      .with_context(|| {
        format!("Failed to open registry {}", config.registry_file.display())
      })?;

    Self::with_repo(config, Arc::new(repo)).await
  }

  pub async fn with_repo(
    config: Config,
    repo: Arc<dyn Repository>,
  ) -> anyhow::Result<Self> {
    tokio::fs::create_dir_all(&config.uploads_directory)
      .await
      .with_context(|| {
        format!(
          "Failed to create uploads directory {}",
          config.uploads_directory.display()
        )
      })?;

    Ok(Self { config, repo, sessions: DashMap::new(), locks: DashMap::new() })
  }

  pub fn sv(&self) -> Services<'_> {
    let storage =
      sv::Storage::new(&self.config.uploads_directory, &self.config.public_url);

    Services {
      auth: sv::Auth::new(&self.sessions, &self.config),
      registry: sv::Registry::new(self.repo.as_ref(), storage, &self.locks),
    }
  }
}

#[cfg(test)]
pub async fn test_state() -> (tempfile::TempDir, Arc<AppState>) {
  let dir = tempfile::TempDir::new().unwrap();
  let config = Config {
    uploads_directory: dir.path().join("uploads"),
    registry_file: dir.path().join("apps.json"),
    admin_password: String::from("822010"),
    ..Default::default()
  };

  let repo = Arc::new(crate::store::Memory::default());
  let app = AppState::with_repo(config, repo).await.unwrap();
  (dir, Arc::new(app))
}
