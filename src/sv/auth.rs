use uuid::Uuid;

use crate::{
  prelude::*,
  state::{Config, Sessions},
};

/// Shared-secret login issuing expiring bearer tokens.
pub struct Auth<'a> {
  sessions: &'a Sessions,
  config: &'a Config,
}

impl<'a> Auth<'a> {
  pub fn new(sessions: &'a Sessions, config: &'a Config) -> Self {
    Self { sessions, config }
  }

  pub fn login(&self, password: &str) -> Result<String> {
    let secret = self.config.admin_password.as_bytes();
    if secret.is_empty() || !utils::constant_eq(password.as_bytes(), secret) {
      warn!("Rejected admin login attempt");
      return Err(Error::InvalidCredentials);
    }

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + self.config.session_lifetime;
    self.sessions.insert(token.clone(), expires_at);

    info!("Admin session opened, expires at {expires_at}");
    Ok(token)
  }

  pub fn verify(&self, token: &str) -> Result<()> {
    match self.sessions.get(token) {
      Some(expires_at) if *expires_at > Utc::now() => Ok(()),
      _ => Err(Error::Unauthorized),
    }
  }

  /// Drops expired sessions, returning how many were removed.
  pub fn gc(&self) -> usize {
    let now = Utc::now();
    let before = self.sessions.len();
    self.sessions.retain(|_, expires_at| *expires_at > now);
    before - self.sessions.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(password: &str) -> Config {
    Config { admin_password: password.into(), ..Default::default() }
  }

  #[test]
  fn test_login_and_verify() {
    let sessions = Sessions::new();
    let config = config("822010");
    let auth = Auth::new(&sessions, &config);

    let token = auth.login("822010").unwrap();

    assert!(auth.verify(&token).is_ok());
    assert!(matches!(auth.verify("forged"), Err(Error::Unauthorized)));
  }

  #[test]
  fn test_wrong_password() {
    let sessions = Sessions::new();
    let config = config("822010");
    let auth = Auth::new(&sessions, &config);

    assert!(matches!(auth.login("000000"), Err(Error::InvalidCredentials)));
    assert!(sessions.is_empty());
  }

  #[test]
  fn test_empty_secret_never_matches() {
    let sessions = Sessions::new();
    let config = config("");
    let auth = Auth::new(&sessions, &config);

    assert!(matches!(auth.login(""), Err(Error::InvalidCredentials)));
  }

  #[test]
  fn test_gc_drops_expired() {
    let sessions = Sessions::new();
    let config = config("pw");
    let auth = Auth::new(&sessions, &config);

    let live = auth.login("pw").unwrap();
    sessions.insert("stale".into(), Utc::now() - Duration::from_secs(1));

    assert!(matches!(auth.verify("stale"), Err(Error::Unauthorized)));
    assert_eq!(auth.gc(), 1);
    assert!(auth.verify(&live).is_ok());
  }
}
