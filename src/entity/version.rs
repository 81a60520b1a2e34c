//! Version entity - one named release of an app with per-platform downloads

use serde::{Deserialize, Serialize};

use super::Platform;
use crate::prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
  pub version: String,
  /// Time of the last write to this entry
  pub date: DateTime,
  pub files: Files,
  /// Bytes uploaded for this entry when it was created
  #[serde(default)]
  pub size: u64,
}

/// Public download URL per platform, `null` when not published.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Files {
  #[serde(default)]
  pub android: Option<String>,
  #[serde(default)]
  pub windows: Option<String>,
  #[serde(default)]
  pub ios: Option<String>,
  #[serde(default)]
  pub linux: Option<String>,
}

impl Files {
  pub fn get(&self, platform: Platform) -> Option<&str> {
    match platform {
      Platform::Android => self.android.as_deref(),
      Platform::Windows => self.windows.as_deref(),
      Platform::Ios => self.ios.as_deref(),
      Platform::Linux => self.linux.as_deref(),
    }
  }

  pub fn set(&mut self, platform: Platform, url: String) {
    let slot = match platform {
      Platform::Android => &mut self.android,
      Platform::Windows => &mut self.windows,
      Platform::Ios => &mut self.ios,
      Platform::Linux => &mut self.linux,
    };
    *slot = Some(url);
  }

  pub fn is_empty(&self) -> bool {
    Platform::ALL.into_iter().all(|platform| self.get(platform).is_none())
  }

  pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
    Platform::ALL.into_iter().filter(|&platform| self.get(platform).is_some())
  }

  /// Field-wise union where present values in `newer` win.
  pub fn merge(&mut self, newer: &Files) {
    for platform in newer.platforms() {
      if let Some(url) = newer.get(platform) {
        self.set(platform, url.to_owned());
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_merge_keeps_absent_fields() {
    let mut old = Files {
      android: Some("a1".into()),
      windows: Some("w1".into()),
      ..Default::default()
    };
    let new = Files {
      windows: Some("w2".into()),
      linux: Some("l2".into()),
      ..Default::default()
    };

    old.merge(&new);

    assert_eq!(old.android.as_deref(), Some("a1"));
    assert_eq!(old.windows.as_deref(), Some("w2"));
    assert_eq!(old.ios, None);
    assert_eq!(old.linux.as_deref(), Some("l2"));
  }

  #[test]
  fn test_missing_platforms_serialize_as_null() {
    let files = Files { ios: Some("i".into()), ..Default::default() };
    let value = json::to_value(&files).unwrap();

    assert_eq!(value["ios"], "i");
    assert!(value["android"].is_null());
    assert!(value.get("linux").is_some());
  }
}
