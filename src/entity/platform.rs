use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Binary category a release file is published for.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
  Android,
  Windows,
  Ios,
  Linux,
}

impl Platform {
  pub const ALL: [Platform; 4] =
    [Platform::Android, Platform::Windows, Platform::Ios, Platform::Linux];

  pub fn as_str(self) -> &'static str {
    match self {
      Platform::Android => "android",
      Platform::Windows => "windows",
      Platform::Ios => "ios",
      Platform::Linux => "linux",
    }
  }

  /// Multipart field carrying this platform's binary.
  pub fn field(self) -> &'static str {
    match self {
      Platform::Android => "file_android",
      Platform::Windows => "file_windows",
      Platform::Ios => "file_ios",
      Platform::Linux => "file_linux",
    }
  }

  pub fn from_field(field: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|platform| platform.field() == field)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Platform {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|platform| platform.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::UnknownPlatform(s.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fields() {
    assert_eq!(Platform::from_field("file_ios"), Some(Platform::Ios));
    assert_eq!(Platform::from_field("appFile"), None);
    assert_eq!(Platform::Windows.field(), "file_windows");
  }

  #[test]
  fn test_parse() {
    assert_eq!("Linux".parse::<Platform>().unwrap(), Platform::Linux);
    assert!("macos".parse::<Platform>().is_err());
  }
}
