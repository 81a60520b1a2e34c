//! App entity - one catalog entry with its release history

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Platform, version};
use crate::prelude::*;

pub const DEFAULT_DESCRIPTION: &str = "No description provided.";

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum LogoShape {
  #[serde(rename = "rounded-none", alias = "square")]
  Square,
  #[default]
  #[serde(rename = "rounded-2xl", alias = "rounded")]
  Rounded,
  #[serde(rename = "rounded-full", alias = "circle", alias = "circular")]
  Circular,
}

impl FromStr for LogoShape {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim() {
      "rounded-none" | "square" => Ok(LogoShape::Square),
      "rounded-2xl" | "rounded" => Ok(LogoShape::Rounded),
      "rounded-full" | "circle" | "circular" => Ok(LogoShape::Circular),
      other => Err(Error::InvalidLogoShape(other.to_owned())),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Record")]
pub struct Model {
  pub id: String,
  pub name: String,
  pub description: String,
  pub logo_url: String,
  pub logo_shape: LogoShape,
  pub screenshots: Vec<String>,
  /// Newest first
  pub versions: Vec<version::Model>,
}

impl Model {
  pub fn is_named(&self, name: &str) -> bool {
    self.name.to_lowercase() == name.to_lowercase()
  }

  pub fn screenshot_url(&self) -> Option<&str> {
    self.screenshots.first().map(String::as_str)
  }

  /// Newest write across the whole release history.
  pub fn last_touched(&self) -> Option<DateTime> {
    self.versions.iter().map(|version| version.date).max()
  }

  pub fn version(&self, tag: &str) -> Option<&version::Model> {
    self.versions.iter().find(|version| version.version == tag)
  }

  /// First entry in history that ships a file for `platform`.
  pub fn latest(&self, platform: Platform) -> Option<&version::Model> {
    self.versions.iter().find(|version| version.files.get(platform).is_some())
  }
}

/// Response shape with the derived fields filled in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
  #[serde(flatten)]
  pub app: Model,
  pub screenshot_url: Option<String>,
  pub date_uploaded: Option<DateTime>,
}

impl From<Model> for View {
  fn from(app: Model) -> Self {
    Self {
      screenshot_url: app.screenshot_url().map(str::to_owned),
      date_uploaded: app.last_touched(),
      app,
    }
  }
}

/// Stored document row, including records written before version history.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Record {
  id: String,
  name: String,
  #[serde(default)]
  description: String,
  #[serde(default)]
  logo_url: String,
  #[serde(default)]
  logo_shape: LogoShape,
  #[serde(default)]
  screenshots: Vec<String>,
  #[serde(default)]
  screenshot_url: Option<String>,
  #[serde(default)]
  versions: Vec<version::Model>,

  #[serde(default)]
  version: Option<String>,
  #[serde(default)]
  app_file_url: Option<String>,
  #[serde(default)]
  date_uploaded: Option<DateTime>,
}

impl From<Record> for Model {
  fn from(record: Record) -> Self {
    let mut screenshots = record.screenshots;
    if screenshots.is_empty()
      && let Some(url) = record.screenshot_url
    {
      screenshots.push(url);
    }

    let mut versions = record.versions;
    if versions.is_empty()
      && let Some(tag) = record.version
    {
      versions.push(version::Model {
        version: tag,
        date: record.date_uploaded.unwrap_or_default(),
        files: version::Files {
          android: record.app_file_url,
          ..Default::default()
        },
        size: 0,
      });
    }

    Self {
      id: record.id,
      name: record.name,
      description: record.description,
      logo_url: record.logo_url,
      logo_shape: record.logo_shape,
      screenshots,
      versions,
    }
  }
}
