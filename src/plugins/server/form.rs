//! Multipart upload form as sent by the admin panel

use std::collections::BTreeMap;

use axum::extract::{Multipart, multipart::Field};

use crate::{
  entity::{LogoShape, Platform},
  prelude::*,
  sv::{
    registry::{MAX_SCREENSHOTS, Release},
    storage::Upload,
  },
};

const LOGO_FIELD: &str = "appLogo";
const SCREENSHOT_FIELD: &str = "screenshot";
/// Single-binary field from before per-platform uploads.
const LEGACY_FIELD: &str = "appFile";

#[derive(Debug, Default)]
pub struct UploadForm {
  pub name: Option<String>,
  pub version: Option<String>,
  pub description: Option<String>,
  pub logo_shape: Option<String>,
  pub logo: Option<Upload>,
  pub screenshots: Vec<Upload>,
  pub binaries: BTreeMap<Platform, Upload>,
  pub legacy: Option<Upload>,
}

impl UploadForm {
  /// Buffers the whole form, enforcing per-field file limits.
  pub async fn read(mut multipart: Multipart) -> Result<Self> {
    let mut form = Self::default();

    while let Some(field) = multipart.next_field().await? {
      let Some(name) = field.name().map(str::to_owned) else {
        continue;
      };

      match name.as_str() {
        "name" => form.name = Some(field.text().await?),
        "version" => form.version = Some(field.text().await?),
        "description" => form.description = Some(field.text().await?),
        "logoShape" => form.logo_shape = Some(field.text().await?),
        LOGO_FIELD => {
          if let Some(upload) = read_file(field).await? {
            single(&mut form.logo, upload, LOGO_FIELD)?;
          }
        }
        LEGACY_FIELD => {
          if let Some(upload) = read_file(field).await? {
            single(&mut form.legacy, upload, LEGACY_FIELD)?;
          }
        }
        SCREENSHOT_FIELD => {
          if let Some(upload) = read_file(field).await? {
            if form.screenshots.len() == MAX_SCREENSHOTS {
              return Err(Error::TooManyFiles {
                field: SCREENSHOT_FIELD.to_owned(),
                max: MAX_SCREENSHOTS,
              });
            }
            form.screenshots.push(upload);
          }
        }
        other => match Platform::from_field(other) {
          Some(platform) => {
            if let Some(upload) = read_file(field).await? {
              if form.binaries.contains_key(&platform) {
                return Err(Error::TooManyFiles {
                  field: other.to_owned(),
                  max: 1,
                });
              }
              form.binaries.insert(platform, upload);
            }
          }
          None if field.file_name().is_some() => {
            return Err(Error::UnknownField(other.to_owned()));
          }
          None => debug!("Ignoring form field `{other}`"),
        },
      }
    }

    Ok(form)
  }

  /// Typed release request; maps the legacy binary to android when the
  /// android slot is empty.
  pub fn into_release(self) -> Result<Release> {
    let logo_shape = non_empty(self.logo_shape)
      .map(|shape| shape.parse::<LogoShape>())
      .transpose()?;

    let mut binaries = self.binaries;
    if let Some(legacy) = self.legacy {
      binaries.entry(Platform::Android).or_insert(legacy);
    }

    Ok(Release {
      name: self.name.unwrap_or_default(),
      version: self.version.unwrap_or_default(),
      description: non_empty(self.description),
      logo_shape,
      logo: self.logo,
      screenshots: self.screenshots,
      binaries,
    })
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|value| !value.trim().is_empty())
}

fn single(slot: &mut Option<Upload>, upload: Upload, field: &str) -> Result<()> {
  if slot.is_some() {
    return Err(Error::TooManyFiles { field: field.to_owned(), max: 1 });
  }
  *slot = Some(upload);
  Ok(())
}

/// File part contents, or `None` for an empty part without a file name.
async fn read_file(field: Field<'_>) -> Result<Option<Upload>> {
  let file_name = field.file_name().unwrap_or_default().to_owned();
  let bytes = field.bytes().await?;

  if file_name.is_empty() && bytes.is_empty() {
    return Ok(None);
  }
  Ok(Some(Upload::new(file_name, bytes)))
}
