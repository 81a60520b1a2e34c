/// Directory slug for uploads whose app name is empty.
pub const FALLBACK_SLUG: &str = "unknown_app";

/// Filesystem-safe directory name for an app.
///
/// Lowercases ASCII letters and maps every other non-alphanumeric char to
/// `_`, so `"My App!"` and `"my_app_"` share the `my_app_` directory.
pub fn slug(name: &str) -> String {
  if name.is_empty() {
    return FALLBACK_SLUG.to_string();
  }

  name
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
    .collect()
}

/// Stored file name: `<stem>-<suffix><ext>` built from the client file name.
///
/// Only the last path component of `original` is used and characters outside
/// `[A-Za-z0-9._-]` are replaced with `_`.
pub fn stored_name(original: &str, suffix: i64) -> String {
  let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
  let base: String = base
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
        c
      } else {
        '_'
      }
    })
    .collect();

  let (stem, ext) = match base.rfind('.') {
    Some(dot) if dot > 0 => base.split_at(dot),
    _ => (base.as_str(), ""),
  };
  let stem = if stem.is_empty() { "file" } else { stem };

  format!("{stem}-{suffix}{ext}")
}

/// Byte comparison whose running time does not depend on where inputs differ.
pub fn constant_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_slug() {
    assert_eq!(slug("My App!"), "my_app_");
    assert_eq!(slug("my_app_"), "my_app_");
    assert_eq!(slug("Foo"), "foo");
    assert_eq!(slug("Café 2"), "caf__2");
    assert_eq!(slug(""), FALLBACK_SLUG);
  }

  #[test]
  fn test_stored_name() {
    assert_eq!(stored_name("game.apk", 1700), "game-1700.apk");
    assert_eq!(stored_name("setup.v2.exe", 5), "setup.v2-5.exe");
    assert_eq!(stored_name("README", 5), "README-5");
    assert_eq!(stored_name(".hidden", 5), ".hidden-5");
    assert_eq!(stored_name("../../etc/passwd", 5), "passwd-5");
    assert_eq!(stored_name(r"C:\Users\me\my shot.png", 9), "my_shot-9.png");
    assert_eq!(stored_name("", 9), "file-9");
  }

  #[test]
  fn test_constant_eq() {
    assert!(constant_eq(b"822010", b"822010"));
    assert!(!constant_eq(b"822010", b"822011"));
    assert!(!constant_eq(b"82201", b"822010"));
  }
}
