//! On-disk storage for listing images and medical files.

use std::{
  io,
  path::{Path, PathBuf},
};

use chrono::Utc;
use uuid::Uuid;

use crate::error::ApiError;

const IMAGE_TYPES: &[(&str, &str)] = &[
  ("image/jpeg", "jpg"),
  ("image/png", "png"),
  ("image/webp", "webp"),
  ("image/gif", "gif"),
];

const DOCUMENT_TYPES: &[(&str, &str)] = &[("application/pdf", "pdf")];

/// What an upload is attached to. Each kind has its own subdirectory and
/// accepted content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
  Adoptable,
  Medical,
}

impl UploadKind {
  pub fn dir(self) -> &'static str {
    match self {
      UploadKind::Adoptable => "adoptables",
      UploadKind::Medical => "medical",
    }
  }

  /// The file extension to store `content_type` under, if it is accepted.
  fn extension(self, content_type: &str) -> Option<&'static str> {
    let documents: &[(&str, &str)] = match self {
      UploadKind::Adoptable => &[],
      UploadKind::Medical => DOCUMENT_TYPES,
    };
    IMAGE_TYPES
      .iter()
      .chain(documents)
      .find(|(mime, _)| mime.eq_ignore_ascii_case(content_type))
      .map(|(_, ext)| *ext)
  }
}

/// Upload directory root plus the per-file size limit.
#[derive(Debug, Clone)]
pub struct UploadStore {
  root:           PathBuf,
  max_file_bytes: usize,
}

impl UploadStore {
  /// Create the store, making the per-kind directories if needed.
  pub async fn open(root: impl Into<PathBuf>, max_file_bytes: usize) -> io::Result<Self> {
    let root = root.into();
    for kind in [UploadKind::Adoptable, UploadKind::Medical] {
      tokio::fs::create_dir_all(root.join(kind.dir())).await?;
    }
    Ok(Self { root, max_file_bytes })
  }

  pub fn root(&self) -> &Path { &self.root }

  pub fn max_file_bytes(&self) -> usize { self.max_file_bytes }

  pub fn path(&self, kind: UploadKind, filename: &str) -> PathBuf {
    self.root.join(kind.dir()).join(filename)
  }

  /// Validate and write one file. Returns the generated filename, which is
  /// `<unix millis>-<random>.<ext>` and never derived from client input.
  pub async fn save(
    &self,
    kind: UploadKind,
    content_type: &str,
    bytes: &[u8],
  ) -> Result<String, ApiError> {
    let ext = kind.extension(content_type).ok_or_else(|| {
      ApiError::bad_request(format!("unsupported file type {content_type:?}"))
    })?;
    if bytes.is_empty() {
      return Err(ApiError::bad_request("uploaded file is empty"));
    }
    if bytes.len() > self.max_file_bytes {
      return Err(ApiError::bad_request(format!(
        "file exceeds the {} byte limit",
        self.max_file_bytes
      )));
    }

    let filename = format!(
      "{}-{}.{ext}",
      Utc::now().timestamp_millis(),
      Uuid::new_v4().simple()
    );
    tokio::fs::write(self.path(kind, &filename), bytes)
      .await
      .map_err(ApiError::internal)?;
    Ok(filename)
  }

  /// Delete files in the background. Failures are logged and otherwise
  /// ignored.
  pub fn remove(&self, kind: UploadKind, filenames: Vec<String>) {
    if filenames.is_empty() {
      return;
    }
    let dir = self.root.join(kind.dir());
    tokio::spawn(async move {
      for name in filenames {
        let path = dir.join(&name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
          tracing::warn!(path = %path.display(), error = %e, "failed to remove upload");
        }
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn listings_accept_images_only() {
    assert_eq!(UploadKind::Adoptable.extension("image/png"), Some("png"));
    assert_eq!(UploadKind::Adoptable.extension("IMAGE/JPEG"), Some("jpg"));
    assert_eq!(UploadKind::Adoptable.extension("application/pdf"), None);
    assert_eq!(UploadKind::Medical.extension("application/pdf"), Some("pdf"));
    assert_eq!(UploadKind::Medical.extension("text/html"), None);
  }

  #[tokio::test]
  async fn save_writes_under_kind_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = UploadStore::open(dir.path(), 16).await.unwrap();

    let name = store
      .save(UploadKind::Medical, "application/pdf", b"%PDF-1.4")
      .await
      .unwrap();
    assert!(name.ends_with(".pdf"));
    let written = tokio::fs::read(store.path(UploadKind::Medical, &name)).await.unwrap();
    assert_eq!(written, b"%PDF-1.4");
  }

  #[tokio::test]
  async fn save_enforces_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = UploadStore::open(dir.path(), 4).await.unwrap();
    let err = store
      .save(UploadKind::Adoptable, "image/png", b"too many bytes")
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
  }
}
