//! Route handlers, one module per resource.

pub mod adoptables;
pub mod adoption;
pub mod admin;
pub mod auth;
pub mod messages;
pub mod meta;
pub mod pets;
pub mod users;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::ApiError;

/// One file part of a multipart body, read fully into memory.
pub(crate) struct FilePart {
  pub field:         String,
  pub original_name: String,
  pub content_type:  String,
  pub bytes:         Bytes,
}

/// A multipart body split into text fields and file parts.
#[derive(Default)]
pub(crate) struct MultipartForm {
  pub text:  Vec<(String, String)>,
  pub files: Vec<FilePart>,
}

impl MultipartForm {
  /// Read every part. Parts with a filename are files; the rest are text.
  pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
    let mut form = Self::default();
    while let Some(field) = multipart.next_field().await? {
      let name = field.name().unwrap_or_default().to_owned();
      match field.file_name().map(str::to_owned) {
        Some(original_name) => {
          let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
          let bytes = field.bytes().await?;
          form.files.push(FilePart { field: name, original_name, content_type, bytes });
        }
        None => {
          let value = field.text().await?;
          form.text.push((name, value));
        }
      }
    }
    Ok(form)
  }

  pub fn text(&self, name: &str) -> Option<&str> {
    self
      .text
      .iter()
      .find(|(field, _)| field == name)
      .map(|(_, value)| value.as_str())
  }

  /// File parts submitted under `name`, in upload order.
  pub fn files_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FilePart> + 'a {
    self.files.iter().filter(move |f| f.field == name)
  }
}
