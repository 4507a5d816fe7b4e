//! Blob naming.
//!
//! Layout: `{asset_id}/{file_name}`. Deleting an asset removes everything under
//! `{asset_id}/`, so the id must always be the first path segment.

use crate::traits::{StorageError, StorageResult};
use object_store::path::Path;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use uuid::Uuid;

/// Escaped when a stored path is placed in a URL. This is the set the S3
/// client applies before signing, so public and presigned URLs agree.
const URL_PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn blob_name(asset_id: Uuid, file_name: &str) -> String {
    format!("{}/{}", asset_id, file_name)
}

/// Prefix covering every blob that belongs to `asset_id`.
pub fn asset_prefix(asset_id: Uuid) -> String {
    format!("{}/", asset_id)
}

/// Reject names that would escape the container or produce an empty path.
pub fn validate_blob_name(name: &str) -> StorageResult<()> {
    if name.trim().is_empty() {
        return Err(StorageError::InvalidKey("blob name is empty".to_string()));
    }
    if name.starts_with('/') || name.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "blob name must be a relative path: {}",
            name
        )));
    }
    if name.split('/').any(|segment| segment == ".." || segment == ".") {
        return Err(StorageError::InvalidKey(format!(
            "blob name contains a relative segment: {}",
            name
        )));
    }
    Ok(())
}

/// Object store path for `name`, optionally nested under `container`.
///
/// `Path` percent-encodes characters it cannot store (`#`, `%`, ...), so the
/// stored key can differ from `name`. Use [`name_from_path`] to get the name
/// back and [`url_path`] to put the key in a URL.
pub fn object_path(container: Option<&str>, name: &str) -> StorageResult<Path> {
    validate_blob_name(name)?;
    let full = match container {
        Some(container) => format!("{}/{}", container, name),
        None => name.to_string(),
    };
    Ok(Path::from(full))
}

/// Blob name stored at `location`; the inverse of [`object_path`]. `None`
/// when `location` lies outside `container` or is the container itself.
pub fn name_from_path(container: Option<&str>, location: &Path) -> Option<String> {
    let mut parts = location
        .parts()
        .map(|part| percent_decode_str(part.as_ref()).decode_utf8_lossy().into_owned());

    if let Some(container) = container {
        if parts.next()? != container {
            return None;
        }
    }

    let name = parts.collect::<Vec<_>>().join("/");
    (!name.is_empty()).then_some(name)
}

/// `location` escaped for use as a URL path.
pub fn url_path(location: &Path) -> String {
    utf8_percent_encode(location.as_ref(), URL_PATH_ENCODE_SET).to_string()
}
