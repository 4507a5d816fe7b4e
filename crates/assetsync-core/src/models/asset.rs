//! Asset models.
//!
//! The same asset lives in two shapes: `AssetDocument` in the document store
//! (camelCase keys, schemaless, unknown keys preserved) and `AssetRecord` in
//! the `file_metadata` table. `AssetView` is what Get and List return.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Statuses this service writes itself. Clients may store any other
/// non-empty string through Update; the column is free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Pending,
    Uploading,
    Complete,
    Failed,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Pending => "pending",
            AssetStatus::Uploading => "uploading",
            AssetStatus::Complete => "complete",
            AssetStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for creating an asset.
///
/// Every field is optional at the serde level so that a missing field is
/// reported as a validation error rather than a JSON parse error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    #[schema(example = "a.png")]
    pub file_name: Option<String>,
    #[schema(example = "image/png")]
    pub file_type: Option<String>,
    #[schema(example = 1024)]
    pub file_size: Option<i64>,
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsset {
    pub id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub blob_url: String,
}

impl CreateAssetRequest {
    /// Returns `(file_name, file_type, file_size)` or a validation error when
    /// any of them is missing, empty or zero.
    pub fn validate(&self) -> Result<(String, String, i64), AppError> {
        let file_name = self.file_name.as_deref().unwrap_or_default();
        let file_type = self.file_type.as_deref().unwrap_or_default();
        let file_size = self.file_size.unwrap_or(0);

        if file_name.is_empty() || file_type.is_empty() || file_size == 0 {
            return Err(AppError::Validation(
                "fileName, fileType, fileSize are required".to_string(),
            ));
        }
        if file_size < 0 {
            return Err(AppError::Validation(
                "fileSize must be a positive number of bytes".to_string(),
            ));
        }
        if file_name.contains('/') || file_name.contains('\\') {
            return Err(AppError::Validation(
                "fileName must not contain path separators".to_string(),
            ));
        }

        Ok((file_name.to_string(), file_type.to_string(), file_size))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetResponse {
    pub id: Uuid,
    pub blob_url: String,
    /// `blobUrl` plus the write credential as its query string
    pub upload_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteAssetResponse {
    pub deleted: bool,
    pub id: Uuid,
}

/// Partial update. Only the fields listed here can be changed; anything else
/// in the request body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub blob_url: Option<String>,
    /// Free-form; an empty string is treated as absent.
    #[schema(example = "complete")]
    pub status: Option<String>,
}

impl AssetUpdate {
    /// True when no document field is present (status may still be set).
    pub fn has_document_fields(&self) -> bool {
        self.file_name.is_some()
            || self.file_type.is_some()
            || self.file_size.is_some()
            || self.blob_url.is_some()
    }

    /// Status to write, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|status| !status.is_empty())
    }

    /// True when nothing at all would be written to the relational store.
    pub fn is_empty(&self) -> bool {
        !self.has_document_fields() && self.status().is_none()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if matches!(self.file_size, Some(size) if size < 0) {
            return Err(AppError::Validation(
                "fileSize must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Document-store copy of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDocument {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_url: Option<String>,
    /// Keys written by other producers; carried through upserts untouched.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl AssetDocument {
    /// Placeholder used when an update targets an id with no document.
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            file_name: None,
            file_type: None,
            upload_date: None,
            file_size: None,
            blob_url: None,
            extra: Map::new(),
        }
    }

    pub fn from_new(asset: &NewAsset, upload_date: DateTime<Utc>) -> Self {
        Self {
            id: asset.id,
            file_name: Some(asset.file_name.clone()),
            file_type: Some(asset.file_type.clone()),
            upload_date: Some(upload_date),
            file_size: Some(asset.file_size),
            blob_url: Some(asset.blob_url.clone()),
            extra: Map::new(),
        }
    }

    /// Overwrite the fields present in `update`. `status` is ignored.
    pub fn apply(&mut self, update: &AssetUpdate) {
        if let Some(ref file_name) = update.file_name {
            self.file_name = Some(file_name.clone());
        }
        if let Some(ref file_type) = update.file_type {
            self.file_type = Some(file_type.clone());
        }
        if let Some(file_size) = update.file_size {
            self.file_size = Some(file_size);
        }
        if let Some(ref blob_url) = update.blob_url {
            self.blob_url = Some(blob_url.clone());
        }
    }
}

/// Relational-store copy of an asset (`file_metadata` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AssetRecord {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub blob_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Keys `AssetView` serializes from its own fields. Copies of them in a
/// document's `extra` map are dropped on merge so no key is emitted twice.
const VIEW_KEYS: [&str; 7] = [
    "id",
    "fileName",
    "fileType",
    "fileSize",
    "blobUrl",
    "status",
    "uploadDate",
];

/// Asset as returned by Get and List.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetView {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl AssetView {
    /// Merge the two copies. The document is the base and every relational
    /// column is laid over it, so on a collision the relational value wins.
    /// Returns `None` only when both copies are absent.
    pub fn merge(document: Option<AssetDocument>, record: Option<AssetRecord>) -> Option<Self> {
        let mut view = match (document, &record) {
            (None, None) => return None,
            (Some(doc), _) => {
                let mut extra = doc.extra;
                // A status written into the document by another producer shows
                // through until the relational row overlays it.
                let status = match extra.remove("status") {
                    Some(JsonValue::String(status)) => Some(status),
                    _ => None,
                };
                for key in VIEW_KEYS {
                    extra.remove(key);
                }

                AssetView {
                    id: doc.id,
                    file_name: doc.file_name,
                    file_type: doc.file_type,
                    file_size: doc.file_size,
                    blob_url: doc.blob_url,
                    status,
                    upload_date: doc.upload_date,
                    extra,
                }
            }
            (None, Some(row)) => AssetView {
                id: row.id,
                file_name: None,
                file_type: None,
                file_size: None,
                blob_url: None,
                status: None,
                upload_date: None,
                extra: Map::new(),
            },
        };

        if let Some(row) = record {
            view.id = row.id;
            view.file_name = Some(row.file_name);
            view.file_type = Some(row.file_type);
            view.file_size = Some(row.file_size);
            view.blob_url = Some(row.blob_url);
            view.status = Some(row.status);
            view.upload_date = Some(row.created_at);
        }

        Some(view)
    }
}

impl From<AssetRecord> for AssetView {
    fn from(record: AssetRecord) -> Self {
        AssetView {
            id: record.id,
            file_name: Some(record.file_name),
            file_type: Some(record.file_type),
            file_size: Some(record.file_size),
            blob_url: Some(record.blob_url),
            status: Some(record.status),
            upload_date: Some(record.created_at),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: Uuid) -> AssetRecord {
        AssetRecord {
            id,
            user_id: None,
            file_name: "row.png".to_string(),
            file_type: "image/png".to_string(),
            file_size: 2048,
            blob_url: "https://acct/assets/row.png".to_string(),
            status: "pending".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn document(id: Uuid) -> AssetDocument {
        let mut doc = AssetDocument::empty(id);
        doc.file_name = Some("doc.png".to_string());
        doc.file_size = Some(1024);
        doc.upload_date = Some(Utc.with_ymd_and_hms(2024, 4, 30, 8, 0, 0).unwrap());
        doc.extra
            .insert("tags".to_string(), serde_json::json!(["a", "b"]));
        doc
    }

    #[test]
    fn test_create_request_validation() {
        let ok = CreateAssetRequest {
            file_name: Some("a.png".to_string()),
            file_type: Some("image/png".to_string()),
            file_size: Some(1024),
        };
        assert_eq!(
            ok.validate().unwrap(),
            ("a.png".to_string(), "image/png".to_string(), 1024)
        );

        for bad in [
            CreateAssetRequest {
                file_name: None,
                ..ok.clone()
            },
            CreateAssetRequest {
                file_type: Some(String::new()),
                ..ok.clone()
            },
            CreateAssetRequest {
                file_size: Some(0),
                ..ok.clone()
            },
            CreateAssetRequest {
                file_size: Some(-5),
                ..ok.clone()
            },
            CreateAssetRequest {
                file_name: Some("../etc/passwd".to_string()),
                ..ok.clone()
            },
        ] {
            assert!(matches!(bad.validate(), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_update_ignores_unknown_keys() {
        let update: AssetUpdate =
            serde_json::from_str(r#"{"fileName":"b.png","owner":"someone","status":"complete"}"#)
                .unwrap();
        assert_eq!(update.file_name.as_deref(), Some("b.png"));
        assert_eq!(update.status(), Some("complete"));
        assert!(update.has_document_fields());

        let empty: AssetUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());

        let status_only: AssetUpdate = serde_json::from_str(r#"{"status":"failed"}"#).unwrap();
        assert!(!status_only.has_document_fields());
        assert!(!status_only.is_empty());
    }

    #[test]
    fn test_update_status_is_free_form() {
        let custom: AssetUpdate = serde_json::from_str(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(custom.status(), Some("processing"));
        assert!(!custom.is_empty());

        let blank: AssetUpdate = serde_json::from_str(r#"{"status":""}"#).unwrap();
        assert_eq!(blank.status(), None);
        assert!(blank.is_empty());

        let null: AssetUpdate = serde_json::from_str(r#"{"status":null}"#).unwrap();
        assert!(null.is_empty());
    }

    #[test]
    fn test_document_apply_and_extra_roundtrip() {
        let id = Uuid::new_v4();
        let mut doc = document(id);
        doc.apply(&AssetUpdate {
            file_type: Some("image/webp".to_string()),
            status: Some(AssetStatus::Complete.to_string()),
            ..Default::default()
        });
        assert_eq!(doc.file_type.as_deref(), Some("image/webp"));
        assert_eq!(doc.file_name.as_deref(), Some("doc.png"));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["fileType"], "image/webp");
        assert_eq!(json["tags"], serde_json::json!(["a", "b"]));
        assert!(json.get("status").is_none());
        assert!(json.get("blobUrl").is_none());

        let back: AssetDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_merge_relational_wins() {
        let id = Uuid::new_v4();
        let view = AssetView::merge(Some(document(id)), Some(record(id))).unwrap();
        assert_eq!(view.file_name.as_deref(), Some("row.png"));
        assert_eq!(view.file_size, Some(2048));
        assert_eq!(view.status.as_deref(), Some("pending"));
        assert_eq!(view.upload_date, Some(record(id).created_at));
        assert_eq!(view.extra["tags"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_merge_single_sides() {
        let id = Uuid::new_v4();

        let doc_only = AssetView::merge(Some(document(id)), None).unwrap();
        assert_eq!(doc_only.file_name.as_deref(), Some("doc.png"));
        assert!(doc_only.status.is_none());
        assert!(doc_only.file_type.is_none());

        let row_only = AssetView::merge(None, Some(record(id))).unwrap();
        assert_eq!(row_only.file_name.as_deref(), Some("row.png"));
        assert!(row_only.extra.is_empty());

        assert!(AssetView::merge(None, None).is_none());
    }

    #[test]
    fn test_merge_drops_shadowed_document_keys() {
        let id = Uuid::new_v4();
        let mut doc = document(id);
        doc.extra
            .insert("status".to_string(), serde_json::json!("archived"));

        let doc_only = AssetView::merge(Some(doc.clone()), None).unwrap();
        assert_eq!(doc_only.status.as_deref(), Some("archived"));
        assert!(!doc_only.extra.contains_key("status"));

        let merged = AssetView::merge(Some(doc), Some(record(id))).unwrap();
        let text = serde_json::to_string(&merged).unwrap();
        assert_eq!(text.matches("\"status\"").count(), 1);
        assert!(text.contains("\"status\":\"pending\""));
        assert_eq!(merged.extra["tags"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_view_serialization_keys() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(AssetView::from(record(id))).unwrap();
        for key in ["id", "fileName", "fileType", "fileSize", "blobUrl", "status", "uploadDate"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
