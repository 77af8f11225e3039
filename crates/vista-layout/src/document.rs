#![forbid(unsafe_code)]

//! Persisted workspace document, schema v1.
//!
//! A [`WorkspaceDocument`] lists every known context together with its
//! viewport snapshots. Restoring one rebuilds all contexts and snapshot
//! sets before any surface is applied.
//!
//! # Schema Versioning Policy
//!
//! - Additive fields may be carried in `extensions` without a version bump.
//! - Breaking changes, including any change to the context key format,
//!   require incrementing [`WORKSPACE_DOCUMENT_SCHEMA_VERSION`] and adding a
//!   migration path.
//! - Loaders reject unknown versions with actionable diagnostics.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vista_core::{LayoutError, ScreenRect};

use crate::context::{Breakpoint, Context, ContextKey, DeviceType, Orientation, SizeCategory, classify};
use crate::registry::RegisteredContext;
use crate::snapshot::ViewportSnapshot;
use crate::viewport::MinimumSize;

/// Current document schema version.
pub const WORKSPACE_DOCUMENT_SCHEMA_VERSION: u16 = 1;

fn default_document_version() -> u16 {
    WORKSPACE_DOCUMENT_SCHEMA_VERSION
}

/// One context and its viewport snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRecord {
    /// The context key.
    pub id: ContextKey,
    pub name: String,
    pub max_screen_rect: ScreenRect,
    pub orientation: Orientation,
    pub aspect_ratio: f64,
    pub breakpoint: Breakpoint,
    pub size_category: SizeCategory,
    pub device_type: DeviceType,
    #[serde(default)]
    pub minimum_viewport_width: f64,
    #[serde(default)]
    pub minimum_viewport_height: f64,
    #[serde(default)]
    pub viewport_snapshots: Vec<ViewportSnapshot>,
}

impl ContextRecord {
    /// Build a record from a registered context and its snapshots.
    #[must_use]
    pub fn new(entry: &RegisteredContext, viewport_snapshots: Vec<ViewportSnapshot>) -> Self {
        let context = &entry.context;
        Self {
            id: context.key(),
            name: context.name(),
            max_screen_rect: context.screen_rect,
            orientation: context.orientation,
            aspect_ratio: context.aspect_ratio,
            breakpoint: context.breakpoint,
            size_category: context.size_category,
            device_type: context.device_type,
            minimum_viewport_width: entry.minimum_viewport.width,
            minimum_viewport_height: entry.minimum_viewport.height,
            viewport_snapshots,
        }
    }

    /// The context descriptor as stored (not reclassified).
    #[must_use]
    pub fn context(&self) -> Context {
        Context {
            orientation: self.orientation,
            aspect_ratio: self.aspect_ratio,
            breakpoint: self.breakpoint,
            size_category: self.size_category,
            device_type: self.device_type,
            screen_rect: self.max_screen_rect,
        }
    }

    #[must_use]
    pub fn registered(&self) -> RegisteredContext {
        RegisteredContext {
            context: self.context(),
            minimum_viewport: MinimumSize::new(
                self.minimum_viewport_width,
                self.minimum_viewport_height,
            ),
        }
    }

    /// Validate key consistency and snapshot ownership.
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.max_screen_rect.validate()?;
        let expected = classify(&self.max_screen_rect).key();
        if self.id != expected {
            return Err(DocumentError::KeyMismatch {
                found: self.id.to_string(),
                expected: expected.to_string(),
            });
        }
        let mut seen = BTreeSet::new();
        for snapshot in &self.viewport_snapshots {
            if snapshot.owning_context_id != self.id {
                return Err(DocumentError::ForeignSnapshot {
                    context: self.id.to_string(),
                    viewport: snapshot.id.to_string(),
                    owner: snapshot.owning_context_id.to_string(),
                });
            }
            if !seen.insert(&snapshot.id) {
                return Err(DocumentError::DuplicateViewport {
                    context: self.id.to_string(),
                    viewport: snapshot.id.to_string(),
                });
            }
            if !snapshot.is_minimized {
                let Some(rect) = snapshot.fractional_rect else {
                    return Err(DocumentError::MissingRect {
                        context: self.id.to_string(),
                        viewport: snapshot.id.to_string(),
                    });
                };
                rect.validate()?;
            }
        }
        Ok(())
    }
}

/// Persisted workspace: identity plus every context record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDocument {
    #[serde(default = "default_document_version")]
    pub schema_version: u16,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub workspace_contexts: Vec<ContextRecord>,
    /// Forward-compatible extension bag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, String>,
}

impl WorkspaceDocument {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema_version: WORKSPACE_DOCUMENT_SCHEMA_VERSION,
            id: id.into(),
            name: name.into(),
            workspace_contexts: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }

    /// Validate the document against schema and structural invariants.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.schema_version != WORKSPACE_DOCUMENT_SCHEMA_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: self.schema_version,
                expected: WORKSPACE_DOCUMENT_SCHEMA_VERSION,
            });
        }
        if self.name.trim().is_empty() {
            return Err(DocumentError::EmptyName);
        }
        let mut keys = BTreeSet::new();
        for record in &self.workspace_contexts {
            if !keys.insert(&record.id) {
                return Err(DocumentError::DuplicateContext {
                    context: record.id.to_string(),
                });
            }
            record.validate()?;
        }
        Ok(())
    }

    /// Record for a context key, if present.
    #[must_use]
    pub fn context(&self, key: &ContextKey) -> Option<&ContextRecord> {
        self.workspace_contexts.iter().find(|r| &r.id == key)
    }

    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse, migrate, and validate.
    pub fn from_json_str(s: &str) -> Result<Self, DocumentError> {
        let document: Self = serde_json::from_str(s)?;
        let migrated = migrate_document(document)?.document;
        migrated.validate()?;
        Ok(migrated)
    }
}

/// Errors from document parsing, validation, or restoration.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported workspace document schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },
    #[error("no migration path from v{from} to v{to}")]
    NoMigrationPath { from: u16, to: u16 },
    #[error("workspace name must not be empty")]
    EmptyName,
    #[error("context {context} appears more than once")]
    DuplicateContext { context: String },
    #[error("context id {found} does not match its screen rect (expected {expected})")]
    KeyMismatch { found: String, expected: String },
    #[error("snapshot {viewport} in context {context} is owned by {owner}")]
    ForeignSnapshot {
        context: String,
        viewport: String,
        owner: String,
    },
    #[error("viewport {viewport} appears more than once in context {context}")]
    DuplicateViewport { context: String, viewport: String },
    #[error("visible snapshot {viewport} in context {context} has no rect")]
    MissingRect { context: String, viewport: String },
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

// =========================================================================
// Migration scaffolding
// =========================================================================

/// Result of migrating a document to the current schema.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub document: WorkspaceDocument,
    pub from_version: u16,
    pub to_version: u16,
    pub warnings: Vec<String>,
}

/// Migrate a document to [`WORKSPACE_DOCUMENT_SCHEMA_VERSION`].
///
/// v1 is the identity migration.
pub fn migrate_document(document: WorkspaceDocument) -> Result<MigrationResult, DocumentError> {
    match document.schema_version {
        WORKSPACE_DOCUMENT_SCHEMA_VERSION => Ok(MigrationResult {
            from_version: WORKSPACE_DOCUMENT_SCHEMA_VERSION,
            to_version: WORKSPACE_DOCUMENT_SCHEMA_VERSION,
            warnings: Vec::new(),
            document,
        }),
        v if v > WORKSPACE_DOCUMENT_SCHEMA_VERSION => Err(DocumentError::UnsupportedVersion {
            found: v,
            expected: WORKSPACE_DOCUMENT_SCHEMA_VERSION,
        }),
        v => Err(DocumentError::NoMigrationPath {
            from: v,
            to: WORKSPACE_DOCUMENT_SCHEMA_VERSION,
        }),
    }
}

#[must_use]
pub fn needs_migration(document: &WorkspaceDocument) -> bool {
    document.schema_version != WORKSPACE_DOCUMENT_SCHEMA_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{ViewportFlags, ViewportId};
    use vista_core::FractionalRect;

    fn record(w: f64, h: f64) -> ContextRecord {
        let entry = RegisteredContext {
            context: classify(&ScreenRect::from_size(w, h)),
            minimum_viewport: MinimumSize::NONE,
        };
        let key = entry.key();
        ContextRecord::new(
            &entry,
            vec![ViewportSnapshot::new(
                ViewportId::new("vp-1"),
                FractionalRect::FULL,
                ViewportFlags::DEFAULT_VIEWPORT,
                key,
                7,
            )],
        )
    }

    fn document() -> WorkspaceDocument {
        let mut doc = WorkspaceDocument::new("ws-1", "main");
        doc.workspace_contexts.push(record(1920.0, 1080.0));
        doc.workspace_contexts.push(record(800.0, 1200.0));
        doc
    }

    #[test]
    fn valid_document() {
        assert!(document().validate().is_ok());
    }

    #[test]
    fn negative_screen_rect_is_rejected() {
        // The id matches the key classified from the same negative rect.
        let mut doc = document();
        doc.workspace_contexts.push(record(-100.0, 50.0));
        let err = doc.validate().unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Layout(ref e) if e.kind() == vista_core::ErrorKind::InvalidArgument
        ));
        let json = doc.to_json_string().unwrap();
        assert!(WorkspaceDocument::from_json_str(&json).is_err());
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = document().to_json_string().unwrap();
        for key in [
            "\"schemaVersion\"",
            "\"workspaceContexts\"",
            "\"maxScreenRect\"",
            "\"viewportSnapshots\"",
            "\"minimumViewportWidth\"",
            "\"sizeCategory\"",
            "\"deviceType\"",
            "\"owningContextId\"",
        ] {
            assert!(json.contains(key), "missing {key}");
        }
        assert!(json.contains("\"landscape-lg-1920x1080\""));
    }

    #[test]
    fn json_round_trip() {
        let doc = document();
        let back = WorkspaceDocument::from_json_str(&doc.to_json_string().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{
            "id": "ws",
            "name": "minimal",
            "workspaceContexts": [{
                "id": "landscape-sm-800x600",
                "name": "small",
                "maxScreenRect": {"x": 0, "y": 0, "width": 800, "height": 600},
                "orientation": "landscape",
                "aspectRatio": 1.3333333333333333,
                "breakpoint": "sm",
                "sizeCategory": "small",
                "deviceType": "small-tablet"
            }]
        }"#;
        let doc = WorkspaceDocument::from_json_str(json).unwrap();
        assert_eq!(doc.schema_version, WORKSPACE_DOCUMENT_SCHEMA_VERSION);
        assert!(doc.workspace_contexts[0].viewport_snapshots.is_empty());
        assert_eq!(doc.workspace_contexts[0].minimum_viewport_width, 0.0);
    }

    #[test]
    fn key_mismatch_rejected() {
        let mut doc = document();
        doc.workspace_contexts[0].id = ContextKey::from("landscape-sm-1x1");
        assert!(matches!(
            doc.validate(),
            Err(DocumentError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn foreign_snapshot_rejected() {
        let mut doc = document();
        doc.workspace_contexts[0].viewport_snapshots[0].owning_context_id =
            ContextKey::from("portrait-sm-800x1200");
        assert!(matches!(
            doc.validate(),
            Err(DocumentError::ForeignSnapshot { .. })
        ));
    }

    #[test]
    fn duplicate_viewport_rejected() {
        let mut doc = document();
        let dup = doc.workspace_contexts[0].viewport_snapshots[0].clone();
        doc.workspace_contexts[0].viewport_snapshots.push(dup);
        assert!(matches!(
            doc.validate(),
            Err(DocumentError::DuplicateViewport { .. })
        ));
    }

    #[test]
    fn duplicate_context_rejected() {
        let mut doc = document();
        let dup = doc.workspace_contexts[0].clone();
        doc.workspace_contexts.push(dup);
        assert!(matches!(
            doc.validate(),
            Err(DocumentError::DuplicateContext { .. })
        ));
    }

    #[test]
    fn visible_snapshot_needs_rect() {
        let mut doc = document();
        doc.workspace_contexts[0].viewport_snapshots[0].fractional_rect = None;
        assert!(matches!(
            doc.validate(),
            Err(DocumentError::MissingRect { .. })
        ));
    }

    #[test]
    fn empty_name_rejected() {
        let mut doc = document();
        doc.name = "  ".into();
        assert!(matches!(doc.validate(), Err(DocumentError::EmptyName)));
    }

    #[test]
    fn migrate_v1_is_noop() {
        let doc = document();
        let result = migrate_document(doc.clone()).unwrap();
        assert_eq!(result.from_version, 1);
        assert_eq!(result.to_version, 1);
        assert_eq!(result.document, doc);
        assert!(result.warnings.is_empty());
        assert!(!needs_migration(&doc));
    }

    #[test]
    fn migrate_future_version_fails() {
        let mut doc = document();
        doc.schema_version = 9;
        assert!(needs_migration(&doc));
        assert!(matches!(
            migrate_document(doc),
            Err(DocumentError::UnsupportedVersion { found: 9, .. })
        ));
    }

    #[test]
    fn migrate_old_version_has_no_path() {
        let mut doc = document();
        doc.schema_version = 0;
        let err = migrate_document(doc).unwrap_err();
        assert_eq!(err.to_string(), "no migration path from v0 to v1");
    }
}
