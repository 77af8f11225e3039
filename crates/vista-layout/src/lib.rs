#![forbid(unsafe_code)]

//! Context-aware viewport layout.
//!
//! A screen rectangle is classified into a [`Context`]; each context keeps
//! its own viewport arrangement as [`ViewportSnapshot`]s, and the
//! [`Workspace`] swaps arrangements in and out as the surface crosses
//! context boundaries.

pub mod config;
pub mod context;
pub mod document;
pub mod events;
pub mod registry;
pub mod snapshot;
pub mod viewport;
pub mod workspace;

pub use config::{ConfigError, WorkspaceConfig};
pub use context::{
    Breakpoint, Context, ContextKey, DeviceType, Orientation, SizeCategory, classify,
    generate_key,
};
pub use document::{
    ContextRecord, DocumentError, MigrationResult, WORKSPACE_DOCUMENT_SCHEMA_VERSION,
    WorkspaceDocument, migrate_document, needs_migration,
};
pub use events::{EventBus, EventKind, ListenerId, NotificationSink, NullSink, WorkspaceEvent};
pub use registry::{ContextRegistry, RegisteredContext};
pub use snapshot::{SnapshotStore, ViewportSnapshot};
pub use viewport::{MinimumSize, Viewport, ViewportFlags, ViewportId, ViewportRegistry};
pub use workspace::{Workspace, WorkspaceState};

pub use vista_core::{
    ErrorKind, FractionalRect, IdGenerator, LayoutError, LayoutResult, ScreenRect,
    SequentialIdGenerator, SplitDirection, split, split_with_ratio, to_absolute, to_fractional,
};
