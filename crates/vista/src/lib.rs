#![forbid(unsafe_code)]

//! Vista public facade crate.
//!
//! Re-exports the stable surface of `vista-core` and `vista-layout` and
//! offers a prelude for day-to-day use.
//!
//! ```
//! use vista::prelude::*;
//!
//! let mut workspace = Workspace::new(WorkspaceConfig::default());
//! workspace.set_surface(ScreenRect::from_size(1920.0, 1080.0))?;
//! let first = workspace.viewports()[0].id().clone();
//! workspace.split_viewport(&first, SplitDirection::Down)?;
//!
//! workspace.set_surface(ScreenRect::from_size(800.0, 1200.0))?;
//! assert_eq!(workspace.viewports().len(), 1);
//! workspace.set_surface(ScreenRect::from_size(1920.0, 1080.0))?;
//! assert_eq!(workspace.viewports().len(), 2);
//! # Ok::<(), vista::Error>(())
//! ```

use thiserror::Error;

#[cfg(feature = "logging")]
pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use vista_core::{
    ErrorKind, FractionalRect, IdGenerator, LayoutError, LayoutResult, ScreenRect,
    SequentialIdGenerator, SplitDirection, SplitHalves, split, split_with_ratio, to_absolute,
    to_fractional,
};
#[cfg(feature = "uuid")]
pub use vista_core::UuidIdGenerator;

// --- Layout re-exports -----------------------------------------------------

pub use vista_layout::{
    Breakpoint, ConfigError, Context, ContextKey, ContextRecord, ContextRegistry, DeviceType,
    DocumentError, EventBus, EventKind, ListenerId, MinimumSize, NotificationSink, Orientation,
    SizeCategory, SnapshotStore, Viewport, ViewportFlags, ViewportId, ViewportRegistry,
    ViewportSnapshot, WORKSPACE_DOCUMENT_SCHEMA_VERSION, Workspace, WorkspaceConfig,
    WorkspaceDocument, WorkspaceEvent, WorkspaceState, classify, generate_key,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Vista callers.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// The logical error kind, when the failure came from a layout operation.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Layout(e) | Self::Document(DocumentError::Layout(e)) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Standard result type for Vista APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    //! Common imports.

    pub use crate::{
        Context, ContextKey, Error, EventKind, FractionalRect, Result, ScreenRect,
        SplitDirection, Viewport, ViewportId, Workspace, WorkspaceConfig, WorkspaceDocument,
        WorkspaceEvent,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_errors_convert() {
        let err: Error = LayoutError::ViewportNotFound("vp-9".into()).into();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert_eq!(err.to_string(), LayoutError::ViewportNotFound("vp-9".into()).to_string());
    }

    #[test]
    fn document_errors_keep_layout_kind() {
        let err: Error = DocumentError::from(LayoutError::PreconditionViolation {
            op: "restore_context",
            reason: "test",
        })
        .into();
        assert_eq!(err.kind(), Some(ErrorKind::PreconditionViolation));
        let err: Error = DocumentError::EmptyName.into();
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn config_errors_convert() {
        let err: Error = WorkspaceConfig::from_toml_str("name = ")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Config(ConfigError::Toml(_))));
    }
}
