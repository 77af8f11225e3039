#![forbid(unsafe_code)]

//! Workspace orchestrator.
//!
//! A [`Workspace`] ties the context registry, the snapshot store and the live
//! viewport registry together. Its only state transition is
//! [`Workspace::set_surface`]:
//!
//! ```text
//! Uninitialized --set_surface--> Active --set_surface--> Active
//! ```
//!
//! When the surface classifies to a different context, the outgoing live
//! arrangement is merged into that context's snapshots and the incoming
//! context's visible snapshots become the new live viewports. A context with
//! nothing visible gets a single default viewport.
//!
//! # Invariants
//!
//! 1. Switching `A -> B -> A` without edits restores the same viewport ids
//!    and fractional rectangles in `A`.
//! 2. Surface switches and viewport creation stage every change before
//!    committing; an error leaves the workspace unchanged.
//! 3. An active workspace always has a current context.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span, info, warn};
use vista_core::{
    FractionalRect, IdGenerator, LayoutError, LayoutResult, ScreenRect, SequentialIdGenerator,
    SplitDirection,
};

use crate::config::WorkspaceConfig;
use crate::context::{Context, ContextKey, classify};
use crate::document::{ContextRecord, DocumentError, WorkspaceDocument};
use crate::events::{EventBus, NotificationSink, WorkspaceEvent};
use crate::registry::ContextRegistry;
use crate::snapshot::{SnapshotStore, ViewportSnapshot, now_millis};
use crate::viewport::{MinimumSize, Viewport, ViewportFlags, ViewportId, ViewportRegistry};

/// Lifecycle state of a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceState {
    /// No surface has been applied yet.
    Uninitialized,
    /// A surface and its context are current.
    Active,
}

/// Upper bound on regenerating an id that collides with a stored snapshot.
const MAX_ID_ATTEMPTS: usize = 1024;

/// Id source that skips ids already recorded in any context's snapshots.
struct UnusedIds<'a> {
    inner: &'a dyn IdGenerator,
    snapshots: &'a SnapshotStore,
}

impl UnusedIds<'_> {
    /// Next generated id not held by any stored snapshot.
    fn allocate(&self) -> LayoutResult<ViewportId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = ViewportId::new(self.inner.generate());
            if !self.snapshots.contains_viewport(&candidate) {
                return Ok(candidate);
            }
        }
        warn!(attempts = MAX_ID_ATTEMPTS, "id generator exhausted");
        Err(LayoutError::invalid_argument(
            "id",
            format!("id generator produced no unused id in {MAX_ID_ATTEMPTS} attempts"),
        ))
    }
}

/// Layout state of one workspace surface across every context it has seen.
pub struct Workspace {
    id: String,
    name: String,
    config: WorkspaceConfig,
    state: WorkspaceState,
    contexts: ContextRegistry,
    snapshots: SnapshotStore,
    viewports: ViewportRegistry,
    ids: Box<dyn IdGenerator>,
    events: Rc<EventBus>,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("contexts", &self.contexts)
            .field("viewports", &self.viewports.count())
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Workspace with sequential `"{id_prefix}-N"` ids and a fresh event bus.
    #[must_use]
    pub fn new(config: WorkspaceConfig) -> Self {
        let ids = SequentialIdGenerator::new(config.id_prefix.clone());
        Self::with_parts(config, Box::new(ids), Rc::new(EventBus::new()))
    }

    #[must_use]
    pub fn with_id_generator(config: WorkspaceConfig, ids: Box<dyn IdGenerator>) -> Self {
        Self::with_parts(config, ids, Rc::new(EventBus::new()))
    }

    /// Full construction with injected collaborators.
    #[must_use]
    pub fn with_parts(
        config: WorkspaceConfig,
        ids: Box<dyn IdGenerator>,
        events: Rc<EventBus>,
    ) -> Self {
        let contexts = ContextRegistry::with_minimum(
            Rc::clone(&events) as Rc<dyn NotificationSink>,
            config.minimum_viewport(),
        );
        Self {
            id: config.name.clone(),
            name: config.name.clone(),
            config,
            state: WorkspaceState::Uninitialized,
            contexts,
            snapshots: SnapshotStore::new(),
            viewports: ViewportRegistry::default(),
            ids,
            events,
        }
    }

    /// Override the workspace id written into documents.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> WorkspaceState {
        self.state
    }

    /// The event bus; register listeners here.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    #[must_use]
    pub fn contexts(&self) -> &ContextRegistry {
        &self.contexts
    }

    #[must_use]
    pub fn current_context(&self) -> Option<&Context> {
        self.contexts.current()
    }

    /// The surface the live viewports are laid out against.
    #[must_use]
    pub fn surface(&self) -> Option<ScreenRect> {
        match self.state {
            WorkspaceState::Active => Some(self.viewports.surface()),
            WorkspaceState::Uninitialized => None,
        }
    }

    // ---------------------------------------------------------------------
    // Surface transitions
    // ---------------------------------------------------------------------

    /// Apply a new surface, switching contexts when its signature changes.
    pub fn set_surface(&mut self, screen: ScreenRect) -> LayoutResult<&Context> {
        screen.validate()?;
        let _span = debug_span!("set_surface", width = screen.width, height = screen.height)
            .entered();
        let incoming_key = classify(&screen).key();
        let outgoing_key = match self.state {
            WorkspaceState::Active => self.contexts.current_key().cloned(),
            WorkspaceState::Uninitialized => None,
        };

        if outgoing_key.as_ref() == Some(&incoming_key) {
            debug!(context_key = %incoming_key, "surface resized within context");
            self.viewports.on_surface_change(screen);
            return self.current_or_missing(&incoming_key);
        }

        // Stage the outgoing merge and the incoming arrangement.
        let timestamp = now_millis();
        let live_count = self.viewports.count();
        let outgoing = outgoing_key.map(|key| {
            let merged = self.merged_snapshots(&key, timestamp);
            (key, merged)
        });
        let restored: Vec<ViewportSnapshot> = self
            .snapshots
            .snapshots_for_context(&incoming_key)
            .iter()
            .filter(|s| s.visible_rect().is_some())
            .cloned()
            .collect();
        let mut staged: Vec<(ViewportId, FractionalRect, ViewportFlags)> = restored
            .iter()
            .filter_map(|s| s.visible_rect().map(|rect| (s.id.clone(), rect, s.flags())))
            .collect();
        if staged.is_empty() {
            let id = self.unused_ids().allocate()?;
            debug!(viewport_id = %id, context_key = %incoming_key, "default viewport synthesized");
            staged.push((
                id,
                self.config.default_viewport,
                ViewportFlags::DEFAULT_VIEWPORT,
            ));
        }

        // Commit.
        self.contexts.resolve(&screen);
        let mut created = Vec::new();
        if let Some((key, merged)) = outgoing {
            // Carried-over minimized entries already existed.
            created.extend_from_slice(&merged[..live_count]);
            self.snapshots.replace(&key, merged);
            self.contexts.notify_updated(&key);
        }
        let minimum = self
            .contexts
            .current_entry()
            .map_or(MinimumSize::NONE, |e| e.minimum_viewport);
        self.viewports.replace_all(screen, staged);
        self.viewports.set_minimum_size(minimum);
        self.state = WorkspaceState::Active;

        info!(
            context_key = %incoming_key,
            persisted = created.len(),
            restored = restored.len(),
            viewports = self.viewports.count(),
            "context switched"
        );
        for snapshot in created {
            self.events.emit(&WorkspaceEvent::SnapshotCreated { snapshot });
        }
        for snapshot in restored {
            self.events.emit(&WorkspaceEvent::SnapshotRestored { snapshot });
        }
        self.current_or_missing(&incoming_key)
    }

    // ---------------------------------------------------------------------
    // Viewport operations
    // ---------------------------------------------------------------------

    /// Create a viewport in the current context and record it in every
    /// registered context.
    pub fn create_viewport(&mut self, rect: Option<FractionalRect>) -> LayoutResult<&Viewport> {
        self.ensure_active("create_viewport")?;
        let ids = UnusedIds {
            inner: self.ids.as_ref(),
            snapshots: &self.snapshots,
        };
        let viewport = self
            .viewports
            .create_with(rect, |live| live.ensure_unused(ids.allocate()?))?;
        let (id, rect, flags) = (
            viewport.id().clone(),
            viewport.fractional_rect(),
            viewport.flags(),
        );
        self.propagate(&id, rect, flags)?;
        self.viewport_or_missing(&id)
    }

    /// Split a viewport in half. Returns the new viewport.
    pub fn split_viewport(
        &mut self,
        id: &ViewportId,
        direction: SplitDirection,
    ) -> LayoutResult<&Viewport> {
        self.split_viewport_with_ratio(id, direction, 0.5)
    }

    /// Split with `ratio` of the split axis kept by the original viewport.
    pub fn split_viewport_with_ratio(
        &mut self,
        id: &ViewportId,
        direction: SplitDirection,
        ratio: f64,
    ) -> LayoutResult<&Viewport> {
        self.ensure_active("split_viewport")?;
        let ids = UnusedIds {
            inner: self.ids.as_ref(),
            snapshots: &self.snapshots,
        };
        let viewport = self
            .viewports
            .split_with(id, direction, ratio, |live| live.ensure_unused(ids.allocate()?))?;
        let (new_id, rect, flags) = (
            viewport.id().clone(),
            viewport.fractional_rect(),
            viewport.flags(),
        );
        self.propagate(&new_id, rect, flags)?;
        self.viewport_or_missing(&new_id)
    }

    /// Remove a live viewport. `Ok(false)` if it was not present.
    pub fn remove_viewport(&mut self, id: &ViewportId) -> LayoutResult<bool> {
        self.ensure_active("remove_viewport")?;
        Ok(self.viewports.remove(id))
    }

    #[must_use]
    pub fn has_viewport(&self, id: &ViewportId) -> bool {
        self.viewports.contains(id)
    }

    #[must_use]
    pub fn viewport(&self, id: &ViewportId) -> Option<&Viewport> {
        self.viewports.find(id)
    }

    /// Live viewports in creation order.
    #[must_use]
    pub fn viewports(&self) -> &[Viewport] {
        self.viewports.list()
    }

    pub fn minimize_viewport(&mut self, id: &ViewportId) -> LayoutResult<()> {
        self.ensure_active("minimize_viewport")?;
        self.viewports.set_minimized(id, true)
    }

    pub fn maximize_viewport(&mut self, id: &ViewportId) -> LayoutResult<()> {
        self.ensure_active("maximize_viewport")?;
        self.viewports.set_maximized(id, true)
    }

    /// Clear both the minimized and maximized flags.
    pub fn restore_viewport(&mut self, id: &ViewportId) -> LayoutResult<()> {
        self.ensure_active("restore_viewport")?;
        if !self.viewports.contains(id) {
            return Err(LayoutError::ViewportNotFound(id.to_string()));
        }
        self.viewports.set_minimized(id, false)?;
        self.viewports.set_maximized(id, false)
    }

    pub fn set_viewport_required(&mut self, id: &ViewportId, required: bool) -> LayoutResult<()> {
        self.ensure_active("set_viewport_required")?;
        self.viewports.set_required(id, required)
    }

    // ---------------------------------------------------------------------
    // Contexts and snapshots
    // ---------------------------------------------------------------------

    /// Stored snapshots of a context. The current context's live viewports
    /// are not included until it becomes outgoing.
    #[must_use]
    pub fn snapshots_for_context(&self, key: &ContextKey) -> &[ViewportSnapshot] {
        self.snapshots.snapshots_for_context(key)
    }

    /// Independent copy of a context and its snapshots. For the current
    /// context the live arrangement is merged in.
    pub fn snapshot_context(&self, key: &ContextKey) -> LayoutResult<ContextRecord> {
        let entry = self
            .contexts
            .entry(key)
            .ok_or_else(|| LayoutError::ContextNotFound(key.to_string()))?;
        Ok(ContextRecord::new(
            entry,
            self.persisted_snapshots(key, now_millis()),
        ))
    }

    /// Install a context record, replacing any stored snapshots of that
    /// context. The current context cannot be replaced while live.
    pub fn restore_context(&mut self, record: ContextRecord) -> Result<ContextKey, DocumentError> {
        record.validate()?;
        if self.is_live(&record.id) {
            warn!(context_key = %record.id, "restore of live context rejected");
            return Err(LayoutError::UnsupportedOperation {
                op: "restore_context",
                reason: "the current context is live; switch away before restoring it",
            }
            .into());
        }
        let key = self.contexts.restore(record.registered());
        debug!(
            context_key = %key,
            snapshots = record.viewport_snapshots.len(),
            "context snapshots restored"
        );
        self.snapshots.replace(&key, record.viewport_snapshots);
        Ok(key)
    }

    /// Forget the context `screen` classifies to, with its snapshots.
    /// Returns `Ok(false)` if it was not registered.
    pub fn remove_context(&mut self, screen: &ScreenRect) -> LayoutResult<bool> {
        self.ensure_active("remove_context")?;
        let key = classify(screen).key();
        if self.is_live(&key) {
            warn!(context_key = %key, "removal of current context rejected");
            return Err(LayoutError::UnsupportedOperation {
                op: "remove_context",
                reason: "the current context cannot be removed",
            });
        }
        if self.contexts.remove_key(&key).is_none() {
            return Ok(false);
        }
        self.snapshots.remove_context(&key);
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------------

    /// Export every context with its snapshots. The live arrangement of the
    /// current context is included without being persisted.
    #[must_use]
    pub fn to_document(&self) -> WorkspaceDocument {
        let timestamp = now_millis();
        let mut document = WorkspaceDocument::new(self.id.clone(), self.name.clone());
        document.workspace_contexts = self
            .contexts
            .iter()
            .filter_map(|(key, _)| self.contexts.entry(key))
            .map(|entry| {
                let key = entry.key();
                ContextRecord::new(entry, self.persisted_snapshots(&key, timestamp))
            })
            .collect();
        document
    }

    /// Rebuild a workspace from a document. Every context and snapshot set is
    /// installed; the workspace stays uninitialized until a surface is set.
    pub fn from_document(
        document: WorkspaceDocument,
        config: WorkspaceConfig,
    ) -> Result<Self, DocumentError> {
        let ids = SequentialIdGenerator::new(config.id_prefix.clone());
        Self::from_document_with(document, config, Box::new(ids), Rc::new(EventBus::new()))
    }

    /// [`from_document`](Self::from_document) with injected collaborators, so
    /// listeners can observe the restoration.
    pub fn from_document_with(
        document: WorkspaceDocument,
        config: WorkspaceConfig,
        ids: Box<dyn IdGenerator>,
        events: Rc<EventBus>,
    ) -> Result<Self, DocumentError> {
        document.validate()?;
        let mut workspace = Self::with_parts(config, ids, events).with_id(document.id);
        workspace.name = document.name;
        for record in document.workspace_contexts {
            workspace.restore_context(record)?;
        }
        info!(
            workspace_id = %workspace.id,
            contexts = workspace.contexts.len(),
            "workspace restored from document"
        );
        Ok(workspace)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn ensure_active(&self, op: &'static str) -> LayoutResult<()> {
        match self.state {
            WorkspaceState::Active => Ok(()),
            WorkspaceState::Uninitialized => Err(LayoutError::PreconditionViolation {
                op,
                reason: "no surface has been set",
            }),
        }
    }

    fn is_live(&self, key: &ContextKey) -> bool {
        self.state == WorkspaceState::Active && self.contexts.current_key() == Some(key)
    }

    fn unused_ids(&self) -> UnusedIds<'_> {
        UnusedIds {
            inner: self.ids.as_ref(),
            snapshots: &self.snapshots,
        }
    }

    /// Record a freshly created live viewport across all contexts. Rolls the
    /// viewport back if recording fails.
    fn propagate(
        &mut self,
        id: &ViewportId,
        rect: FractionalRect,
        flags: ViewportFlags,
    ) -> LayoutResult<()> {
        match self
            .snapshots
            .add_viewport(&self.contexts, id, rect, flags, now_millis())
        {
            Ok(written) => {
                for snapshot in written {
                    self.events.emit(&WorkspaceEvent::SnapshotCreated { snapshot });
                }
                Ok(())
            }
            Err(e) => {
                self.viewports.remove(id);
                Err(e)
            }
        }
    }

    /// Snapshots a context would persist right now.
    fn persisted_snapshots(&self, key: &ContextKey, timestamp: u64) -> Vec<ViewportSnapshot> {
        if self.is_live(key) {
            self.merged_snapshots(key, timestamp)
        } else {
            self.snapshots.snapshots_for_context(key).to_vec()
        }
    }

    /// Merge the live arrangement into `key`'s stored snapshots.
    ///
    /// Live viewports supersede their stored entries and keep live order.
    /// Stored entries without a live counterpart follow only if minimized;
    /// a visible one missing from the live set was removed.
    fn merged_snapshots(&self, key: &ContextKey, timestamp: u64) -> Vec<ViewportSnapshot> {
        let mut merged: Vec<ViewportSnapshot> = self
            .viewports
            .iter()
            .map(|v| {
                ViewportSnapshot::new(
                    v.id().clone(),
                    v.fractional_rect(),
                    v.flags(),
                    key.clone(),
                    timestamp,
                )
            })
            .collect();
        let kept: Vec<ViewportSnapshot> = self
            .snapshots
            .snapshots_for_context(key)
            .iter()
            .filter(|s| s.is_minimized && !self.viewports.contains(&s.id))
            .cloned()
            .collect();
        merged.extend(kept);
        merged
    }

    fn current_or_missing(&self, key: &ContextKey) -> LayoutResult<&Context> {
        self.contexts
            .current()
            .ok_or_else(|| LayoutError::ContextNotFound(key.to_string()))
    }

    fn viewport_or_missing(&self, id: &ViewportId) -> LayoutResult<&Viewport> {
        self.viewports
            .find(id)
            .ok_or_else(|| LayoutError::ViewportNotFound(id.to_string()))
    }
}
