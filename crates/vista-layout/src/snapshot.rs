#![forbid(unsafe_code)]

//! Per-context viewport snapshots and area-based visibility migration.
//!
//! A [`ViewportSnapshot`] is the durable record of one viewport inside one
//! context. [`SnapshotStore`] keeps an insertion-ordered list of them per
//! [`ContextKey`].
//!
//! # Visibility migration
//!
//! [`SnapshotStore::add_viewport`] records a new viewport in every registered
//! context at once:
//!
//! - the current context gets a visible snapshot with the rectangle;
//! - contexts with strictly smaller screen area get a minimized snapshot
//!   without a rectangle;
//! - contexts with equal or larger area get a visible snapshot with the same
//!   fractional rectangle.
//!
//! Equal area never minimizes.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vista_core::{FractionalRect, LayoutError, LayoutResult};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::context::ContextKey;
use crate::registry::ContextRegistry;
use crate::viewport::{ViewportFlags, ViewportId};

/// One viewport's state within one context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSnapshot {
    pub id: ViewportId,
    /// Absent while minimized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fractional_rect: Option<FractionalRect>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_minimized: bool,
    #[serde(default)]
    pub is_maximized: bool,
    #[serde(default)]
    pub is_required: bool,
    pub owning_context_id: ContextKey,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
}

impl ViewportSnapshot {
    /// Record a viewport. Minimized flags drop the rectangle.
    #[must_use]
    pub fn new(
        id: ViewportId,
        rect: FractionalRect,
        flags: ViewportFlags,
        context: ContextKey,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            fractional_rect: (!flags.is_minimized).then_some(rect),
            is_default: flags.is_default,
            is_minimized: flags.is_minimized,
            is_maximized: flags.is_maximized,
            is_required: flags.is_required,
            owning_context_id: context,
            timestamp,
        }
    }

    /// A minimized record; geometry is meaningless while minimized.
    #[must_use]
    pub fn minimized(
        id: ViewportId,
        flags: ViewportFlags,
        context: ContextKey,
        timestamp: u64,
    ) -> Self {
        Self {
            id,
            fractional_rect: None,
            is_default: flags.is_default,
            is_minimized: true,
            is_maximized: false,
            is_required: flags.is_required,
            owning_context_id: context,
            timestamp,
        }
    }

    #[must_use]
    pub fn flags(&self) -> ViewportFlags {
        ViewportFlags {
            is_default: self.is_default,
            is_minimized: self.is_minimized,
            is_maximized: self.is_maximized,
            is_required: self.is_required,
        }
    }

    /// Visible snapshots carry a rectangle and are materialized on restore.
    #[must_use]
    pub fn visible_rect(&self) -> Option<FractionalRect> {
        if self.is_minimized {
            None
        } else {
            self.fractional_rect
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Ordered viewport snapshots per context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotStore {
    entries: FxHashMap<ContextKey, Vec<ViewportSnapshot>>,
}

impl SnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new viewport across every registered context, relative to
    /// the current one. Returns the snapshots written, in registry order.
    pub fn add_viewport(
        &mut self,
        contexts: &ContextRegistry,
        id: &ViewportId,
        rect: FractionalRect,
        flags: ViewportFlags,
        timestamp: u64,
    ) -> LayoutResult<Vec<ViewportSnapshot>> {
        rect.validate()?;
        let Some(current_key) = contexts.current_key() else {
            return Err(LayoutError::PreconditionViolation {
                op: "add_viewport",
                reason: "no current context",
            });
        };
        let current_area = contexts
            .get(current_key)
            .map(|c| c.area())
            .ok_or_else(|| LayoutError::ContextNotFound(current_key.to_string()))?;

        // Stage every snapshot before touching the store.
        let staged: Vec<ViewportSnapshot> = contexts
            .iter()
            .map(|(key, context)| {
                if key != current_key && context.area() < current_area {
                    ViewportSnapshot::minimized(id.clone(), flags, key.clone(), timestamp)
                } else {
                    let flags = ViewportFlags {
                        is_minimized: false,
                        ..flags
                    };
                    ViewportSnapshot::new(id.clone(), rect, flags, key.clone(), timestamp)
                }
            })
            .collect();

        for snapshot in &staged {
            self.upsert(snapshot.clone());
        }
        debug!(
            viewport_id = %id,
            current = %current_key,
            contexts = staged.len(),
            minimized = staged.iter().filter(|s| s.is_minimized).count(),
            "viewport snapshot recorded"
        );
        Ok(staged)
    }

    /// Snapshots of one context in insertion order.
    #[must_use]
    pub fn snapshots_for_context(&self, key: &ContextKey) -> &[ViewportSnapshot] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has_snapshots(&self, key: &ContextKey) -> bool {
        self.entries.get(key).is_some_and(|v| !v.is_empty())
    }

    /// Whether any context holds a snapshot with this viewport id.
    #[must_use]
    pub fn contains_viewport(&self, id: &ViewportId) -> bool {
        self.entries
            .values()
            .any(|list| list.iter().any(|s| &s.id == id))
    }

    /// Insert or replace (by viewport id) within the snapshot's own context.
    pub fn upsert(&mut self, snapshot: ViewportSnapshot) {
        let list = self
            .entries
            .entry(snapshot.owning_context_id.clone())
            .or_default();
        match list.iter_mut().find(|s| s.id == snapshot.id) {
            Some(existing) => *existing = snapshot,
            None => list.push(snapshot),
        }
    }

    /// Replace a context's snapshots wholesale, returning the previous set.
    pub fn replace(
        &mut self,
        key: &ContextKey,
        snapshots: Vec<ViewportSnapshot>,
    ) -> Vec<ViewportSnapshot> {
        self.entries.insert(key.clone(), snapshots).unwrap_or_default()
    }

    /// Drop a context's snapshots entirely.
    pub fn remove_context(&mut self, key: &ContextKey) -> Vec<ViewportSnapshot> {
        self.entries.remove(key).unwrap_or_default()
    }

    /// Number of contexts with a snapshot entry.
    #[must_use]
    pub fn context_count(&self) -> usize {
        self.entries.len()
    }

    /// Total snapshots across all contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
