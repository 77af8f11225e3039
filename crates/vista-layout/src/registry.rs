#![forbid(unsafe_code)]

//! Cache of classified contexts with a current-context pointer.
//!
//! [`ContextRegistry`] holds one [`RegisteredContext`] per [`ContextKey`],
//! created lazily the first time a surface with that signature is seen.
//! Lifecycle notifications go to the [`NotificationSink`] injected at
//! construction.
//!
//! # Invariants
//!
//! 1. `resolve` is idempotent for identical screens: the second call neither
//!    creates an entry nor emits `contextCreated`.
//! 2. Iteration follows first-registration order.
//! 3. Removing the current context clears the current pointer.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use vista_core::ScreenRect;

use crate::context::{Context, ContextKey, classify};
use crate::events::{NotificationSink, WorkspaceEvent};
use crate::viewport::MinimumSize;

/// A registered context plus the per-context minimum viewport size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredContext {
    pub context: Context,
    pub minimum_viewport: MinimumSize,
}

impl RegisteredContext {
    #[must_use]
    pub fn key(&self) -> ContextKey {
        self.context.key()
    }
}

/// Registry of contexts keyed by their canonical key.
pub struct ContextRegistry {
    entries: FxHashMap<ContextKey, RegisteredContext>,
    order: Vec<ContextKey>,
    current: Option<ContextKey>,
    default_minimum: MinimumSize,
    sink: Rc<dyn NotificationSink>,
}

impl fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("order", &self.order)
            .field("current", &self.current)
            .field("default_minimum", &self.default_minimum)
            .finish_non_exhaustive()
    }
}

impl ContextRegistry {
    #[must_use]
    pub fn new(sink: Rc<dyn NotificationSink>) -> Self {
        Self::with_minimum(sink, MinimumSize::NONE)
    }

    /// New contexts are stamped with `default_minimum`.
    #[must_use]
    pub fn with_minimum(sink: Rc<dyn NotificationSink>, default_minimum: MinimumSize) -> Self {
        Self {
            entries: FxHashMap::default(),
            order: Vec::new(),
            current: None,
            default_minimum,
            sink,
        }
    }

    /// Classify `screen`, register it if new, and make it current.
    pub fn resolve(&mut self, screen: &ScreenRect) -> &Context {
        let context = classify(screen);
        let key = context.key();
        if !self.entries.contains_key(&key) {
            info!(context_key = %key, device = %context.device_type, "context created");
            self.sink.emit(&WorkspaceEvent::ContextCreated {
                context: context.clone(),
            });
            self.order.push(key.clone());
            self.entries.insert(
                key.clone(),
                RegisteredContext {
                    context,
                    minimum_viewport: self.default_minimum,
                },
            );
        }
        self.current = Some(key.clone());
        &self.entries[&key].context
    }

    /// Remove the context `screen` classifies to, if registered.
    pub fn remove(&mut self, screen: &ScreenRect) -> Option<Context> {
        self.remove_key(&classify(screen).key())
    }

    /// Remove a context by key.
    pub fn remove_key(&mut self, key: &ContextKey) -> Option<Context> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        if self.current.as_ref() == Some(key) {
            self.current = None;
        }
        info!(context_key = %key, "context removed");
        self.sink.emit(&WorkspaceEvent::ContextRemoved {
            context: removed.context.clone(),
        });
        Some(removed.context)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Context> {
        self.current_entry().map(|e| &e.context)
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&RegisteredContext> {
        self.current.as_ref().and_then(|k| self.entries.get(k))
    }

    #[must_use]
    pub fn current_key(&self) -> Option<&ContextKey> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn get(&self, key: &ContextKey) -> Option<&Context> {
        self.entries.get(key).map(|e| &e.context)
    }

    #[must_use]
    pub fn entry(&self, key: &ContextKey) -> Option<&RegisteredContext> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &ContextKey) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contexts in first-registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ContextKey, &Context)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|e| (k, &e.context)))
    }

    /// Deep copy of one registered context.
    #[must_use]
    pub fn snapshot(&self, key: &ContextKey) -> Option<RegisteredContext> {
        self.entries.get(key).cloned()
    }

    /// Install a context under its recomputed key.
    ///
    /// Emits `contextCreated` for a new key and `contextUpdated` when an
    /// existing entry is overwritten. The current pointer is unchanged.
    pub fn restore(&mut self, entry: RegisteredContext) -> ContextKey {
        // Recompute from geometry so a stale or hand-edited descriptor
        // cannot land under the wrong key.
        let context = classify(&entry.context.screen_rect);
        let key = context.key();
        let entry = RegisteredContext {
            context,
            minimum_viewport: entry.minimum_viewport,
        };
        let event = if self.entries.contains_key(&key) {
            WorkspaceEvent::ContextUpdated {
                context: entry.context.clone(),
            }
        } else {
            self.order.push(key.clone());
            WorkspaceEvent::ContextCreated {
                context: entry.context.clone(),
            }
        };
        self.entries.insert(key.clone(), entry);
        info!(context_key = %key, event = %event.kind(), "context restored");
        self.sink.emit(&event);
        key
    }

    /// Announce that a context's snapshot set changed.
    pub(crate) fn notify_updated(&self, key: &ContextKey) {
        if let Some(entry) = self.entries.get(key) {
            self.sink.emit(&WorkspaceEvent::ContextUpdated {
                context: entry.context.clone(),
            });
        }
    }
}
