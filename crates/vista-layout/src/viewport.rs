#![forbid(unsafe_code)]

//! Live viewports of one workspace surface.
//!
//! [`ViewportRegistry`] exclusively owns its [`Viewport`]s. Callers only ever
//! see `&Viewport`, whose fields are private: the id, rectangles, and state
//! flags are readable, and every mutation goes through a registry method.
//!
//! # Invariants
//!
//! 1. A viewport's fractional rectangle is the source of truth; its absolute
//!    rectangle is always `to_absolute(surface, fractional)`.
//! 2. Viewport ids are unique within a registry.
//! 3. Composite mutations (split) validate and compute everything before
//!    touching the collection, so a failure leaves the registry unchanged.
//! 4. At most one viewport is maximized at a time.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vista_core::{
    FractionalRect, IdGenerator, LayoutError, LayoutResult, ScreenRect, SplitDirection,
    split_with_ratio, to_absolute,
};

/// Opaque viewport identifier, unique within a workspace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewportId(String);

impl ViewportId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewportId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// State flags shared by live viewports and their snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportFlags {
    /// Synthesized as the full-surface fallback.
    pub is_default: bool,
    pub is_minimized: bool,
    pub is_maximized: bool,
    /// Must stay present in every arrangement of its context.
    pub is_required: bool,
}

impl ViewportFlags {
    /// Flags of the synthesized default viewport.
    pub const DEFAULT_VIEWPORT: Self = Self {
        is_default: true,
        is_minimized: false,
        is_maximized: false,
        is_required: false,
    };
}

/// A live viewport. Read-only outside of [`ViewportRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    id: ViewportId,
    fractional_rect: FractionalRect,
    absolute_rect: ScreenRect,
    flags: ViewportFlags,
}

impl Viewport {
    fn new(
        id: ViewportId,
        fractional_rect: FractionalRect,
        flags: ViewportFlags,
        surface: &ScreenRect,
    ) -> Self {
        Self {
            id,
            absolute_rect: to_absolute(surface, &fractional_rect),
            fractional_rect,
            flags,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ViewportId {
        &self.id
    }

    #[must_use]
    pub fn fractional_rect(&self) -> FractionalRect {
        self.fractional_rect
    }

    #[must_use]
    pub fn absolute_rect(&self) -> ScreenRect {
        self.absolute_rect
    }

    #[must_use]
    pub fn flags(&self) -> ViewportFlags {
        self.flags
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.flags.is_default
    }

    #[must_use]
    pub fn is_minimized(&self) -> bool {
        self.flags.is_minimized
    }

    #[must_use]
    pub fn is_maximized(&self) -> bool {
        self.flags.is_maximized
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.flags.is_required
    }
}

/// Minimum absolute size a split may produce.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MinimumSize {
    pub width: f64,
    pub height: f64,
}

impl MinimumSize {
    pub const NONE: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn admits(&self, rect: &ScreenRect) -> bool {
        rect.width >= self.width && rect.height >= self.height
    }
}

/// Owner of the live viewports of one surface.
#[derive(Debug, Clone, Default)]
pub struct ViewportRegistry {
    surface: ScreenRect,
    viewports: Vec<Viewport>,
    minimum: MinimumSize,
}

impl ViewportRegistry {
    #[must_use]
    pub fn new(surface: ScreenRect) -> Self {
        Self {
            surface,
            viewports: Vec::new(),
            minimum: MinimumSize::NONE,
        }
    }

    /// Set the minimum absolute size enforced by [`split`](Self::split).
    pub fn set_minimum_size(&mut self, minimum: MinimumSize) {
        self.minimum = minimum;
    }

    #[must_use]
    pub fn minimum_size(&self) -> MinimumSize {
        self.minimum
    }

    #[must_use]
    pub fn surface(&self) -> ScreenRect {
        self.surface
    }

    /// Create a viewport.
    ///
    /// Without a rectangle, the first viewport covers the full surface.
    /// Placing additional viewports automatically is not supported.
    pub fn create(
        &mut self,
        ids: &dyn IdGenerator,
        rect: Option<FractionalRect>,
    ) -> LayoutResult<&Viewport> {
        self.create_with(rect, |registry| registry.fresh_id(ids))
    }

    /// [`Self::create`] with the id drawn from `next_id` once every other
    /// check has passed.
    pub(crate) fn create_with(
        &mut self,
        rect: Option<FractionalRect>,
        next_id: impl FnOnce(&Self) -> LayoutResult<ViewportId>,
    ) -> LayoutResult<&Viewport> {
        let (rect, flags) = match rect {
            Some(rect) => {
                rect.validate()?;
                (rect, ViewportFlags::default())
            }
            None if self.viewports.is_empty() => {
                (FractionalRect::FULL, ViewportFlags::DEFAULT_VIEWPORT)
            }
            None => {
                warn!(
                    count = self.viewports.len(),
                    "viewport auto-placement requested"
                );
                return Err(LayoutError::UnsupportedOperation {
                    op: "create_viewport",
                    reason: "automatic placement is not supported once viewports exist; pass an explicit rectangle",
                });
            }
        };
        let id = next_id(self)?;
        debug!(viewport_id = %id, rect = %rect, "viewport created");
        self.viewports
            .push(Viewport::new(id, rect, flags, &self.surface));
        Ok(self.last())
    }

    /// Split `id` in half; the original keeps one half and a new viewport
    /// takes the other. Returns the new viewport.
    pub fn split(
        &mut self,
        ids: &dyn IdGenerator,
        id: &ViewportId,
        direction: SplitDirection,
    ) -> LayoutResult<&Viewport> {
        self.split_with_ratio(ids, id, direction, 0.5)
    }

    /// Split with `ratio` of the split axis kept by the original viewport.
    pub fn split_with_ratio(
        &mut self,
        ids: &dyn IdGenerator,
        id: &ViewportId,
        direction: SplitDirection,
        ratio: f64,
    ) -> LayoutResult<&Viewport> {
        self.split_with(id, direction, ratio, |registry| registry.fresh_id(ids))
    }

    /// [`Self::split_with_ratio`] with the new id drawn from `next_id` once
    /// both halves are known to fit.
    pub(crate) fn split_with(
        &mut self,
        id: &ViewportId,
        direction: SplitDirection,
        ratio: f64,
        next_id: impl FnOnce(&Self) -> LayoutResult<ViewportId>,
    ) -> LayoutResult<&Viewport> {
        let index = self
            .index_of(id)
            .ok_or_else(|| LayoutError::ViewportNotFound(id.to_string()))?;

        // Stage: compute both halves and validate before mutating anything.
        let halves = split_with_ratio(&self.viewports[index].fractional_rect, direction, ratio)?;
        // Finite inputs near f64::MAX can still overflow into a non-finite half.
        halves.keep.validate()?;
        halves.new.validate()?;
        let keep_abs = to_absolute(&self.surface, &halves.keep);
        let new_abs = to_absolute(&self.surface, &halves.new);
        if !self.minimum.admits(&keep_abs) || !self.minimum.admits(&new_abs) {
            warn!(viewport_id = %id, %direction, "split rejected below minimum size");
            return Err(LayoutError::invalid_argument(
                "direction",
                format!(
                    "splitting {id} {direction} would produce a viewport smaller than {}x{}",
                    self.minimum.width, self.minimum.height
                ),
            ));
        }
        let new_id = next_id(self)?;

        // Commit.
        let original = &mut self.viewports[index];
        original.fractional_rect = halves.keep;
        original.absolute_rect = keep_abs;
        original.flags.is_default = false;
        original.flags.is_maximized = false;
        debug!(viewport_id = %id, new_viewport_id = %new_id, %direction, "viewport split");
        self.viewports.push(Viewport {
            id: new_id,
            fractional_rect: halves.new,
            absolute_rect: new_abs,
            flags: ViewportFlags::default(),
        });
        Ok(self.last())
    }

    /// Remove a viewport. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &ViewportId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.viewports.remove(index);
                debug!(viewport_id = %id, "viewport removed");
                true
            }
            None => false,
        }
    }

    /// Adopt a new surface and re-derive every absolute rectangle.
    pub fn on_surface_change(&mut self, surface: ScreenRect) {
        self.surface = surface;
        for viewport in &mut self.viewports {
            viewport.absolute_rect = to_absolute(&surface, &viewport.fractional_rect);
        }
    }

    pub fn set_minimized(&mut self, id: &ViewportId, minimized: bool) -> LayoutResult<()> {
        let viewport = self.find_mut(id)?;
        viewport.flags.is_minimized = minimized;
        if minimized {
            viewport.flags.is_maximized = false;
        }
        Ok(())
    }

    /// Maximizing one viewport clears the flag on all others.
    pub fn set_maximized(&mut self, id: &ViewportId, maximized: bool) -> LayoutResult<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| LayoutError::ViewportNotFound(id.to_string()))?;
        if maximized {
            for viewport in &mut self.viewports {
                viewport.flags.is_maximized = false;
            }
            self.viewports[index].flags.is_minimized = false;
        }
        self.viewports[index].flags.is_maximized = maximized;
        Ok(())
    }

    pub fn set_required(&mut self, id: &ViewportId, required: bool) -> LayoutResult<()> {
        self.find_mut(id)?.flags.is_required = required;
        Ok(())
    }

    #[must_use]
    pub fn find(&self, id: &ViewportId) -> Option<&Viewport> {
        self.viewports.iter().find(|v| &v.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ViewportId) -> bool {
        self.index_of(id).is_some()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.viewports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    /// Viewports in creation order.
    #[must_use]
    pub fn list(&self) -> &[Viewport] {
        &self.viewports
    }

    pub fn iter(&self) -> impl Iterator<Item = &Viewport> {
        self.viewports.iter()
    }

    pub fn clear(&mut self) {
        self.viewports.clear();
    }

    /// Swap in a fully staged arrangement for a new surface.
    ///
    /// Ids must be unique; the caller builds the arrangement from snapshots.
    pub(crate) fn replace_all(
        &mut self,
        surface: ScreenRect,
        staged: Vec<(ViewportId, FractionalRect, ViewportFlags)>,
    ) {
        self.surface = surface;
        self.viewports = staged
            .into_iter()
            .map(|(id, rect, flags)| Viewport::new(id, rect, flags, &surface))
            .collect();
    }

    fn index_of(&self, id: &ViewportId) -> Option<usize> {
        self.viewports.iter().position(|v| &v.id == id)
    }

    fn find_mut(&mut self, id: &ViewportId) -> LayoutResult<&mut Viewport> {
        self.viewports
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| LayoutError::ViewportNotFound(id.to_string()))
    }

    fn fresh_id(&self, ids: &dyn IdGenerator) -> LayoutResult<ViewportId> {
        self.ensure_unused(ViewportId(ids.generate()))
    }

    /// Reject an id already held by a live viewport.
    pub(crate) fn ensure_unused(&self, id: ViewportId) -> LayoutResult<ViewportId> {
        if self.contains(&id) {
            return Err(LayoutError::invalid_argument(
                "id",
                format!("id generator produced duplicate id {id}"),
            ));
        }
        Ok(id)
    }

    fn last(&self) -> &Viewport {
        // Only called right after a push.
        &self.viewports[self.viewports.len() - 1]
    }
}
