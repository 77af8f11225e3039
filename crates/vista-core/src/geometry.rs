#![forbid(unsafe_code)]

//! Geometric primitives and the fractional geometry engine.
//!
//! Layouts are stored as [`FractionalRect`]s, which are resolution
//! independent: each component is a fraction of some [`ScreenRect`]. The
//! absolute rectangle of a viewport is always derived from its fractional
//! rectangle and the current surface, never stored as the source of truth.
//!
//! # Invariants
//!
//! 1. [`to_absolute`] performs no rounding and no clamping.
//! 2. [`split`] produces two halves that exactly tile the input: the shared
//!    edge coordinate matches and the areas sum to the original area.
//! 3. [`to_fractional`] inverts [`to_absolute`] for any screen with non-zero
//!    width and height.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// A rectangle in absolute device units.
///
/// Origin is top-left. `width` and `height` are expected to be non-negative;
/// use [`ScreenRect::try_new`] at API boundaries to enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    /// Create a rectangle without validation.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Create a rectangle, rejecting negative or non-finite components.
    pub fn try_new(x: f64, y: f64, width: f64, height: f64) -> LayoutResult<Self> {
        let rect = Self::new(x, y, width, height);
        rect.validate()?;
        Ok(rect)
    }

    /// Check that every component is finite and the size is non-negative.
    pub fn validate(&self) -> LayoutResult<()> {
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(LayoutError::invalid_argument(
                "screen_rect",
                format!("components must be finite, got {self}"),
            ));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(LayoutError::invalid_argument(
                "screen_rect",
                format!("width and height must be >= 0, got {self}"),
            ));
        }
        Ok(())
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Area in square device units.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Round every component to the nearest integer.
    ///
    /// The engine itself never rounds; this is for consumers that need
    /// pixel-quantized output.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(
            self.x.round(),
            self.y.round(),
            self.width.round(),
            self.height.round(),
        )
    }
}

impl fmt::Display for ScreenRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// A rectangle expressed as fractions of some [`ScreenRect`].
///
/// Components are nominally in `[0, 1]` but are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FractionalRect {
    /// The whole surface.
    pub const FULL: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Reject non-finite components and negative sizes.
    ///
    /// Values outside `[0, 1]` are allowed.
    pub fn validate(&self) -> LayoutResult<()> {
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(LayoutError::invalid_argument(
                "fractional_rect",
                format!("components must be finite, got {self}"),
            ));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(LayoutError::invalid_argument(
                "fractional_rect",
                format!("width and height must be >= 0, got {self}"),
            ));
        }
        Ok(())
    }

    /// Right edge as a fraction.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge as a fraction.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Fraction of the surface covered.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Approximate equality within `epsilon` on every component.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

impl Default for FractionalRect {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for FractionalRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Direction in which a new viewport is created by a split.
///
/// `Down` keeps the top half and creates the new rectangle below it; `Up`
/// keeps the bottom half and creates the new one above. `Right` keeps the
/// left half, `Left` keeps the right half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SplitDirection {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Whether the split bisects the height axis.
    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitDirection {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(LayoutError::invalid_argument(
                "direction",
                format!("unsupported split direction '{other}'"),
            )),
        }
    }
}

/// Result of splitting a rectangle: the half that stays with the original
/// viewport and the half handed to the new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitHalves {
    pub keep: FractionalRect,
    pub new: FractionalRect,
}

/// Resolve a fractional rectangle against a screen.
#[must_use]
pub fn to_absolute(screen: &ScreenRect, frac: &FractionalRect) -> ScreenRect {
    ScreenRect {
        x: screen.x + screen.width * frac.x,
        y: screen.y + screen.height * frac.y,
        width: screen.width * frac.width,
        height: screen.height * frac.height,
    }
}

/// Express an absolute rectangle as fractions of `screen`.
///
/// A zero-sized screen axis maps to `0.0` on that axis.
#[must_use]
pub fn to_fractional(screen: &ScreenRect, abs: &ScreenRect) -> FractionalRect {
    let fx = |offset: f64| {
        if screen.width == 0.0 {
            0.0
        } else {
            offset / screen.width
        }
    };
    let fy = |offset: f64| {
        if screen.height == 0.0 {
            0.0
        } else {
            offset / screen.height
        }
    };
    FractionalRect {
        x: fx(abs.x - screen.x),
        y: fy(abs.y - screen.y),
        width: fx(abs.width),
        height: fy(abs.height),
    }
}

/// Bisect `frac` along the axis implied by `direction`.
#[must_use]
pub fn split(frac: &FractionalRect, direction: SplitDirection) -> SplitHalves {
    split_unchecked(frac, direction, 0.5)
}

/// Split `frac` giving `ratio` of the split axis to the kept half.
///
/// `ratio` must be finite and strictly between 0 and 1.
pub fn split_with_ratio(
    frac: &FractionalRect,
    direction: SplitDirection,
    ratio: f64,
) -> LayoutResult<SplitHalves> {
    if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
        return Err(LayoutError::invalid_argument(
            "ratio",
            format!("split ratio must be in (0, 1), got {ratio}"),
        ));
    }
    Ok(split_unchecked(frac, direction, ratio))
}

fn split_unchecked(frac: &FractionalRect, direction: SplitDirection, ratio: f64) -> SplitHalves {
    let FractionalRect {
        x,
        y,
        width,
        height,
    } = *frac;
    match direction {
        SplitDirection::Down => {
            let keep_h = height * ratio;
            SplitHalves {
                keep: FractionalRect::new(x, y, width, keep_h),
                new: FractionalRect::new(x, y + keep_h, width, height - keep_h),
            }
        }
        SplitDirection::Up => {
            let new_h = height - height * ratio;
            SplitHalves {
                keep: FractionalRect::new(x, y + new_h, width, height - new_h),
                new: FractionalRect::new(x, y, width, new_h),
            }
        }
        SplitDirection::Right => {
            let keep_w = width * ratio;
            SplitHalves {
                keep: FractionalRect::new(x, y, keep_w, height),
                new: FractionalRect::new(x + keep_w, y, width - keep_w, height),
            }
        }
        SplitDirection::Left => {
            let new_w = width - width * ratio;
            SplitHalves {
                keep: FractionalRect::new(x + new_w, y, width - new_w, height),
                new: FractionalRect::new(x, y, new_w, height),
            }
        }
    }
}
