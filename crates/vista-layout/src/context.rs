#![forbid(unsafe_code)]

//! Context classification: screen rectangle to [`Context`] descriptor.
//!
//! A [`Context`] summarizes a surface size as an orientation, a width
//! [`Breakpoint`] with its 1:1 [`SizeCategory`], and a [`DeviceType`] guess.
//! Workspaces keep one viewport arrangement per context, keyed by
//! [`ContextKey`].
//!
//! # Usage
//!
//! ```
//! use vista_core::ScreenRect;
//! use vista_layout::context::{classify, Breakpoint, DeviceType, Orientation};
//!
//! let ctx = classify(&ScreenRect::from_size(1920.0, 1080.0));
//! assert_eq!(ctx.orientation, Orientation::Landscape);
//! assert_eq!(ctx.breakpoint, Breakpoint::Lg);
//! assert_eq!(ctx.device_type, DeviceType::LargeLaptop);
//! assert_eq!(ctx.key().as_str(), "landscape-lg-1920x1080");
//! ```
//!
//! # Invariants
//!
//! 1. [`classify`] is pure: identical input yields structurally equal output.
//! 2. Breakpoint bands are inclusive on their lower bound.
//! 3. Device rules are evaluated top to bottom and the first match wins.
//! 4. The key embeds width and height verbatim, so two sizes in the same
//!    breakpoint still produce distinct keys.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use vista_core::ScreenRect;

/// Landscape when `width >= height` (squares count as landscape).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    #[must_use]
    pub fn from_size(width: f64, height: f64) -> Self {
        if width >= height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width breakpoint tiers, ordered smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Breakpoint {
    /// `width < 1024`
    Sm,
    /// `1024 <= width < 1600`
    Md,
    /// `1600 <= width < 2560`
    Lg,
    /// `width >= 2560`
    Xl,
}

impl Breakpoint {
    pub const ALL: [Self; 4] = [Self::Sm, Self::Md, Self::Lg, Self::Xl];

    /// Lower bound (inclusive) of each tier above `Sm`.
    pub const MD_MIN_WIDTH: f64 = 1024.0;
    pub const LG_MIN_WIDTH: f64 = 1600.0;
    pub const XL_MIN_WIDTH: f64 = 2560.0;

    #[must_use]
    pub fn from_width(width: f64) -> Self {
        if width >= Self::XL_MIN_WIDTH {
            Self::Xl
        } else if width >= Self::LG_MIN_WIDTH {
            Self::Lg
        } else if width >= Self::MD_MIN_WIDTH {
            Self::Md
        } else {
            Self::Sm
        }
    }

    #[must_use]
    pub const fn size_category(self) -> SizeCategory {
        match self {
            Self::Sm => SizeCategory::Small,
            Self::Md => SizeCategory::Medium,
            Self::Lg => SizeCategory::Large,
            Self::Xl => SizeCategory::ExtraLarge,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-oriented size label, one per [`Breakpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizeCategory {
    #[must_use]
    pub const fn breakpoint(self) -> Breakpoint {
        match self {
            Self::Small => Breakpoint::Sm,
            Self::Medium => Breakpoint::Md,
            Self::Large => Breakpoint::Lg,
            Self::ExtraLarge => Breakpoint::Xl,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::ExtraLarge => "extra-large",
        }
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device class guessed from width and aspect ratio.
///
/// `Tablet` and `Laptop` are generic labels accepted from persisted
/// documents; [`classify`] never produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    Phone,
    Phablet,
    Foldable,
    Tablet,
    SmallTablet,
    LargeTablet,
    Laptop,
    CompactLaptop,
    StandardLaptop,
    LargeLaptop,
    Desktop,
    Ultrawide,
    Tv,
    WallDisplay,
}

impl DeviceType {
    pub const ALL: [Self; 14] = [
        Self::Phone,
        Self::Phablet,
        Self::Foldable,
        Self::Tablet,
        Self::SmallTablet,
        Self::LargeTablet,
        Self::Laptop,
        Self::CompactLaptop,
        Self::StandardLaptop,
        Self::LargeLaptop,
        Self::Desktop,
        Self::Ultrawide,
        Self::Tv,
        Self::WallDisplay,
    ];

    /// Ordered rule cascade. First match wins.
    #[must_use]
    pub fn from_metrics(width: f64, aspect_ratio: f64) -> Self {
        let w = width;
        let ar = aspect_ratio;
        let laptop_ratio = (1.3..=1.8).contains(&ar);
        let tablet_ratio = (0.7..=1.6).contains(&ar);

        if ar > 2.2 {
            Self::Ultrawide
        } else if w > 3000.0 {
            Self::WallDisplay
        } else if w > 2000.0 && w <= 3000.0 && (1.7..=1.9).contains(&ar) {
            Self::Tv
        } else if (600.0..1200.0).contains(&w) && ar > 1.8 && ar <= 2.1 {
            Self::Foldable
        } else if w > 2000.0 && laptop_ratio {
            Self::Desktop
        } else if w < 500.0 && ar < 0.6 {
            Self::Phone
        } else if (500.0..700.0).contains(&w) && (ar < 0.7 || ar > 1.4) {
            Self::Phablet
        } else if (600.0..900.0).contains(&w) && tablet_ratio {
            Self::SmallTablet
        } else if (900.0..1200.0).contains(&w) && tablet_ratio {
            Self::LargeTablet
        } else if (1200.0..1400.0).contains(&w) && laptop_ratio {
            Self::CompactLaptop
        } else if (1400.0..1800.0).contains(&w) && laptop_ratio {
            Self::StandardLaptop
        } else if (1800.0..=2000.0).contains(&w) && laptop_ratio {
            Self::LargeLaptop
        } else {
            Self::Desktop
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Phablet => "phablet",
            Self::Foldable => "foldable",
            Self::Tablet => "tablet",
            Self::SmallTablet => "small-tablet",
            Self::LargeTablet => "large-tablet",
            Self::Laptop => "laptop",
            Self::CompactLaptop => "compact-laptop",
            Self::StandardLaptop => "standard-laptop",
            Self::LargeLaptop => "large-laptop",
            Self::Desktop => "desktop",
            Self::Ultrawide => "ultrawide",
            Self::Tv => "tv",
            Self::WallDisplay => "wall-display",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical cache key: `"{orientation}-{breakpoint}-{width}x{height}"`.
///
/// Persisted documents embed this string; changing the format needs a
/// document migration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextKey(String);

impl ContextKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ContextKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContextKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ContextKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Classification of one surface size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub orientation: Orientation,
    /// `width / height`, or `0.0` when the height is zero.
    pub aspect_ratio: f64,
    pub breakpoint: Breakpoint,
    pub size_category: SizeCategory,
    pub device_type: DeviceType,
    pub screen_rect: ScreenRect,
}

impl Context {
    #[must_use]
    pub fn key(&self) -> ContextKey {
        generate_key(self)
    }

    /// Screen area in square device units.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.screen_rect.area()
    }

    /// Display label, e.g. `"large-laptop landscape (lg)"`.
    #[must_use]
    pub fn name(&self) -> String {
        format!(
            "{} {} ({})",
            self.device_type, self.orientation, self.breakpoint
        )
    }
}

/// Classify a screen rectangle.
#[must_use]
pub fn classify(screen: &ScreenRect) -> Context {
    let ScreenRect { width, height, .. } = *screen;
    let aspect_ratio = if height == 0.0 { 0.0 } else { width / height };
    let breakpoint = Breakpoint::from_width(width);
    Context {
        orientation: Orientation::from_size(width, height),
        aspect_ratio,
        breakpoint,
        size_category: breakpoint.size_category(),
        device_type: DeviceType::from_metrics(width, aspect_ratio),
        screen_rect: *screen,
    }
}

/// Canonical key for a context.
#[must_use]
pub fn generate_key(context: &Context) -> ContextKey {
    ContextKey(format!(
        "{}-{}-{}x{}",
        context.orientation,
        context.breakpoint,
        context.screen_rect.width,
        context.screen_rect.height
    ))
}
