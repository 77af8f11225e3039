#![forbid(unsafe_code)]

//! Core primitives for Vista workspaces.
//!
//! - [`geometry`]: screen and fractional rectangles, the absolute/fractional
//!   conversion, and axis-aligned splits.
//! - [`id`]: the injected identifier capability.
//! - [`error`]: the shared error model.

pub mod error;
pub mod geometry;
pub mod id;

pub use error::{ErrorKind, LayoutError, LayoutResult};
pub use geometry::{
    FractionalRect, ScreenRect, SplitDirection, SplitHalves, split, split_with_ratio, to_absolute,
    to_fractional,
};
#[cfg(feature = "uuid")]
pub use id::UuidIdGenerator;
pub use id::{IdGenerator, SequentialIdGenerator};
