#![forbid(unsafe_code)]

//! Injected identifier generation.
//!
//! Every viewport id comes from an [`IdGenerator`]. The workspace never
//! invents ids itself, so tests can substitute [`SequentialIdGenerator`] for
//! deterministic, monotonically distinguishable ids.

use std::cell::Cell;

/// Source of unique identifier strings.
///
/// Uniqueness is required within one workspace; generators take `&self` so
/// they can be shared behind `Rc`.
pub trait IdGenerator {
    fn generate(&self) -> String;
}

/// Produces `"{prefix}-1"`, `"{prefix}-2"`, ...
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIdGenerator {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    /// Start counting at `first`, e.g. to continue after ids loaded from a document.
    #[must_use]
    pub fn starting_at(prefix: impl Into<String>, first: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(first),
        }
    }

    /// Number of the id that will be generated next.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.get()
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("viewport")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate(&self) -> String {
        let n = self.next.get();
        self.next.set(n.saturating_add(1));
        format!("{}-{}", self.prefix, n)
    }
}

/// Random v4 UUID ids.
#[cfg(feature = "uuid")]
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

#[cfg(feature = "uuid")]
impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for std::rc::Rc<G> {
    fn generate(&self) -> String {
        (**self).generate()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn generate(&self) -> String {
        (**self).generate()
    }
}
