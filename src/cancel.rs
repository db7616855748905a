//! Cooperative cancellation for region copies and tile generation.
//!
//! Rendering entry points take an explicit [`CancelToken`] and return a
//! [`RenderStatus`], so an interactive caller can abandon a stale paint
//! without poisoning the cache: the pipeline checks the token between
//! tile-block computations and never commits a tile generated after the
//! token fired.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag requesting that in-progress rendering stop early.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation. Irrevocable for this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a region-copy call.
///
/// A `Cancelled` result means the destination raster is only partially
/// filled and must not be treated as a complete render; nothing invalid
/// was committed to the cache. Construction errors cannot surface here:
/// region fills are total functions once a graph has been built.
#[must_use = "a cancelled copy leaves the destination partially filled"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Every requested pixel was produced.
    Complete,
    /// The cancel token fired; the destination is incomplete.
    Cancelled,
}

impl RenderStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, RenderStatus::Complete)
    }
}
