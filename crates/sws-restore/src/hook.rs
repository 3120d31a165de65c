//! The seam between restoration and the window manager.

use std::future::Future;
use std::sync::Arc;

use sws_model::{WindowId, WindowKind};
use thiserror::Error;

/// Why a window surface could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("window surface rejected activation: {0}")]
    Rejected(String),

    #[error("window manager unavailable: {0}")]
    Unavailable(String),
}

/// Opens the surface for a restored window.
///
/// Called once per window, in order, on the task running the restore.
pub trait ActivationHook: Send + Sync {
    fn open(
        &self,
        kind: WindowKind,
        id: WindowId,
    ) -> impl Future<Output = Result<(), ActivationError>> + Send;
}

impl<H: ActivationHook> ActivationHook for Arc<H> {
    fn open(
        &self,
        kind: WindowKind,
        id: WindowId,
    ) -> impl Future<Output = Result<(), ActivationError>> + Send {
        (**self).open(kind, id)
    }
}

/// Adapts an async closure into an [`ActivationHook`].
///
/// ```ignore
/// let hook = FnActivationHook::new(|kind, id| async move {
///     window_manager.open(kind, id).await
/// });
/// ```
#[derive(Clone)]
pub struct FnActivationHook<F> {
    open: F,
}

impl<F> FnActivationHook<F> {
    pub fn new(open: F) -> Self {
        Self { open }
    }
}

impl<F> std::fmt::Debug for FnActivationHook<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnActivationHook").finish_non_exhaustive()
    }
}

impl<F, Fut> ActivationHook for FnActivationHook<F>
where
    F: Fn(WindowKind, WindowId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ActivationError>> + Send,
{
    fn open(
        &self,
        kind: WindowKind,
        id: WindowId,
    ) -> impl Future<Output = Result<(), ActivationError>> + Send {
        (self.open)(kind, id)
    }
}
