//! Restoration of parsed workspace documents into a live registry.
//!
//! A restore runs in three steps on the task that owns the registry:
//!
//! 1. optionally clear the registry
//! 2. plan an id for every candidate so nothing collides with live windows
//! 3. insert and activate candidates one at a time, pacing between them
//!
//! Activation goes through an [`ActivationHook`], the seam to whatever opens
//! the actual window surfaces. A failing hook only fails its own window.

#![deny(unsafe_code)]

mod engine;
mod hook;
mod options;
mod progress;
mod remap;

pub use engine::{FailedWindow, RestorationEngine, RestorationResult, RestoreFailure, RestoredWindow};
pub use hook::{ActivationError, ActivationHook, FnActivationHook};
pub use options::{DEFAULT_PACING, RestoreOptions};
pub use progress::{CompletionKind, RestorePhase, RestoreProgress};
pub use remap::{IdRemap, plan_id_remap};
