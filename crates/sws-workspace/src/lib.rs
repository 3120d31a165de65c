//! Workspace persistence facade.
//!
//! Wires the document codec, storage and restoration engine into a
//! [`WorkspaceSession`], and carries the ambient pieces an application needs
//! around it: [`Settings`] persisted as TOML and [`logging`] setup.
//!
//! # Example
//!
//! ```ignore
//! use sws_workspace::{Settings, WorkspaceSession};
//! use sws_restore::FnActivationHook;
//!
//! let settings = Settings::load();
//! let hook = FnActivationHook::new(|kind, id| window_manager.open(kind, id));
//! let session = WorkspaceSession::from_settings(&settings, hook)?;
//!
//! session.export_to_store(registry.snapshot(), None, settings.export).await?;
//! let report = session
//!     .import("workspace_20260101_120000.ipynb", &mut registry, &(&settings.restore).into(), |p| {
//!         progress_bar.set(p.fraction);
//!     })
//!     .await?;
//! ```

#![deny(unsafe_code)]

mod error;
pub mod logging;
mod session;
mod settings;

pub use error::{Result, WorkspaceError};
pub use session::{ExportReport, ImportReport, WorkspaceSession};
pub use settings::{RestoreSettings, Settings, StorageSettings, TableSettings};
