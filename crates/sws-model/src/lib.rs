//! Window record model for Spatial Workspace Studio.
//!
//! Every other crate in the workspace operates on the types defined here:
//!
//! - [`WindowRecord`] - one visual panel (identity, placement, payload, tags, content)
//! - [`WindowKind`] / [`WindowPayload`] - closed sets of window types and typed bodies
//! - [`Registry`] - the live set of windows owned by the window manager
//! - [`RegistrySnapshot`] - an owned, read-only copy handed to the exporter
//!
//! # Invariants
//!
//! - A payload, when present, always matches the record's kind.
//! - Ids are unique within one registry; the registry's id generator never
//!   hands out an id that is or was live in it.

#![deny(unsafe_code)]

mod error;
mod kind;
mod payload;
mod position;
mod record;
mod registry;

pub use error::{ModelError, Result};
pub use kind::WindowKind;
pub use payload::{
    ChartSeries, ChartStyle, CloudPoint, MeshBuffer, MetricMap, PointCloudSamples, TableFrame,
    WindowPayload,
};
pub use position::WindowPosition;
pub use record::{WindowId, WindowRecord};
pub use registry::{Registry, RegistrySnapshot, WorkspaceStats};
