//! Window kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The closed set of window types a workspace can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Chart,
    SpatialEditor,
    TabularFrame,
    ScalarMetrics,
    PointCloud,
    #[serde(rename = "model_3d")]
    Model3D,
}

impl WindowKind {
    /// All kinds, in the order they are listed in summaries.
    pub const ALL: [WindowKind; 6] = [
        WindowKind::Chart,
        WindowKind::SpatialEditor,
        WindowKind::TabularFrame,
        WindowKind::ScalarMetrics,
        WindowKind::PointCloud,
        WindowKind::Model3D,
    ];

    /// Wire name used in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::SpatialEditor => "spatial_editor",
            Self::TabularFrame => "tabular_frame",
            Self::ScalarMetrics => "scalar_metrics",
            Self::PointCloud => "point_cloud",
            Self::Model3D => "model_3d",
        }
    }

    /// Human-readable name for headers and status lines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Chart => "Chart",
            Self::SpatialEditor => "Spatial Editor",
            Self::TabularFrame => "Table",
            Self::ScalarMetrics => "Metrics",
            Self::PointCloud => "Point Cloud",
            Self::Model3D => "3D Model",
        }
    }

    /// Whether windows of this kind can carry a payload at all.
    pub fn accepts_payload(&self) -> bool {
        match self {
            Self::SpatialEditor => false,
            Self::Chart
            | Self::TabularFrame
            | Self::ScalarMetrics
            | Self::PointCloud
            | Self::Model3D => true,
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowKind {
    type Err = ModelError;

    /// Accepts the wire name or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str().eq_ignore_ascii_case(needle)
                    || kind.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}
