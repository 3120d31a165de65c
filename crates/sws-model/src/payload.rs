//! Typed window payloads.
//!
//! A payload is the data body a window renders. The set is closed: each
//! variant belongs to exactly one [`WindowKind`], and `SpatialEditor` windows
//! carry no payload at all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::kind::WindowKind;

// =============================================================================
// PAYLOAD ENUM
// =============================================================================

/// Typed body of a window, discriminated by kind.
///
/// Serialized as `{"type": "<kind>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WindowPayload {
    Chart(ChartSeries),
    PointCloud(PointCloudSamples),
    TabularFrame(TableFrame),
    #[serde(rename = "model_3d")]
    Model3D(MeshBuffer),
    ScalarMetrics(MetricMap),
}

impl WindowPayload {
    /// The window kind this payload belongs to.
    pub fn kind(&self) -> WindowKind {
        match self {
            Self::Chart(_) => WindowKind::Chart,
            Self::PointCloud(_) => WindowKind::PointCloud,
            Self::TabularFrame(_) => WindowKind::TabularFrame,
            Self::Model3D(_) => WindowKind::Model3D,
            Self::ScalarMetrics(_) => WindowKind::ScalarMetrics,
        }
    }

    /// Check the structural constraints of the payload body.
    pub fn validate(&self) -> Result<()> {
        let reason = match self {
            Self::Chart(chart) => chart.problem(),
            Self::PointCloud(cloud) => cloud.problem(),
            Self::TabularFrame(frame) => frame.problem(),
            Self::Model3D(mesh) => mesh.problem(),
            Self::ScalarMetrics(metrics) => metrics.problem(),
        };
        match reason {
            Some(reason) => Err(ModelError::InvalidPayload {
                kind: self.kind(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Check that this payload may be attached to a window of `kind`.
    pub fn check_kind(&self, kind: WindowKind) -> Result<()> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(ModelError::PayloadKindMismatch {
                kind,
                payload: self.kind(),
            })
        }
    }
}

fn first_non_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<f64> {
    values.into_iter().copied().find(|v| !v.is_finite())
}

// =============================================================================
// CHART
// =============================================================================

/// Rendering style of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStyle {
    #[default]
    Line,
    Bar,
    Scatter,
    Area,
    Pie,
}

/// One chart series with paired x/y values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub style: ChartStyle,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
}

impl ChartSeries {
    /// Create a series from paired values.
    pub fn new(style: ChartStyle, x_values: Vec<f64>, y_values: Vec<f64>) -> Self {
        Self {
            style,
            x_values,
            y_values,
            ..Default::default()
        }
    }

    fn problem(&self) -> Option<String> {
        if self.x_values.len() != self.y_values.len() {
            return Some(format!(
                "{} x values but {} y values",
                self.x_values.len(),
                self.y_values.len()
            ));
        }
        first_non_finite(self.x_values.iter().chain(&self.y_values))
            .map(|v| format!("non-finite value {v} in series"))
    }
}

// =============================================================================
// POINT CLOUD
// =============================================================================

/// A single sample of a point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CloudPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            intensity: None,
            color: None,
        }
    }
}

/// Sampled point cloud plus the generator parameters that produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloudSamples {
    #[serde(default)]
    pub title: Option<String>,
    /// Name of the generator (e.g. "sphere", "torus", "lidar").
    #[serde(default)]
    pub generator: Option<String>,
    pub points: Vec<CloudPoint>,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl PointCloudSamples {
    fn problem(&self) -> Option<String> {
        let coords = self
            .points
            .iter()
            .flat_map(|p| [&p.x, &p.y, &p.z].into_iter().chain(p.intensity.as_ref()));
        first_non_finite(coords.chain(self.parameters.values()))
            .map(|v| format!("non-finite value {v} in point cloud"))
    }
}

// =============================================================================
// TABULAR FRAME
// =============================================================================

/// A rectangular table of string cells with a fixed column set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn problem(&self) -> Option<String> {
        self.rows
            .iter()
            .position(|row| row.len() != self.columns.len())
            .map(|idx| {
                format!(
                    "row {idx} has {} cells, expected {}",
                    self.rows[idx].len(),
                    self.columns.len()
                )
            })
    }
}

// =============================================================================
// MESH
// =============================================================================

/// Indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshBuffer {
    #[serde(default)]
    pub title: Option<String>,
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl MeshBuffer {
    fn problem(&self) -> Option<String> {
        if let Some(v) = self.vertices.iter().flatten().find(|v| !v.is_finite()) {
            return Some(format!("non-finite vertex coordinate {v}"));
        }
        let vertex_count = self.vertices.len();
        self.faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&i| i as usize >= vertex_count))
            .map(|(idx, face)| {
                format!("face {idx} {face:?} references a vertex beyond {vertex_count}")
            })
    }
}

// =============================================================================
// METRICS
// =============================================================================

/// Named scalar metrics (accuracy, loss, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricMap(pub BTreeMap<String, f64>);

impl MetricMap {
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    fn problem(&self) -> Option<String> {
        self.0
            .iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(name, v)| format!("metric {name} has non-finite value {v}"))
    }
}

impl FromIterator<(String, f64)> for MetricMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
