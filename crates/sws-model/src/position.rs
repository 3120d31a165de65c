//! Spatial placement of a window.

use serde::{Deserialize, Serialize};

/// 3D placement plus 2D extent and optional depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl Default for WindowPosition {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            width: 800.0,
            height: 600.0,
            depth: None,
        }
    }
}

impl WindowPosition {
    /// Create a position at the given point with the default extent.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    /// Set the 2D extent.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the depth (volumetric windows).
    #[must_use]
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Why this placement cannot be stored, if it cannot.
    pub fn problem(&self) -> Option<&'static str> {
        let coords = [self.x, self.y, self.z, self.width, self.height];
        if coords.iter().chain(self.depth.as_ref()).any(|v| !v.is_finite()) {
            return Some("has a non-finite coordinate");
        }
        if self.width < 0.0 || self.height < 0.0 || self.depth.is_some_and(|d| d < 0.0) {
            return Some("has a negative extent");
        }
        None
    }

    /// Compare two positions field by field within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        close(self.x, other.x)
            && close(self.y, other.y)
            && close(self.z, other.z)
            && close(self.width, other.width)
            && close(self.height, other.height)
            && match (self.depth, other.depth) {
                (Some(a), Some(b)) => close(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq_tolerates_rounding() {
        let a = WindowPosition::at(0.1 + 0.2, 1.0, -2.0).with_depth(0.5);
        let b = WindowPosition::at(0.3, 1.0, -2.0).with_depth(0.5);
        assert!(a.approx_eq(&b, 1e-9));
        assert!(!a.approx_eq(&WindowPosition::at(0.3, 1.0, -2.0), 1e-9));
    }

    #[test]
    fn test_problem_flags_bad_placements() {
        assert_eq!(WindowPosition::default().problem(), None);
        assert_eq!(
            WindowPosition::at(f64::NAN, 0.0, 0.0).problem(),
            Some("has a non-finite coordinate")
        );
        assert_eq!(
            WindowPosition::default().with_depth(-1.0).problem(),
            Some("has a negative extent")
        );
    }

    #[test]
    fn test_depth_omitted_when_absent() {
        let json = serde_json::to_value(WindowPosition::default()).unwrap();
        assert!(json.get("depth").is_none());
    }
}
