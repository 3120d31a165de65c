//! Progress reporting for a restore.

use std::fmt;

/// How a finished restore turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    /// Every candidate opened.
    Full,
    /// Some candidates opened, some failed.
    Partial,
    /// Nothing opened, including the empty batch.
    Empty,
}

impl CompletionKind {
    pub fn from_counts(opened: usize, failed: usize) -> Self {
        match (opened, failed) {
            (0, _) => Self::Empty,
            (_, 0) => Self::Full,
            _ => Self::Partial,
        }
    }
}

/// Where a restore currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    Idle,
    ClearingIfRequested,
    RemappingIds,
    /// Activating candidate `index` (zero-based) of `total`.
    Activating { index: usize, total: usize },
    Completed(CompletionKind),
}

impl RestorePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::ClearingIfRequested => f.write_str("clearing"),
            Self::RemappingIds => f.write_str("remapping ids"),
            Self::Activating { index, total } => write!(f, "activating {}/{}", index + 1, total),
            Self::Completed(kind) => write!(f, "completed ({kind:?})"),
        }
    }
}

/// One progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreProgress {
    /// Overall completion in `0.0..=1.0`.
    pub fraction: f64,
    pub status: String,
    pub phase: RestorePhase,
}

impl RestoreProgress {
    pub fn new(phase: RestorePhase, fraction: f64, status: impl Into<String>) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            status: status.into(),
            phase,
        }
    }

    /// Fraction reported before activating candidate `index` of `total`.
    pub fn activation_fraction(index: usize, total: usize) -> f64 {
        if total == 0 {
            return 1.0;
        }
        0.1 + 0.9 * index as f64 / total as f64
    }
}
