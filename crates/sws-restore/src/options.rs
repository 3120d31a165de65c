//! Restore options.

use std::time::Duration;

/// Delay between two window activations unless configured otherwise.
pub const DEFAULT_PACING: Duration = Duration::from_millis(200);

/// How a batch is merged into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Remove every live window before restoring.
    pub clear_existing: bool,

    /// Pause between activations so surfaces are not all opened in one tick.
    pub pacing: Duration,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            clear_existing: false,
            pacing: DEFAULT_PACING,
        }
    }
}

impl RestoreOptions {
    /// Replace the current workspace instead of merging into it.
    pub fn replacing() -> Self {
        Self {
            clear_existing: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RestoreOptions::default();
        assert!(!options.clear_existing);
        assert_eq!(options.pacing, Duration::from_millis(200));
    }

    #[test]
    fn test_replacing() {
        let options = RestoreOptions::replacing().with_pacing(Duration::ZERO);
        assert!(options.clear_existing);
        assert_eq!(options.pacing, Duration::ZERO);
    }
}
