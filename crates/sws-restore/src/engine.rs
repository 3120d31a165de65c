//! Sequential, paced restoration.

use sws_document::CandidateRecord;
use sws_model::{ModelError, Registry, WindowId, WindowKind, WindowRecord};
use thiserror::Error;

use crate::hook::{ActivationError, ActivationHook};
use crate::options::RestoreOptions;
use crate::progress::{CompletionKind, RestorePhase, RestoreProgress};
use crate::remap::{IdRemap, plan_id_remap};

/// A window that was inserted and whose surface opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoredWindow {
    pub id: WindowId,
    pub original_id: WindowId,
    pub kind: WindowKind,
}

/// Why one candidate did not make it into the workspace.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestoreFailure {
    #[error("activation failed: {0}")]
    Activation(#[from] ActivationError),

    #[error("registry rejected window: {0}")]
    Registry(#[from] ModelError),
}

/// A candidate that failed. The record is kept so the caller can retry it.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedWindow {
    /// The record under its resolved id. It is not in the registry.
    pub record: WindowRecord,
    pub original_id: WindowId,
    pub reason: RestoreFailure,
}

/// Outcome of one restore call.
#[derive(Debug, Clone, PartialEq)]
pub struct RestorationResult {
    pub opened_windows: Vec<RestoredWindow>,
    pub failed_windows: Vec<FailedWindow>,
    /// One entry per candidate, in candidate order.
    pub id_mapping: Vec<IdRemap>,
    pub outcome: CompletionKind,
}

impl RestorationResult {
    pub fn is_fully_successful(&self) -> bool {
        self.failed_windows.is_empty()
    }

    pub fn remapped_count(&self) -> usize {
        self.id_mapping.iter().filter(|m| m.is_remapped()).count()
    }
}

/// Merges candidate records into a registry and opens their surfaces.
#[derive(Debug, Clone)]
pub struct RestorationEngine<H> {
    hook: H,
}

impl<H: ActivationHook> RestorationEngine<H> {
    pub fn new(hook: H) -> Self {
        Self { hook }
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Restore `candidates` into `registry`.
    ///
    /// Candidates are activated strictly one after another with
    /// `options.pacing` between them. Per-window failures are collected in
    /// the result; they never abort the batch. There is no mid-batch
    /// cancellation: dropping the future leaves the windows opened so far in
    /// the registry.
    pub async fn restore<F>(
        &self,
        candidates: Vec<CandidateRecord>,
        registry: &mut Registry,
        options: &RestoreOptions,
        mut on_progress: F,
    ) -> RestorationResult
    where
        F: FnMut(&RestoreProgress),
    {
        let total = candidates.len();
        let mut report = |phase: RestorePhase, fraction: f64, status: String| {
            tracing::debug!(%phase, fraction, "restore progress");
            on_progress(&RestoreProgress::new(phase, fraction, status));
        };

        tracing::info!(candidates = total, clear_existing = options.clear_existing, "restore started");

        let status = if options.clear_existing {
            "Clearing workspace…"
        } else {
            "Preparing workspace…"
        };
        report(RestorePhase::ClearingIfRequested, 0.05, status.to_string());
        if options.clear_existing {
            let removed = registry.clear();
            tracing::info!(removed, "workspace cleared");
        }

        report(RestorePhase::RemappingIds, 0.08, "Resolving window ids…".to_string());
        let id_mapping = plan_id_remap(registry, &candidates);

        let mut opened_windows = Vec::new();
        let mut failed_windows = Vec::new();

        for (index, (candidate, remap)) in candidates.into_iter().zip(&id_mapping).enumerate() {
            let mut record = candidate.record;
            record.id = remap.assigned;
            let kind = record.kind;
            let id = record.id;

            report(
                RestorePhase::Activating { index, total },
                RestoreProgress::activation_fraction(index, total),
                format!("Opening {} #{}…", kind.display_name(), id),
            );

            match self.activate(record.clone(), registry).await {
                Ok(()) => {
                    tracing::debug!(%id, %kind, "window restored");
                    opened_windows.push(RestoredWindow {
                        id,
                        original_id: remap.original,
                        kind,
                    });
                }
                Err(reason) => {
                    tracing::warn!(%id, %kind, error = %reason, "window failed to restore");
                    failed_windows.push(FailedWindow {
                        record,
                        original_id: remap.original,
                        reason,
                    });
                }
            }

            if index + 1 < total && !options.pacing.is_zero() {
                tokio::time::sleep(options.pacing).await;
            }
        }

        let outcome = CompletionKind::from_counts(opened_windows.len(), failed_windows.len());
        report(
            RestorePhase::Completed(outcome),
            1.0,
            completion_status(opened_windows.len(), failed_windows.len()),
        );
        tracing::info!(
            opened = opened_windows.len(),
            failed = failed_windows.len(),
            ?outcome,
            "restore finished"
        );

        RestorationResult {
            opened_windows,
            failed_windows,
            id_mapping,
            outcome,
        }
    }

    /// Insert then open; a window whose surface fails is taken back out.
    async fn activate(&self, record: WindowRecord, registry: &mut Registry) -> Result<(), RestoreFailure> {
        let kind = record.kind;
        let id = registry.insert(record)?;
        if let Err(e) = self.hook.open(kind, id).await {
            registry.remove(id);
            return Err(e.into());
        }
        Ok(())
    }
}

fn completion_status(opened: usize, failed: usize) -> String {
    match (opened, failed) {
        (0, 0) => "Nothing to restore".to_string(),
        (_, 0) => format!("Restored {opened} windows"),
        _ => format!("Restored {opened} windows, {failed} failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::time::Duration;

    fn candidate(id: u64, kind: WindowKind) -> CandidateRecord {
        CandidateRecord {
            record: WindowRecord::new(WindowId(id), kind),
            source_index: id as usize,
        }
    }

    struct OpenAll;

    impl ActivationHook for OpenAll {
        fn open(
            &self,
            _kind: WindowKind,
            _id: WindowId,
        ) -> impl Future<Output = Result<(), ActivationError>> + Send {
            std::future::ready(Ok(()))
        }
    }

    fn instant() -> RestoreOptions {
        RestoreOptions::default().with_pacing(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_empty_batch_completes_empty() {
        let engine = RestorationEngine::new(OpenAll);
        let mut registry = Registry::new();
        let mut phases = Vec::new();

        let result = engine
            .restore(Vec::new(), &mut registry, &instant(), |p| phases.push(p.phase))
            .await;

        assert_eq!(result.outcome, CompletionKind::Empty);
        assert!(result.is_fully_successful());
        assert_eq!(
            phases,
            vec![
                RestorePhase::ClearingIfRequested,
                RestorePhase::RemappingIds,
                RestorePhase::Completed(CompletionKind::Empty),
            ]
        );
    }

    #[tokio::test]
    async fn test_progress_fractions_and_status() {
        let engine = RestorationEngine::new(OpenAll);
        let mut registry = Registry::new();
        let mut reports = Vec::new();

        engine
            .restore(
                vec![candidate(1, WindowKind::Chart), candidate(2, WindowKind::Model3D)],
                &mut registry,
                &instant(),
                |p| reports.push(p.clone()),
            )
            .await;

        let activating: Vec<_> = reports
            .iter()
            .filter(|p| matches!(p.phase, RestorePhase::Activating { .. }))
            .collect();
        assert_eq!(activating.len(), 2);
        assert!((activating[0].fraction - 0.1).abs() < 1e-12);
        assert!((activating[1].fraction - 0.55).abs() < 1e-12);
        assert_eq!(activating[0].status, "Opening Chart #1…");
        assert_eq!(activating[1].status, "Opening 3D Model #2…");
        assert!((reports.last().unwrap().fraction - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_invalid_candidate_is_reported_not_inserted() {
        let engine = RestorationEngine::new(OpenAll);
        let mut registry = Registry::new();
        let mut broken = candidate(1, WindowKind::Chart);
        broken.record.position.width = -5.0;

        let result = engine
            .restore(vec![broken, candidate(2, WindowKind::Chart)], &mut registry, &instant(), |_| {})
            .await;

        assert_eq!(result.outcome, CompletionKind::Partial);
        assert!(matches!(
            result.failed_windows[0].reason,
            RestoreFailure::Registry(ModelError::InvalidPosition(_))
        ));
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![WindowId(2)]);
    }
}
