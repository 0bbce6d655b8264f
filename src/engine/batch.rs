//! engine::batch
//!
//! Multi-repository iteration policy.
//!
//! Repositories are processed strictly one after another. A failure is
//! reported and the run moves on to the next repository, except for a
//! declined or unanswerable prompt, which stops the whole run. A run with any
//! failure ends in [`WorkflowError::Batch`].

use crate::ui::output::Narrator;

use super::WorkflowError;

/// Outcome of one repository in a batch.
#[derive(Debug)]
pub struct BatchEntry<T> {
    /// Repository label (checkout path)
    pub label: String,
    pub outcome: Result<T, WorkflowError>,
}

/// Collected outcomes of a multi-repository run.
#[derive(Debug)]
pub struct BatchReport<T> {
    entries: Vec<BatchEntry<T>>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one repository's outcome.
    ///
    /// Failures are narrated on `narrator`.
    ///
    /// # Errors
    ///
    /// Returns the error itself when it must stop the run.
    pub fn record(
        &mut self,
        label: impl Into<String>,
        outcome: Result<T, WorkflowError>,
        narrator: &Narrator,
    ) -> Result<(), WorkflowError> {
        let label = label.into();
        match outcome {
            Err(e) if e.is_terminal_for_batch() => Err(e),
            Err(e) => {
                narrator.error(&e);
                tracing::debug!(repository = %label, error = %e, "repository failed");
                self.entries.push(BatchEntry {
                    label,
                    outcome: Err(e),
                });
                Ok(())
            }
            Ok(value) => {
                self.entries.push(BatchEntry {
                    label,
                    outcome: Ok(value),
                });
                Ok(())
            }
        }
    }

    pub fn entries(&self) -> &[BatchEntry<T>] {
        &self.entries
    }

    /// Labels of failed repositories.
    pub fn failures(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_err())
            .map(|e| e.label.as_str())
            .collect()
    }

    /// Successful outcomes, or [`WorkflowError::Batch`] if anything failed.
    pub fn into_result(self) -> Result<Vec<(String, T)>, WorkflowError> {
        let total = self.entries.len();
        let failed = self.failures().len();
        if failed > 0 {
            return Err(WorkflowError::Batch { failed, total });
        }
        Ok(self
            .entries
            .into_iter()
            .filter_map(|e| e.outcome.ok().map(|v| (e.label, v)))
            .collect())
    }
}
