//! Ordered runner for best-effort side effects.
//!
//! Each step is bounded by a timeout and isolated: a failure is logged and
//! recorded, never propagated, and later steps still run.

use std::future::Future;
use std::time::Duration;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: &'static str,
    pub status: StepStatus,
}

pub struct SideEffects {
    timeout: Duration,
    /// Record the steps act on (invoice or vacation id), for logs
    subject: String,
    reports: Vec<StepReport>,
}

impl SideEffects {
    pub fn new(timeout: Duration, subject: impl Into<String>) -> Self {
        Self {
            timeout,
            subject: subject.into(),
            reports: Vec::new(),
        }
    }

    /// Run one step; `None` if it failed or timed out
    pub async fn run<T, F>(&mut self, step: &'static str, fut: F) -> Option<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => {
                self.record(step, StepStatus::Completed);
                Some(value)
            }
            Ok(Err(e)) => {
                self.fail(step, e.to_string());
                None
            }
            Err(_) => {
                self.fail(step, format!("timed out after {:?}", self.timeout));
                None
            }
        }
    }

    pub fn skip(&mut self, step: &'static str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::info!(step, subject = %self.subject, "Skipping step: {}", reason);
        self.record(step, StepStatus::Skipped(reason));
    }

    pub fn fail(&mut self, step: &'static str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(step, subject = %self.subject, "Best-effort step failed: {}", reason);
        self.record(step, StepStatus::Failed(reason));
    }

    pub fn into_reports(self) -> Vec<StepReport> {
        self.reports
    }

    fn record(&mut self, step: &'static str, status: StepStatus) {
        self.reports.push(StepReport { step, status });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_failure_does_not_stop_later_steps() {
        let mut effects = SideEffects::new(Duration::from_secs(1), "inv-1");
        let first: Option<()> = effects
            .run("calendar_event", async { Err(AppError::upstream("calendar", "down")) })
            .await;
        let second = effects.run("notification", async { Ok::<_, AppError>(true) }).await;

        assert!(first.is_none());
        assert_eq!(second, Some(true));
        let reports = effects.into_reports();
        assert!(matches!(reports[0].status, StepStatus::Failed(_)));
        assert_eq!(reports[1].status, StepStatus::Completed);
    }

    #[tokio::test]
    async fn test_slow_step_times_out() {
        let mut effects = SideEffects::new(Duration::from_millis(10), "inv-1");
        let result = effects
            .run("notification", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, AppError>(())
            })
            .await;
        assert!(result.is_none());
        let reports = effects.into_reports();
        assert_eq!(reports[0].step, "notification");
        assert!(matches!(&reports[0].status, StepStatus::Failed(reason) if reason.contains("timed out")));
    }
}
