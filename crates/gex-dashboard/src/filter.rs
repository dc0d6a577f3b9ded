//! Expiry/customer selection controls.

use std::sync::Arc;

use tracing::info;

use gex_core::{CustomerFilter, ExpiryFilter, FilterSelection};

use crate::error::DashboardResult;
use crate::scheduler::{CycleOutcome, RefreshScheduler, Trigger};

/// Validates selection changes and triggers an immediate refresh.
#[derive(Clone)]
pub struct FilterState {
    scheduler: Arc<RefreshScheduler>,
}

impl FilterState {
    pub fn new(scheduler: Arc<RefreshScheduler>) -> Self {
        Self { scheduler }
    }

    pub fn current(&self) -> FilterSelection {
        self.scheduler.state().filter()
    }

    /// Set the expiry filter (`0dte`, `0DTE`, `weekly`, ...) and refresh.
    pub async fn set_expiry(&self, value: &str) -> DashboardResult<CycleOutcome> {
        self.apply(Some(value), None).await
    }

    /// Set the customer filter (`all`, `retail`, `institutional`) and refresh.
    pub async fn set_customer(&self, value: &str) -> DashboardResult<CycleOutcome> {
        self.apply(None, Some(value)).await
    }

    /// Apply either or both selections as one change.
    ///
    /// Both values are validated before anything is written; on error the
    /// selection is unchanged and no cycle runs.
    pub async fn apply(
        &self,
        expiry: Option<&str>,
        customer: Option<&str>,
    ) -> DashboardResult<CycleOutcome> {
        let expiry = expiry.map(str::parse::<ExpiryFilter>).transpose()?;
        let customer = customer.map(str::parse::<CustomerFilter>).transpose()?;

        let selection = self.scheduler.state().update_filter(|selection| {
            if let Some(expiry) = expiry {
                selection.expiry = expiry;
            }
            if let Some(customer) = customer {
                selection.customer = customer;
            }
        });
        info!(expiry = %selection.expiry, customer = %selection.customer, "Filter changed");

        Ok(self.scheduler.run_cycle(Trigger::FilterChange).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DashboardState;
    use crate::scheduler::SkipReason;
    use gex_chart::LogRenderer;
    use gex_feed::Fetcher;
    use std::time::Duration;

    fn paused_filter_state() -> FilterState {
        // Paused, so no cycle reaches the (unused) fetcher.
        let fetcher = Fetcher::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::new(DashboardState::default()),
            fetcher,
            Arc::new(LogRenderer),
            Duration::from_secs(60),
        ));
        scheduler.set_paused(true);
        FilterState::new(scheduler)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_expiry_and_customer_changes_both_apply() {
        for _ in 0..200 {
            let filter = paused_filter_state();
            let (a, b) = (filter.clone(), filter.clone());

            let expiry = tokio::spawn(async move { a.set_expiry("monthly").await });
            let customer = tokio::spawn(async move { b.set_customer("institutional").await });
            assert_eq!(
                expiry.await.unwrap().unwrap(),
                CycleOutcome::Skipped {
                    reason: SkipReason::Paused
                }
            );
            customer.await.unwrap().unwrap();

            let current = filter.current();
            assert_eq!(current.expiry, ExpiryFilter::Monthly);
            assert_eq!(current.customer, CustomerFilter::Institutional);
        }
    }

    #[tokio::test]
    async fn test_invalid_value_leaves_selection_unchanged() {
        let filter = paused_filter_state();
        filter.set_customer("retail").await.unwrap();

        assert!(filter.apply(Some("0dte"), Some("whale")).await.is_err());
        assert_eq!(filter.current().expiry, ExpiryFilter::All);
        assert_eq!(filter.current().customer, CustomerFilter::Retail);
    }
}
