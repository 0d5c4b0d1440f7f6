use crate::client::ApiClient;
use crate::error::{Result, VideyError};
use crate::models::{Balance, DailyAnalytics, RevenueSummary, Transaction};
use crate::services::pagination::{paginate, Page, DEFAULT_PER_PAGE};
use chrono::NaiveDate;
use serde::Serialize;

pub const EARNINGS_ROWS: usize = 10;

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub revenue: RevenueSummary,
    pub balance: f64,
}

/// Optional inclusive date filter. Applied only when both ends are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(VideyError::Validation(
                    "Start date must not be after end date".to_string(),
                ));
            }
        }
        Ok(Self { start, end })
    }

    fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start.zip(self.end)
    }
}

#[derive(Debug, Serialize)]
struct EarningsQuery {
    user_id: u64,
    sort_by: &'static str,
    sort_order: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
}

/// Revenue, earnings and payout history for the signed-in account.
pub struct DashboardService {
    api: ApiClient,
}

impl DashboardService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn summary(&self, user_id: u64) -> Result<DashboardSummary> {
        let query = [("user_id", user_id)];
        let (revenue, balance) = tokio::try_join!(
            self.api
                .get_with_query::<RevenueSummary, _>("/api/total-revenue", &query),
            self.api.get_with_query::<Balance, _>("/api/total-balance", &query),
        )?;

        Ok(DashboardSummary {
            revenue,
            balance: balance.total_balance,
        })
    }

    /// Most recent daily rows first, at most `EARNINGS_ROWS` of them.
    pub async fn earnings(&self, user_id: u64, range: DateRange) -> Result<Vec<DailyAnalytics>> {
        let bounds = range.bounds();
        let query = EarningsQuery {
            user_id,
            sort_by: "date",
            sort_order: "DESC",
            start_date: bounds.map(|(s, _)| s.format("%Y-%m-%d").to_string()),
            end_date: bounds.map(|(_, e)| e.format("%Y-%m-%d").to_string()),
        };

        let mut rows: Vec<DailyAnalytics> = self
            .api
            .get_with_query("/api/daily-analytics", &query)
            .await?;
        rows.truncate(EARNINGS_ROWS);
        Ok(rows)
    }

    /// Debit transactions only, paged. `token` is sent as a bearer token.
    pub async fn withdrawal_history(
        &self,
        user_id: u64,
        token: Option<String>,
        page: usize,
    ) -> Result<Page<Transaction>> {
        let api = self.api.clone().with_bearer(token);
        let transactions: Vec<Transaction> =
            api.get(&format!("/api/transactions/{}", user_id)).await?;

        let debits: Vec<Transaction> = transactions.into_iter().filter(|t| t.is_debit()).collect();
        Ok(paginate(&debits, page, DEFAULT_PER_PAGE))
    }
}
