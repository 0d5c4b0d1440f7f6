use crate::client::ApiClient;
use crate::error::{Result, VideyError};
use crate::format::format_rupiah;
use crate::models::{
    Balance, NewPaymentRequest, PaymentMethod, PaymentRequest, PaymentRequestReceipt, PaymentStatus,
};
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_MIN_WITHDRAWAL: f64 = 100_000.0;
pub const MAX_OPTION_ID: &str = "max";
pub const PROCESSING_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalOption {
    pub id: String,
    pub amount: f64,
    pub enabled: bool,
    pub description: String,
}

/// Fixed tiers of Rp100.000 to Rp500.000 the balance covers, then a
/// whole-balance option that is only enabled from the minimum upwards.
pub fn withdrawal_options(balance: f64, minimum: f64) -> Vec<WithdrawalOption> {
    let mut options: Vec<WithdrawalOption> = (1..=5)
        .map(|i| i * 100)
        .filter(|i| (*i as f64) * 1000.0 <= balance)
        .map(|i| WithdrawalOption {
            id: format!("{}k", i),
            amount: i as f64 * 1000.0,
            enabled: true,
            description: "Click to withdraw".to_string(),
        })
        .collect();

    let enabled = balance >= minimum;
    options.push(WithdrawalOption {
        id: MAX_OPTION_ID.to_string(),
        amount: balance,
        enabled,
        description: if enabled {
            "Withdraw your entire balance".to_string()
        } else {
            format!(
                "Balance has not reached the minimum withdrawal of {}",
                format_rupiah(minimum)
            )
        },
    });

    options
}

/// Pending requests first, otherwise the server order.
pub fn sort_requests(requests: &mut [PaymentRequest]) {
    requests.sort_by_key(|r| r.status != PaymentStatus::Pending);
}

pub fn estimated_processing(request: &PaymentRequest) -> Option<DateTime<Utc>> {
    if request.status != PaymentStatus::Pending {
        return None;
    }
    request
        .requested_at
        .map(|at| at + Duration::days(PROCESSING_DAYS))
}

/// State of the withdrawal page: balance, payout method, history, and the
/// selection awaiting confirmation.
pub struct WithdrawalFlow {
    api: ApiClient,
    user_id: u64,
    minimum: f64,
    balance: Option<f64>,
    method: Option<PaymentMethod>,
    requests: Vec<PaymentRequest>,
    pending: Option<WithdrawalOption>,
}

impl WithdrawalFlow {
    pub fn new(
        api: ApiClient,
        user_id: u64,
        minimum: f64,
        balance: Option<f64>,
        method: Option<PaymentMethod>,
        requests: Vec<PaymentRequest>,
    ) -> Self {
        Self {
            api,
            user_id,
            minimum,
            balance,
            method,
            requests,
            pending: None,
        }
    }

    pub async fn load(api: ApiClient, user_id: u64, minimum: f64) -> Result<Self> {
        let balance: Balance = api
            .get_with_query("/api/total-balance", &[("user_id", user_id)])
            .await?;
        let methods: Vec<PaymentMethod> = api
            .get(&format!("/api/user-payment-methods/{}", user_id))
            .await?;
        let requests: Vec<PaymentRequest> = api
            .get(&format!("/api/payment-requests/{}", user_id))
            .await?;

        tracing::debug!(
            "Loaded withdrawal page for user {}: balance {}, {} requests",
            user_id,
            balance.total_balance,
            requests.len()
        );

        Ok(Self::new(
            api,
            user_id,
            minimum,
            Some(balance.total_balance),
            methods.into_iter().next(),
            requests,
        ))
    }

    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.method.as_ref()
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn options(&self) -> Vec<WithdrawalOption> {
        self.balance
            .map(|b| withdrawal_options(b, self.minimum))
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        let mut requests = self.requests.clone();
        sort_requests(&mut requests);
        requests
    }

    pub fn pending(&self) -> Option<&WithdrawalOption> {
        self.pending.as_ref()
    }

    /// Step one: choose an option and open the confirmation.
    pub fn select(&mut self, option_id: &str) -> Result<&WithdrawalOption> {
        let option = self
            .options()
            .into_iter()
            .find(|o| o.id.eq_ignore_ascii_case(option_id))
            .ok_or_else(|| VideyError::WithdrawalOptionUnavailable(option_id.to_string()))?;

        if !option.enabled {
            return Err(VideyError::BelowMinimumWithdrawal {
                balance: self.balance.unwrap_or_default(),
                minimum: self.minimum,
            });
        }

        Ok(self.pending.insert(option))
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Step two: submit the selected withdrawal. The confirmation closes
    /// whatever the result.
    pub async fn confirm(&mut self) -> Result<PaymentRequest> {
        let option = self.pending.take().ok_or(VideyError::NoPendingWithdrawal)?;

        let (Some(method), Some(balance)) = (self.method.as_ref(), self.balance) else {
            return Err(VideyError::PaymentMethodMissing);
        };

        if balance < self.minimum {
            return Err(VideyError::BelowMinimumWithdrawal {
                balance,
                minimum: self.minimum,
            });
        }

        let request = NewPaymentRequest {
            user_id: self.user_id,
            payment_method: method.payment_method,
            payment_account: method.account_number.clone(),
            withdrawal_id: option.id.clone(),
        };

        let receipt: PaymentRequestReceipt = self.api.post("/api/payment-request", &request).await?;

        if let Some(new_balance) = receipt.new_balance {
            self.balance = Some(new_balance);
        }
        self.requests.insert(0, receipt.request.clone());

        tracing::info!(
            "Payment request {} created for user {} ({})",
            option.id,
            self.user_id,
            format_rupiah(option.amount)
        );

        Ok(receipt.request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentChannel;
    use reqwest::Client;

    fn flow(balance: Option<f64>, with_method: bool) -> WithdrawalFlow {
        let method = with_method.then(|| PaymentMethod {
            id: Some(1),
            user_id: Some(5),
            payment_method: PaymentChannel::Dana,
            receiver_name: "Sari".to_string(),
            account_number: "08123".to_string(),
            bank_name: None,
        });
        WithdrawalFlow::new(
            ApiClient::with_client("http://127.0.0.1:9", Client::new()),
            5,
            DEFAULT_MIN_WITHDRAWAL,
            balance,
            method,
            Vec::new(),
        )
    }

    fn ids(options: &[WithdrawalOption]) -> Vec<&str> {
        options.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn tiers_follow_balance() {
        let options = withdrawal_options(350_000.0, DEFAULT_MIN_WITHDRAWAL);
        assert_eq!(ids(&options), vec!["100k", "200k", "300k", "max"]);
        assert!(options.iter().all(|o| o.enabled));
        assert_eq!(options.last().unwrap().amount, 350_000.0);

        let options = withdrawal_options(2_000_000.0, DEFAULT_MIN_WITHDRAWAL);
        assert_eq!(ids(&options), vec!["100k", "200k", "300k", "400k", "500k", "max"]);
    }

    #[test]
    fn below_minimum_only_offers_disabled_max() {
        let options = withdrawal_options(50_000.0, DEFAULT_MIN_WITHDRAWAL);
        assert_eq!(ids(&options), vec!["max"]);
        assert!(!options[0].enabled);
        assert!(options[0].description.contains("Rp 100.000"));
    }

    #[test]
    fn exact_minimum_is_allowed() {
        let options = withdrawal_options(100_000.0, DEFAULT_MIN_WITHDRAWAL);
        assert_eq!(ids(&options), vec!["100k", "max"]);
        assert!(options[1].enabled);
    }

    #[test]
    fn select_refuses_disabled_and_unknown_options() {
        let mut f = flow(Some(50_000.0), true);
        assert!(matches!(f.select("max"), Err(VideyError::BelowMinimumWithdrawal { .. })));
        assert!(matches!(f.select("300k"), Err(VideyError::WithdrawalOptionUnavailable(_))));
        assert!(f.pending().is_none());
    }

    #[test]
    fn select_then_cancel() {
        let mut f = flow(Some(250_000.0), true);
        assert_eq!(f.select("200K").unwrap().amount, 200_000.0);
        assert!(f.pending().is_some());
        f.cancel();
        assert!(f.pending().is_none());
    }

    #[tokio::test]
    async fn confirm_without_selection_fails() {
        let mut f = flow(Some(250_000.0), true);
        assert!(matches!(f.confirm().await, Err(VideyError::NoPendingWithdrawal)));
    }

    #[tokio::test]
    async fn confirm_without_method_fails_and_closes() {
        let mut f = flow(Some(250_000.0), false);
        f.select("100k").unwrap();
        assert!(matches!(f.confirm().await, Err(VideyError::PaymentMethodMissing)));
        assert!(f.pending().is_none());
    }

    #[test]
    fn pending_requests_sort_first() {
        let request = |status| PaymentRequest {
            request_id: None,
            user_id: None,
            amount: 1.0,
            status,
            requested_at: None,
            payment_method: None,
        };
        let mut requests = vec![
            request(PaymentStatus::Approved),
            request(PaymentStatus::Pending),
            request(PaymentStatus::Rejected),
            request(PaymentStatus::Pending),
        ];
        sort_requests(&mut requests);
        let statuses: Vec<_> = requests.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                PaymentStatus::Pending,
                PaymentStatus::Pending,
                PaymentStatus::Approved,
                PaymentStatus::Rejected
            ]
        );
    }

    #[test]
    fn processing_estimate_is_a_week_out() {
        let requested_at = "2024-10-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let mut request = PaymentRequest {
            request_id: Some(1),
            user_id: None,
            amount: 100_000.0,
            status: PaymentStatus::Pending,
            requested_at: Some(requested_at),
            payment_method: None,
        };
        assert_eq!(
            estimated_processing(&request),
            Some("2024-10-08T09:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        request.status = PaymentStatus::Approved;
        assert_eq!(estimated_processing(&request), None);
    }
}
