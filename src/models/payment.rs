use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::de;
use crate::error::VideyError;

/// Payout channels the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentChannel {
    Dana,
    Ovo,
    LinkAja,
    Gopay,
    Bank,
}

impl PaymentChannel {
    pub const ALL: [PaymentChannel; 5] = [
        PaymentChannel::Dana,
        PaymentChannel::Ovo,
        PaymentChannel::LinkAja,
        PaymentChannel::Gopay,
        PaymentChannel::Bank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentChannel::Dana => "Dana",
            PaymentChannel::Ovo => "Ovo",
            PaymentChannel::LinkAja => "LinkAja",
            PaymentChannel::Gopay => "Gopay",
            PaymentChannel::Bank => "Bank",
        }
    }

    pub fn is_bank(&self) -> bool {
        matches!(self, PaymentChannel::Bank)
    }
}

impl fmt::Display for PaymentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PaymentChannel {
    type Err = VideyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentChannel::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VideyError::Validation(format!("Unknown payment method: {}", s)))
    }
}

impl TryFrom<String> for PaymentChannel {
    type Error = VideyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaymentChannel> for String {
    fn from(channel: PaymentChannel) -> Self {
        channel.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentMethod {
    #[serde(default, alias = "payment_method_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
    pub payment_method: PaymentChannel,
    pub receiver_name: String,
    pub account_number: String,
    #[serde(default)]
    pub bank_name: Option<String>,
}

/// Body for creating or updating a payment method.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodPayload {
    pub user_id: u64,
    pub payment_method: PaymentChannel,
    pub receiver_name: String,
    pub account_number: String,
    pub bank_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Other,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Other => "unknown",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(deserialize_with = "de::f64_lenient")]
    pub amount: f64,
    pub status: PaymentStatus,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPaymentRequest {
    pub user_id: u64,
    pub payment_method: PaymentChannel,
    pub payment_account: String,
    pub withdrawal_id: String,
}

/// Response of `/api/payment-request`: the created request plus the balance
/// left after the hold.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequestReceipt {
    #[serde(flatten)]
    pub request: PaymentRequest,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub new_balance: Option<f64>,
}
