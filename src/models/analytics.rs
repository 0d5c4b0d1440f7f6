use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::de;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSummary {
    #[serde(rename = "totalRevenue", deserialize_with = "de::f64_lenient")]
    pub total_revenue: f64,
    #[serde(rename = "totalImpressions", deserialize_with = "de::u64_lenient")]
    pub total_impressions: u64,
    #[serde(rename = "avgCpm", deserialize_with = "de::f64_lenient")]
    pub avg_cpm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    #[serde(deserialize_with = "de::f64_lenient")]
    pub total_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAnalytics {
    pub date: String,
    #[serde(default, deserialize_with = "de::u64_lenient")]
    pub impressions: u64,
    #[serde(deserialize_with = "de::f64_lenient")]
    pub earnings: f64,
    #[serde(default, deserialize_with = "de::opt_f64_lenient")]
    pub cpm: Option<f64>,
}

impl DailyAnalytics {
    pub fn day(&self) -> Option<NaiveDate> {
        de::parse_timestamp(&self.date).map(|ts| ts.date_naive())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: u64,
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "de::f64_lenient")]
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_debit(&self) -> bool {
        self.kind.eq_ignore_ascii_case("debit")
    }
}
