pub mod account;
pub mod analytics;
pub mod impression;
pub mod payment;
pub mod response;
pub mod video;

pub use account::*;
pub use analytics::*;
pub use impression::*;
pub use payment::*;
pub use response::*;
pub use video::*;

/// Deserializers for the loosely typed backend payloads. Amounts come back as
/// either JSON numbers or decimal strings depending on the endpoint, and
/// timestamps as RFC 3339 or plain SQL datetimes.
pub(crate) mod de {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    fn to_f64<E: serde::de::Error>(value: NumberOrString) -> Result<f64, E> {
        match value {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid number: {:?}", s))),
        }
    }

    pub fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        to_f64(NumberOrString::deserialize(deserializer)?)
    }

    pub fn opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(value) => to_f64(value).map(Some),
            None => Ok(None),
        }
    }

    pub fn u64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64_lenient(deserializer)?;
        if value < 0.0 || value.fract() != 0.0 {
            return Err(serde::de::Error::custom(format!("expected a whole number, got {}", value)));
        }
        Ok(value as u64)
    }

    pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Some(parsed.and_utc());
        }
        NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    pub fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?
            .as_deref()
            .and_then(parse_timestamp))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Datelike, Timelike};

        #[derive(Deserialize)]
        struct Amount {
            #[serde(deserialize_with = "f64_lenient")]
            value: f64,
        }

        #[test]
        fn numbers_and_numeric_strings() {
            let a: Amount = serde_json::from_str(r#"{"value": 150000}"#).unwrap();
            assert_eq!(a.value, 150000.0);
            let a: Amount = serde_json::from_str(r#"{"value": "150000.50"}"#).unwrap();
            assert_eq!(a.value, 150000.5);
            assert!(serde_json::from_str::<Amount>(r#"{"value": "lots"}"#).is_err());
        }

        #[test]
        fn timestamps_in_both_shapes() {
            let ts = parse_timestamp("2024-10-01T10:30:00.000Z").unwrap();
            assert_eq!((ts.day(), ts.hour(), ts.minute()), (1, 10, 30));

            let ts = parse_timestamp("2024-10-01 08:00:00").unwrap();
            assert_eq!(ts.hour(), 8);

            let ts = parse_timestamp("2024-10-05").unwrap();
            assert_eq!(ts.day(), 5);

            assert!(parse_timestamp("yesterday").is_none());
        }
    }
}
