use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::IpLookupResponse;

/// Resolves the public IP of the viewer. Impressions are keyed on it.
#[async_trait]
pub trait IpLookup: Send + Sync {
    async fn lookup(&self) -> Result<String>;
}

pub struct IpifyLookup {
    client: Client,
    url: String,
}

impl IpifyLookup {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl IpLookup for IpifyLookup {
    async fn lookup(&self) -> Result<String> {
        let response: IpLookupResponse = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!("Resolved viewer IP: {}", response.ip);
        Ok(response.ip)
    }
}

/// Lookup that always answers with a known address.
pub struct FixedIp(pub String);

#[async_trait]
impl IpLookup for FixedIp {
    async fn lookup(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
