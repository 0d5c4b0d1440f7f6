use crate::error::{Result, VideyError};
use crate::models::ApiMessage;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// JSON client for one backend. Every request carries an `X-Request-Id` so
/// failures can be matched against server logs.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    bearer: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("videyhost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            bearer: None,
        }
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(self.client.get(self.url(path))).await?;
        decode(response).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .execute(self.client.get(self.url(path)).query(query))
            .await?;
        decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.client.post(self.url(path)).json(body))
            .await?;
        decode(response).await
    }

    /// POST where only the status matters.
    pub async fn post_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.execute(self.client.post(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    pub async fn put_ack<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.execute(self.client.put(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(self.client.delete(self.url(path))).await?;
        Ok(())
    }

    /// Sends the request and turns any non-2xx status into `VideyError::Api`.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = request.header("X-Request-Id", &request_id);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        tracing::debug!(
            request_id = %request_id,
            status = status.as_u16(),
            url = %response.url(),
            "API response"
        );

        if status.is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

pub(crate) async fn error_from_response(response: Response) -> VideyError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ApiMessage>(&body)
        .ok()
        .and_then(|m| m.text().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    VideyError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = ApiClient::with_client("https://videyhost.my.id/", Client::new());
        assert_eq!(client.url("/api/videos"), "https://videyhost.my.id/api/videos");
    }
}
