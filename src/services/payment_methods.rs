use crate::client::ApiClient;
use crate::error::{Result, VideyError};
use crate::models::{PaymentChannel, PaymentMethod, PaymentMethodPayload};
use crate::services::session::{SessionStore, PAYMENT_METHOD_SUCCESS_KEY};

/// Form input for adding or editing a payout method.
#[derive(Debug, Clone)]
pub struct PaymentMethodDraft {
    pub channel: PaymentChannel,
    pub receiver_name: String,
    pub account_number: String,
    pub bank_name: Option<String>,
}

impl PaymentMethodDraft {
    pub fn validate(&self) -> Result<()> {
        if self.receiver_name.trim().is_empty() {
            return Err(VideyError::Validation("Receiver name is required".to_string()));
        }

        let account = self.account_number.trim();
        if account.is_empty() {
            return Err(VideyError::Validation("Account number is required".to_string()));
        }
        if !self.channel.is_bank() && !account.chars().all(|c| c.is_ascii_digit()) {
            return Err(VideyError::Validation(format!(
                "{} account number must contain digits only",
                self.channel
            )));
        }

        if self.channel.is_bank()
            && self
                .bank_name
                .as_deref()
                .map_or(true, |name| name.trim().is_empty())
        {
            return Err(VideyError::Validation("Bank name is required".to_string()));
        }

        Ok(())
    }

    /// `bank_name` is null for everything but bank transfers.
    pub fn into_payload(self, user_id: u64) -> PaymentMethodPayload {
        PaymentMethodPayload {
            user_id,
            payment_method: self.channel,
            receiver_name: self.receiver_name.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            bank_name: if self.channel.is_bank() {
                self.bank_name.map(|n| n.trim().to_string())
            } else {
                None
            },
        }
    }
}

pub struct PaymentMethodService {
    api: ApiClient,
}

impl PaymentMethodService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, user_id: u64) -> Result<Vec<PaymentMethod>> {
        self.api
            .get(&format!("/api/user-payment-methods/{}", user_id))
            .await
    }

    /// Saves a new method and raises the one-shot success flag in `session`.
    pub async fn create(
        &self,
        user_id: u64,
        draft: PaymentMethodDraft,
        session: &SessionStore,
    ) -> Result<()> {
        draft.validate()?;
        let channel = draft.channel;

        self.api
            .post_ack("/api/user-payment-methods", &draft.into_payload(user_id))
            .await?;

        session.set(PAYMENT_METHOD_SUCCESS_KEY, "true");
        tracing::info!("Payment method {} added for user {}", channel, user_id);
        Ok(())
    }

    pub async fn update(&self, user_id: u64, method_id: u64, draft: PaymentMethodDraft) -> Result<()> {
        draft.validate()?;

        self.api
            .put_ack(
                &format!("/api/user-payment-methods/{}", method_id),
                &draft.into_payload(user_id),
            )
            .await?;

        tracing::info!("Payment method {} updated", method_id);
        Ok(())
    }

    pub async fn delete(&self, method_id: u64) -> Result<()> {
        self.api
            .delete(&format!("/api/user-payment-methods/{}", method_id))
            .await?;
        tracing::info!("Payment method {} deleted", method_id);
        Ok(())
    }
}
