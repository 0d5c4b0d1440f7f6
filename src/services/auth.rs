use crate::client::ApiClient;
use crate::error::{Result, VideyError};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, User, UserExists};
use crate::services::session::{SessionStore, TOKEN_KEY};

pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Signs in and stores the user (and token, when issued) in `session`.
    pub async fn login(&self, email: &str, password: &str, session: &SessionStore) -> Result<User> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(VideyError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let response: LoginResponse = self
            .api
            .post("/api/login", &LoginRequest { email: email.trim(), password })
            .await?;

        session.set_user(&response.user)?;
        match response.token {
            Some(token) => session.set(TOKEN_KEY, token),
            None => {
                session.remove(TOKEN_KEY);
            }
        }

        tracing::info!("User {} logged in", response.user.user_id);
        Ok(response.user)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(VideyError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }

        self.api
            .post_ack(
                "/api/register",
                &RegisterRequest {
                    username: username.trim(),
                    email: email.trim(),
                    password,
                },
            )
            .await?;

        tracing::info!("Registered account {}", username.trim());
        Ok(())
    }

    pub fn logout(&self, session: &SessionStore) {
        session.clear_user();
        tracing::info!("Logged out");
    }

    /// The stored user, confirmed against the server. A user the server no
    /// longer knows is dropped from the session.
    pub async fn ensure_authenticated(&self, session: &SessionStore) -> Result<User> {
        let user = session.user().ok_or(VideyError::NotLoggedIn)?;

        let check: UserExists = self
            .api
            .get(&format!("/api/check-user/{}", user.user_id))
            .await?;

        if !check.exists {
            tracing::warn!("User {} no longer exists, clearing session", user.user_id);
            session.clear_user();
            return Err(VideyError::NotLoggedIn);
        }

        Ok(user)
    }
}
