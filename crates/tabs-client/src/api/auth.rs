//! Login, registration, email verification and password reset.
//!
//! These calls go out anonymously: the session is established by `login`
//! storing the returned pair, and torn down by `logout` clearing it.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::{ApiClient, ApiRequest};
use crate::credentials::CredentialPair;
use crate::error::ApiResult;

/// Token pair returned by `POST /token/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Registration payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Password reset confirmation payload (OTP flow).
#[derive(Debug, Clone)]
pub struct PasswordResetConfirm {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Exchanges credentials for a token pair and stores it.
///
/// # Errors
/// Returns an error on bad credentials (the backend's `detail` message is
/// surfaced) or if the pair cannot be persisted.
pub async fn login(client: &ApiClient, username: &str, password: &str) -> ApiResult<TokenPair> {
    let request = ApiRequest::post("/token/")
        .anonymous()
        .json(json!({ "username": username, "password": password }));
    let pair: TokenPair = client.execute(&request).await?;

    client.store().set(&CredentialPair {
        access: pair.access.clone(),
        refresh: pair.refresh.clone(),
    })?;
    Ok(pair)
}

/// Clears the stored token pair. Purely local; the backend keeps no
/// session state beyond the tokens themselves.
pub fn logout(client: &ApiClient) -> ApiResult<()> {
    client.store().clear()
}

/// Creates an account. The backend sends a verification email.
pub async fn register(client: &ApiClient, user: &NewUser) -> ApiResult<()> {
    let request = ApiRequest::post("/register/").anonymous().json(json!({
        "username": user.username,
        "email": user.email,
        "password": user.password,
    }));
    client.execute_empty(&request).await
}

/// Confirms an email address from the verification link.
pub async fn verify_email(client: &ApiClient, uidb64: &str, token: &str) -> ApiResult<()> {
    let request = ApiRequest::get(format!("/verify-email/{uidb64}/{token}/")).anonymous();
    client.execute_empty(&request).await
}

/// Re-sends the verification email.
pub async fn resend_verification(client: &ApiClient, email: &str) -> ApiResult<()> {
    let request = ApiRequest::post("/resend-verification/")
        .anonymous()
        .json(json!({ "email": email }));
    client.execute_empty(&request).await
}

/// Starts the OTP password reset flow.
pub async fn request_password_reset(client: &ApiClient, email: &str) -> ApiResult<()> {
    let request = ApiRequest::post("/password-reset/")
        .anonymous()
        .json(json!({ "email": email }));
    client.execute_empty(&request).await
}

/// Completes the OTP password reset flow.
pub async fn confirm_password_reset(
    client: &ApiClient,
    confirm: &PasswordResetConfirm,
) -> ApiResult<()> {
    let request = ApiRequest::post("/password-reset/confirm/")
        .anonymous()
        .json(json!({
            "email": confirm.email,
            "otp": confirm.otp,
            "new_password": confirm.new_password,
            "confirm_password": confirm.confirm_password,
        }));
    client.execute_empty(&request).await
}
