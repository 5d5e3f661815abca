//! Login, logout, registration, verification and password reset handlers.

use anyhow::Result;
use tabs_client::api::auth;
use tabs_client::client::ApiClient;

use super::{ensure_passwords_match, normalize_email, prompt, prompt_password_twice};

pub async fn login(
    client: &ApiClient,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username")?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt("Password")?,
    };

    auth::login(client, &username, &password).await?;
    println!("Logged in as {username}.");
    Ok(())
}

pub fn logout(client: &ApiClient) -> Result<()> {
    auth::logout(client)?;
    println!("Logged out.");
    Ok(())
}

pub async fn register(
    client: &ApiClient,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => {
            ensure_passwords_match(&p, &p)?;
            p
        }
        None => prompt_password_twice()?,
    };
    let email = normalize_email(email);

    auth::register(
        client,
        &auth::NewUser {
            username: username.to_string(),
            email: email.clone(),
            password,
        },
    )
    .await?;

    println!("Account created. A confirmation email was sent to {email};");
    println!("check your inbox and spam folders, then run `tabs login`.");
    Ok(())
}

pub async fn verify_email(client: &ApiClient, uid: &str, token: &str) -> Result<()> {
    auth::verify_email(client, uid, token).await?;
    println!("Email successfully verified. You can log in now.");
    Ok(())
}

pub async fn resend_verification(client: &ApiClient, email: &str) -> Result<()> {
    auth::resend_verification(client, &normalize_email(email)).await?;
    println!("Verification email resent.");
    Ok(())
}

pub async fn reset_request(client: &ApiClient, email: &str) -> Result<()> {
    auth::request_password_reset(client, &normalize_email(email)).await?;
    println!("Password reset email sent. Use the passcode with `tabs reset-password confirm`.");
    Ok(())
}

pub async fn reset_confirm(
    client: &ApiClient,
    email: &str,
    otp: &str,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password_twice()?,
    };

    auth::confirm_password_reset(
        client,
        &auth::PasswordResetConfirm {
            email: normalize_email(email),
            otp: otp.trim().to_string(),
            new_password: password.clone(),
            confirm_password: password,
        },
    )
    .await?;

    println!("Password updated. You can log in with the new password.");
    Ok(())
}
