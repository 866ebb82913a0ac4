//! User account endpoints.

use digi_core::{Email, User, UserId};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use super::{ApiClient, ApiResult, Body, RequestOptions, segment};

/// Login form input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

/// Registration form input.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
}

/// Account settings form input.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    /// New password; `None` keeps the current one.
    pub password: Option<SecretString>,
}

/// `result` of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub user: User,
}

/// User endpoint group, borrowed from an [`ApiClient`].
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(super) const fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn get_users(&self) -> ApiResult<Vec<User>> {
        self.client.get("users").await?.into_accepted()
    }

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn get_user(&self, id: &UserId) -> ApiResult<User> {
        self.client
            .get(&format!("users/{}", segment(id.as_str())))
            .await?
            .into_accepted()
    }

    /// Register a customer account; the backend then mails an OTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, customer), fields(email = %customer.email))]
    pub async fn register(&self, customer: &NewCustomer) -> ApiResult<Value> {
        let body = Body::Json(json!({
            "name": customer.name,
            "email": customer.email,
            "password": customer.password.expose_secret(),
            "type": "customer",
        }));
        self.client
            .send_to(Method::POST, "users", body)
            .await?
            .into_accepted()
    }

    /// Log in; the session cookie is kept by the client's cookie store.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResult> {
        let body = Body::Json(json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        }));
        self.client
            .send_to(Method::POST, "users/login", body)
            .await?
            .into_accepted()
    }

    /// Change the name and optionally the password of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_name_password(&self, id: &UserId, update: &ProfileUpdate) -> ApiResult<Value> {
        let mut body = json!({ "name": update.name });
        if let Some(password) = &update.password {
            body["password"] = Value::String(password.expose_secret().to_string());
        }
        self.client
            .send_to(
                Method::PATCH,
                &format!("users/update-name-password/{}", segment(id.as_str())),
                Body::Json(body),
            )
            .await?
            .into_accepted()
    }

    /// Ask the backend to mail a new password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &Email) -> ApiResult<Value> {
        self.client
            .get(&format!("users/forgot-password/{}", segment(email.as_str())))
            .await?
            .into_accepted()
    }

    /// Mail a new verification OTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn resend_otp(&self, email: &Email) -> ApiResult<Value> {
        self.client
            .get(&format!("users/send-otp-mail/{}", segment(email.as_str())))
            .await?
            .into_accepted()
    }

    /// Verify an account with the mailed OTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, otp), fields(email = %email))]
    pub async fn verify_otp(&self, otp: &str, email: &Email) -> ApiResult<Value> {
        self.client
            .get(&format!(
                "users/verify-email/{}/{}",
                segment(otp),
                segment(email.as_str())
            ))
            .await?
            .into_accepted()
    }

    /// End the remote session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn logout(&self) -> ApiResult<Value> {
        self.logout_with(RequestOptions::default()).await
    }

    /// End the remote session with explicit request options.
    ///
    /// The recovery sequence calls this with [`RequestOptions::retry`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn logout_with(&self, options: RequestOptions) -> ApiResult<Value> {
        let url = self.client.endpoint("users/logout")?;
        self.client
            .request(Method::PUT, url, Body::Json(json!({})), options)
            .await?
            .into_accepted()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::Matcher;
    use url::Url;

    use super::*;
    use crate::config::StorefrontConfig;

    fn client_for(base: &str) -> ApiClient {
        ApiClient::new(&StorefrontConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    fn email() -> Email {
        Email::parse("jane@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_register_marks_customer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/users")
            .match_body(Matcher::PartialJson(json!({
                "name": "Jane",
                "email": "jane@example.com",
                "password": "secret1",
                "type": "customer"
            })))
            .with_status(201)
            .with_body(r#"{"success":true,"message":"OTP sent to your email","result":null}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let accepted = client
            .users()
            .register(&NewCustomer {
                name: "Jane".to_string(),
                email: email(),
                password: SecretString::from("secret1"),
            })
            .await
            .unwrap();

        assert_eq!(accepted.message, "OTP sent to your email");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_returns_user() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/users/login")
            .with_status(200)
            .with_body(
                r#"{"success":true,"message":"Login successful","result":{"user":{"_id":"u1","email":"jane@example.com","name":"Jane","type":"customer"}}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result = client
            .users()
            .login(&Credentials {
                email: email(),
                password: SecretString::from("secret1"),
            })
            .await
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(result.user.id.as_str(), "u1");
        assert_eq!(result.user.name.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn test_email_paths_are_encoded() {
        let mut server = mockito::Server::new_async().await;
        let resend = server
            .mock("GET", "/users/send-otp-mail/jane%40example.com")
            .with_status(200)
            .with_body(r#"{"success":true,"message":"OTP sent"}"#)
            .create_async()
            .await;
        let verify = server
            .mock("GET", "/users/verify-email/123456/jane%40example.com")
            .with_status(200)
            .with_body(r#"{"success":true,"message":"Email verified"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        client.users().resend_otp(&email()).await.unwrap();
        let accepted = client.users().verify_otp("123456", &email()).await.unwrap();

        assert_eq!(accepted.message, "Email verified");
        resend.assert_async().await;
        verify.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_update_surfaces_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/users/update-name-password/u1")
            .match_body(Matcher::Json(json!({ "name": "Jane" })))
            .with_status(200)
            .with_body(r#"{"success":false,"message":"User not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client
            .users()
            .update_name_password(
                &UserId::new("u1"),
                &ProfileUpdate {
                    name: "Jane".to_string(),
                    password: None,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.messages(), vec!["User not found".to_string()]);
    }
}
