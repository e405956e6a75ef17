//! Gateway client for the subscription-management service.
//!
//! Thin wrapper over `reqwest` that attaches the bearer credential from the
//! shared [`CredentialCell`] and reports 401 responses on a dedicated
//! channel so the caller can clear the session and reroute. The client
//! itself never mutates session state.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::mpsc;

use crate::models::{
    AuthProvider, DashboardSnapshot, ScanOutcome, ScanScope, SessionPayload, SubscriptionSender,
    UnsubscribeReply, UserProfile,
};
use crate::session::CredentialCell;

/// Error from a gateway call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unauthorized")]
    Unauthorized,
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Signal that the server rejected the current credential. Sent once per
/// rejected request; the receiver decides what to do about the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized;

#[derive(Debug, Deserialize)]
struct AuthUrl {
    url: String,
}

/// Client for the gateway API. Cheap to clone; clones share the HTTP
/// connection pool, the credential slot, and the unauthorized channel.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialCell,
    unauthorized_tx: mpsc::UnboundedSender<Unauthorized>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: CredentialCell,
        unauthorized_tx: mpsc::UnboundedSender<Unauthorized>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials,
            unauthorized_tx,
        }
    }

    /// Fetches the provider's consent-screen URL to open in a browser.
    pub async fn fetch_auth_url(&self, provider: AuthProvider) -> ApiResult<String> {
        let reply: AuthUrl = self
            .send(self.request(Method::GET, &format!("/auth/oauth2/url/{}", provider.id())))
            .await?;
        Ok(reply.url)
    }

    /// Exchanges an authorization code for a credential and user record.
    pub async fn exchange_code(
        &self,
        provider: AuthProvider,
        code: &str,
    ) -> ApiResult<SessionPayload> {
        self.send(
            self.request(
                Method::POST,
                &format!("/auth/oauth2/callback/{}", provider.id()),
            )
            .json(&json!({ "code": code })),
        )
        .await
    }

    /// Fetches the authenticated user's record, verifying the credential.
    pub async fn fetch_current_user(&self) -> ApiResult<UserProfile> {
        self.send(self.request(Method::GET, "/auth/me")).await
    }

    pub async fn fetch_dashboard(&self) -> ApiResult<DashboardSnapshot> {
        self.send(self.request(Method::GET, "/subscriptions/dashboard"))
            .await
    }

    /// Kicks off a mailbox scan. Long-running server-side; the response
    /// arrives only once the scan completes.
    pub async fn scan(&self, scope: ScanScope) -> ApiResult<ScanOutcome> {
        self.send(self.request(Method::POST, &format!("/subscriptions/scan/{}", scope.id())))
            .await
    }

    pub async fn unsubscribe(&self, sender_id: &str) -> ApiResult<UnsubscribeReply> {
        self.send(self.request(Method::POST, &format!("/subscriptions/{sender_id}/unsubscribe")))
            .await
    }

    pub async fn set_category(
        &self,
        sender_id: &str,
        category: &str,
    ) -> ApiResult<SubscriptionSender> {
        self.send(
            self.request(Method::PATCH, &format!("/subscriptions/{sender_id}/category"))
                .json(&json!({ "category": category })),
        )
        .await
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(credential) = self.credentials.get() {
            builder = builder.bearer_auth(credential);
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Receiver may be gone during shutdown; nothing to do then.
            let _ = self.unauthorized_tx.send(Unauthorized);
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}
