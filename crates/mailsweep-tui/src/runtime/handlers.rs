//! Effect handlers: pure async functions returning the resulting event.
//!
//! Handlers never touch state. The runtime spawns them and forwards the
//! returned event into the inbox; errors are reduced to display strings
//! here so the reducer never sees transport types.

use mailsweep_core::api::{ApiClient, ApiError};
use mailsweep_core::models::{AuthProvider, ScanScope};

use crate::events::UiEvent;

fn reason(err: &ApiError) -> String {
    match err {
        ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
        other => other.to_string(),
    }
}

pub async fn verify_session(api: ApiClient) -> UiEvent {
    let result = api.fetch_current_user().await.map_err(|err| {
        tracing::warn!(error = %err, "session verification request failed");
        reason(&err)
    });
    UiEvent::RestoreResult(result)
}

pub async fn fetch_auth_url(api: ApiClient, provider: AuthProvider) -> UiEvent {
    let result = api.fetch_auth_url(provider).await.map_err(|err| {
        tracing::warn!(error = %err, provider = provider.id(), "auth url request failed");
        reason(&err)
    });
    UiEvent::AuthUrlFetched { provider, result }
}

pub async fn exchange_code(api: ApiClient, provider: AuthProvider, code: String) -> UiEvent {
    let result = api.exchange_code(provider, &code).await.map_err(|err| {
        tracing::warn!(error = %err, provider = provider.id(), "code exchange request failed");
        reason(&err)
    });
    UiEvent::ExchangeResult { provider, result }
}

pub async fn load_dashboard(api: ApiClient) -> UiEvent {
    let result = api.fetch_dashboard().await.map_err(|err| {
        tracing::warn!(error = %err, "dashboard request failed");
        reason(&err)
    });
    UiEvent::DashboardLoaded(result)
}

pub async fn run_scan(api: ApiClient, scope: ScanScope) -> UiEvent {
    let result = api.scan(scope).await.map_err(|err| {
        tracing::warn!(error = %err, scope = scope.id(), "scan request failed");
        reason(&err)
    });
    UiEvent::ScanFinished { scope, result }
}

pub async fn run_unsubscribe(api: ApiClient, sender_id: String) -> UiEvent {
    let result = api.unsubscribe(&sender_id).await.map_err(|err| {
        tracing::warn!(error = %err, sender_id, "unsubscribe request failed");
        reason(&err)
    });
    UiEvent::UnsubscribeFinished { sender_id, result }
}

pub async fn update_category(api: ApiClient, sender_id: String, category: String) -> UiEvent {
    let result = api.set_category(&sender_id, &category).await.map_err(|err| {
        tracing::warn!(error = %err, sender_id, "category update request failed");
        reason(&err)
    });
    UiEvent::CategoryUpdated(result)
}
