//! Wire types shared with the subscription-management service.
//!
//! The service speaks camelCase JSON; every type here mirrors the server's
//! shape exactly. The dashboard snapshot is replaced wholesale on each fetch,
//! never merged or patched locally.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Category display order used by the dashboard. Unknown categories sort
/// after these, alphabetically.
pub const CATEGORY_ORDER: [&str; 10] = [
    "Jobs",
    "Finance",
    "Shopping",
    "Learning",
    "News",
    "Social",
    "Travel",
    "Health",
    "Entertainment",
    "Other",
];

/// Identity provider used to sign in / connect a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthProvider {
    Google,
    Microsoft,
}

impl AuthProvider {
    /// Path segment the service expects for this provider.
    pub fn id(self) -> &'static str {
        match self {
            AuthProvider::Google => "google",
            AuthProvider::Microsoft => "microsoft",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AuthProvider::Google => "Google",
            AuthProvider::Microsoft => "Microsoft",
        }
    }
}

/// Which mailbox(es) a scan operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    Gmail,
    Outlook,
    All,
}

impl ScanScope {
    pub fn id(self) -> &'static str {
        match self {
            ScanScope::Gmail => "gmail",
            ScanScope::Outlook => "outlook",
            ScanScope::All => "all",
        }
    }
}

/// Authenticated user record. Mutated only by replacing the whole record
/// after a server fetch, never partially patched locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub gmail_connected: bool,
    #[serde(default)]
    pub outlook_connected: bool,
}

/// Mailbox a sender was discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Gmail,
    Outlook,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Gmail => f.write_str("gmail"),
            AccountKind::Outlook => f.write_str("outlook"),
        }
    }
}

/// Server-owned subscription status for a sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderStatus {
    Active,
    Unsubscribed,
}

/// One subscription sender as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSender {
    pub id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub sender_email: String,
    pub account_type: AccountKind,
    #[serde(default)]
    pub frequency: Option<String>,
    pub status: SenderStatus,
    pub category: String,
}

impl SubscriptionSender {
    /// Name to show for this sender, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.sender_name.as_deref().unwrap_or(&self.sender_email)
    }
}

/// The complete, authoritative dashboard view as last fetched from the
/// server. `BTreeMap` keeps category iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSnapshot {
    pub total_senders: u64,
    pub total_active: u64,
    pub total_unsubscribed: u64,
    pub categories: BTreeMap<String, Vec<SubscriptionSender>>,
}

/// Per-provider scan statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProviderScan {
    #[serde(rename = "emailsScanned")]
    pub emails_scanned: u64,
}

/// Result of a scan request.
///
/// The service returns a flat `{emailsScanned}` object for single-provider
/// scans and a `{gmail?, outlook?}` object for scan-all; either provider key
/// may be absent when that mailbox is not connected. Decoded as an explicit
/// variant rather than probing optional fields. `Single` must be tried
/// first: `PerProvider` with two optional keys matches any object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScanOutcome {
    Single {
        #[serde(rename = "emailsScanned")]
        emails_scanned: u64,
    },
    PerProvider {
        #[serde(default)]
        gmail: Option<ProviderScan>,
        #[serde(default)]
        outlook: Option<ProviderScan>,
    },
}

impl ScanOutcome {
    /// Total number of emails examined, across whichever providers reported.
    pub fn total_scanned(&self) -> u64 {
        match self {
            ScanOutcome::Single { emails_scanned } => *emails_scanned,
            ScanOutcome::PerProvider { gmail, outlook } => {
                gmail.map_or(0, |s| s.emails_scanned) + outlook.map_or(0, |s| s.emails_scanned)
            }
        }
    }
}

/// How the service unsubscribed a sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsubscribeMethod {
    /// Completed server-side (one-click header or equivalent).
    Auto,
    /// The user must finish at an external link.
    Manual,
}

/// Response to an unsubscribe request: either an outcome or a structured
/// business failure. A `manual` outcome carries the link the user must open.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UnsubscribeReply {
    Done {
        method: UnsubscribeMethod,
        #[serde(default)]
        url: Option<String>,
    },
    Rejected {
        error: String,
    },
}

/// Credential + user returned by the authorization-code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPayload {
    pub token: String,
    pub user: UserProfile,
}
