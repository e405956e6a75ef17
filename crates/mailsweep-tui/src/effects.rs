//! Side effects requested by the reducer.

use mailsweep_core::models::{AuthProvider, ScanScope};

/// Descriptions of side effects. The reducer emits these; the runtime
/// executes them and feeds results back as [`crate::events::UiEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Exit the event loop.
    Quit,
    /// Verify the restored credential against the server.
    VerifySession,
    /// Fetch the consent-screen URL for a provider.
    FetchAuthUrl { provider: AuthProvider },
    /// Open a URL in the system browser.
    OpenBrowser { url: String },
    /// Exchange a pasted authorization code for a session.
    ExchangeCode { provider: AuthProvider, code: String },
    /// Fetch a fresh dashboard snapshot.
    LoadDashboard,
    /// Start a mailbox scan.
    Scan { scope: ScanScope },
    /// Unsubscribe one sender.
    Unsubscribe { sender_id: String },
    /// Move one sender to a different category.
    SetCategory { sender_id: String, category: String },
    /// Write the current session to disk.
    PersistSession,
    /// Remove the persisted session from disk.
    ClearPersistedSession,
}
