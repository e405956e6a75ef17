//! Events processed by the reducer.

use mailsweep_core::models::{
    AuthProvider, DashboardSnapshot, ScanOutcome, ScanScope, SessionPayload, SubscriptionSender,
    UnsubscribeReply, UserProfile,
};

/// Everything that can happen to the app: terminal input, timer ticks, and
/// results of async work arriving through the inbox. Async results carry
/// `Result<_, String>` because the reducer only needs a displayable reason.
#[derive(Debug)]
pub enum UiEvent {
    /// Periodic timer; drives rendering cadence.
    Tick,
    /// Raw terminal input.
    Terminal(crossterm::event::Event),
    /// Emitted once at startup, before the first frame.
    Started,
    /// Session verification finished.
    RestoreResult(Result<UserProfile, String>),
    /// Consent-screen URL fetch finished.
    AuthUrlFetched {
        provider: AuthProvider,
        result: Result<String, String>,
    },
    /// Authorization-code exchange finished.
    ExchangeResult {
        provider: AuthProvider,
        result: Result<SessionPayload, String>,
    },
    /// Dashboard snapshot fetch finished.
    DashboardLoaded(Result<DashboardSnapshot, String>),
    /// Mailbox scan finished.
    ScanFinished {
        scope: ScanScope,
        result: Result<ScanOutcome, String>,
    },
    /// Unsubscribe request finished for one sender.
    UnsubscribeFinished {
        sender_id: String,
        result: Result<UnsubscribeReply, String>,
    },
    /// Category change finished. The sender id is logged at the handler;
    /// the reducer only needs the outcome to decide on a reload.
    CategoryUpdated(Result<SubscriptionSender, String>),
    /// The server rejected the current credential on some request.
    Unauthorized,
}
