//! Application state.
//!
//! State is mutated only by the reducer in [`crate::update`]; the runtime
//! and render code read it. Server-owned data (the dashboard snapshot, the
//! user record) is replaced wholesale from fetch results, never patched.

use std::collections::{HashMap, HashSet};

use mailsweep_core::models::{AuthProvider, DashboardSnapshot, UnsubscribeMethod};
use mailsweep_core::session::SessionStore;

/// Which top-level view is showing.
#[derive(Debug)]
pub enum Screen {
    /// Signed out: provider pickers.
    Landing,
    /// Waiting for the user to paste the provider redirect.
    Callback(CallbackState),
    /// Signed in: the subscription dashboard.
    Dashboard,
}

/// Paste-the-redirect flow. The transition from `AwaitingCode` to
/// `Exchanging` consumes the pasted input, so a held Enter key cannot
/// start a second exchange.
#[derive(Debug)]
pub enum CallbackState {
    AwaitingCode {
        provider: AuthProvider,
        auth_url: String,
        input: String,
    },
    Exchanging {
        provider: AuthProvider,
    },
}

/// Result of an unsubscribe attempt, kept per sender until the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Succeeded {
        method: UnsubscribeMethod,
        url: Option<String>,
    },
    Failed {
        reason: String,
    },
}

/// Which categories the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

/// Projection inputs the user controls: category filter and per-category
/// expansion. Categories default to expanded; the map only records
/// explicit toggles.
#[derive(Debug, Default)]
pub struct ViewFilter {
    pub active_category: CategoryFilter,
    pub expanded: HashMap<String, bool>,
}

impl ViewFilter {
    pub fn is_expanded(&self, category: &str) -> bool {
        *self.expanded.get(category).unwrap_or(&true)
    }

    pub fn toggle(&mut self, category: &str) {
        let expanded = self.is_expanded(category);
        self.expanded.insert(category.to_string(), !expanded);
    }
}

/// Dashboard sync and interaction state.
#[derive(Debug, Default)]
pub struct DashboardState {
    /// Last snapshot received. `None` until the first load completes.
    pub snapshot: Option<DashboardSnapshot>,
    pub loading: bool,
    /// Set when a load fails; the stale snapshot stays visible underneath.
    pub load_error: Option<String>,
    /// At most one scan runs at a time.
    pub scanning: bool,
    pub scan_status: Option<String>,
    /// True between a successful scan and the reload it triggered.
    pub scan_reload_pending: bool,
    /// Sender ids with an unsubscribe in flight. Per-sender, so requests
    /// for different senders may overlap.
    pub in_flight_unsubscribes: HashSet<String>,
    /// Last unsubscribe outcome per sender.
    pub outcomes: HashMap<String, UnsubscribeOutcome>,
    pub filter: ViewFilter,
    /// Cursor into the projected row list.
    pub cursor: usize,
}

impl DashboardState {
    /// Resets all dashboard state: used on logout and session expiry so
    /// the next login starts clean.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Root application state.
#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub session: SessionStore,
    pub dashboard: DashboardState,
    /// One-line notice shown in the status bar until replaced.
    pub status: Option<String>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(session: SessionStore) -> Self {
        Self {
            screen: Screen::Landing,
            session,
            dashboard: DashboardState::default(),
            status: None,
            should_quit: false,
        }
    }
}
