//! The reducer: `(state, event) -> effects`.
//!
//! All state transitions live here and the function stays free of I/O, so
//! every flow is testable by feeding events and asserting on state plus
//! emitted effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use mailsweep_core::auth::parse_authorization_input;
use mailsweep_core::models::{AuthProvider, CATEGORY_ORDER, ScanScope, SenderStatus};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, CallbackState, CategoryFilter, Screen, UnsubscribeOutcome};
use crate::view::{self, Row};

pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => Vec::new(),
        UiEvent::Terminal(terminal_event) => handle_terminal(state, &terminal_event),
        UiEvent::Started => handle_started(state),
        UiEvent::RestoreResult(result) => handle_restore_result(state, result),
        UiEvent::AuthUrlFetched { provider, result } => {
            handle_auth_url_fetched(state, provider, result)
        }
        UiEvent::ExchangeResult { provider, result } => {
            handle_exchange_result(state, provider, result)
        }
        UiEvent::DashboardLoaded(result) => handle_dashboard_loaded(state, result),
        UiEvent::ScanFinished { result, .. } => handle_scan_finished(state, result),
        UiEvent::UnsubscribeFinished { sender_id, result } => {
            handle_unsubscribe_finished(state, sender_id, result)
        }
        UiEvent::CategoryUpdated(result) => handle_category_updated(state, result),
        UiEvent::Unauthorized => expire_session(state),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

fn handle_started(state: &mut AppState) -> Vec<UiEffect> {
    if state.session.begin_restore().is_some() {
        state.status = Some("Restoring session...".to_string());
        vec![UiEffect::VerifySession]
    } else {
        Vec::new()
    }
}

fn handle_restore_result(
    state: &mut AppState,
    result: Result<mailsweep_core::models::UserProfile, String>,
) -> Vec<UiEffect> {
    state.status = None;
    let verified = result.is_ok();
    state.session.finish_restore(result);
    if verified {
        state.screen = Screen::Dashboard;
        state.dashboard.loading = true;
        vec![UiEffect::LoadDashboard]
    } else {
        state.screen = Screen::Landing;
        vec![UiEffect::ClearPersistedSession]
    }
}

fn expire_session(state: &mut AppState) -> Vec<UiEffect> {
    state.session.logout();
    state.dashboard.reset();
    state.screen = Screen::Landing;
    state.status = Some("Session expired. Please sign in again.".to_string());
    vec![UiEffect::ClearPersistedSession]
}

fn logout(state: &mut AppState) -> Vec<UiEffect> {
    state.session.logout();
    state.dashboard.reset();
    state.screen = Screen::Landing;
    state.status = None;
    vec![UiEffect::ClearPersistedSession]
}

// ============================================================================
// Sign-in flow
// ============================================================================

fn handle_auth_url_fetched(
    state: &mut AppState,
    provider: AuthProvider,
    result: Result<String, String>,
) -> Vec<UiEffect> {
    match result {
        Ok(url) => {
            state.status = None;
            state.screen = Screen::Callback(CallbackState::AwaitingCode {
                provider,
                auth_url: url.clone(),
                input: String::new(),
            });
            vec![UiEffect::OpenBrowser { url }]
        }
        Err(reason) => {
            tracing::warn!(reason, provider = provider.id(), "auth url fetch failed");
            state.status = Some("Could not reach the sign-in service.".to_string());
            Vec::new()
        }
    }
}

fn handle_exchange_result(
    state: &mut AppState,
    provider: AuthProvider,
    result: Result<mailsweep_core::models::SessionPayload, String>,
) -> Vec<UiEffect> {
    // Only the exchange we are actually waiting on counts; anything else
    // is a stale result and must not touch the session.
    let Screen::Callback(CallbackState::Exchanging { provider: waiting }) = &state.screen else {
        return Vec::new();
    };
    if *waiting != provider {
        return Vec::new();
    }

    match result {
        Ok(payload) => {
            state.session.login(payload.token, payload.user);
            state.dashboard.reset();
            state.dashboard.loading = true;
            state.screen = Screen::Dashboard;
            vec![UiEffect::PersistSession, UiEffect::LoadDashboard]
        }
        Err(reason) => {
            tracing::warn!(reason, provider = provider.id(), "code exchange failed");
            state.screen = Screen::Landing;
            Vec::new()
        }
    }
}

// ============================================================================
// Dashboard sync
// ============================================================================

fn handle_dashboard_loaded(
    state: &mut AppState,
    result: Result<mailsweep_core::models::DashboardSnapshot, String>,
) -> Vec<UiEffect> {
    let dash = &mut state.dashboard;
    dash.loading = false;
    match result {
        Ok(snapshot) => {
            dash.snapshot = Some(snapshot);
            dash.load_error = None;
        }
        Err(reason) => {
            tracing::warn!(reason, "dashboard load failed");
            dash.load_error = Some("Couldn't load your dashboard.".to_string());
        }
    }
    // A scan's trailing reload finishes the scan lifecycle either way.
    if dash.scanning && dash.scan_reload_pending {
        dash.scanning = false;
        dash.scan_status = None;
        dash.scan_reload_pending = false;
    }
    clamp_cursor(state);
    Vec::new()
}

fn handle_scan_finished(
    state: &mut AppState,
    result: Result<mailsweep_core::models::ScanOutcome, String>,
) -> Vec<UiEffect> {
    let dash = &mut state.dashboard;
    if !dash.scanning {
        return Vec::new();
    }
    match result {
        Ok(outcome) => {
            dash.scan_status = Some(format!(
                "Scanned {} emails. Refreshing...",
                outcome.total_scanned()
            ));
            dash.scan_reload_pending = true;
            vec![UiEffect::LoadDashboard]
        }
        Err(reason) => {
            tracing::warn!(reason, "scan failed");
            dash.scanning = false;
            dash.scan_status = Some("Scan failed. Please try again.".to_string());
            Vec::new()
        }
    }
}

fn handle_unsubscribe_finished(
    state: &mut AppState,
    sender_id: String,
    result: Result<mailsweep_core::models::UnsubscribeReply, String>,
) -> Vec<UiEffect> {
    use mailsweep_core::models::UnsubscribeReply;

    let dash = &mut state.dashboard;
    dash.in_flight_unsubscribes.remove(&sender_id);
    match result {
        Ok(UnsubscribeReply::Done { method, url }) => {
            dash.outcomes
                .insert(sender_id, UnsubscribeOutcome::Succeeded { method, url });
            vec![UiEffect::LoadDashboard]
        }
        Ok(UnsubscribeReply::Rejected { error }) => {
            dash.outcomes
                .insert(sender_id, UnsubscribeOutcome::Failed { reason: error });
            vec![UiEffect::LoadDashboard]
        }
        Err(reason) => {
            // Transport-level failure: record it but skip the reload, the
            // server state is unknown and the snapshot we have is as good.
            tracing::warn!(reason, sender_id, "unsubscribe failed");
            dash.outcomes
                .insert(sender_id, UnsubscribeOutcome::Failed { reason });
            Vec::new()
        }
    }
}

fn handle_category_updated(
    state: &mut AppState,
    result: Result<mailsweep_core::models::SubscriptionSender, String>,
) -> Vec<UiEffect> {
    match result {
        Ok(_) => vec![UiEffect::LoadDashboard],
        Err(reason) => {
            tracing::warn!(reason, "category update failed");
            state.status = Some("Couldn't update the category.".to_string());
            Vec::new()
        }
    }
}

// ============================================================================
// Input
// ============================================================================

fn handle_terminal(state: &mut AppState, event: &Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(state, key),
        Event::Paste(text) => {
            if let Screen::Callback(CallbackState::AwaitingCode { input, .. }) = &mut state.screen {
                input.push_str(text);
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_key(state: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return vec![UiEffect::Quit];
    }
    match &state.screen {
        Screen::Landing => handle_landing_key(state, key),
        Screen::Callback(_) => handle_callback_key(state, key),
        Screen::Dashboard => handle_dashboard_key(state, key),
    }
}

fn handle_landing_key(state: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('q') => vec![UiEffect::Quit],
        KeyCode::Char('g') => connect(state, AuthProvider::Google),
        KeyCode::Char('m') => connect(state, AuthProvider::Microsoft),
        _ => Vec::new(),
    }
}

fn connect(state: &mut AppState, provider: AuthProvider) -> Vec<UiEffect> {
    state.status = Some(format!("Opening {} sign-in...", provider.label()));
    vec![UiEffect::FetchAuthUrl { provider }]
}

fn handle_callback_key(state: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    let Screen::Callback(callback) = &mut state.screen else {
        return Vec::new();
    };
    match callback {
        CallbackState::AwaitingCode {
            provider, input, ..
        } => {
            let provider = *provider;
            match key.code {
                KeyCode::Esc => {
                    state.screen = Screen::Landing;
                    Vec::new()
                }
                KeyCode::Enter => {
                    match parse_authorization_input(input) {
                        Some(code) => {
                            // Consume the pending input before the exchange
                            // starts; a repeated Enter finds `Exchanging`
                            // and does nothing.
                            state.screen =
                                Screen::Callback(CallbackState::Exchanging { provider });
                            vec![UiEffect::ExchangeCode { provider, code }]
                        }
                        None => {
                            state.screen = Screen::Landing;
                            Vec::new()
                        }
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                    Vec::new()
                }
                KeyCode::Char(c) => {
                    input.push(c);
                    Vec::new()
                }
                _ => Vec::new(),
            }
        }
        // Exchange in flight; nothing to edit or resubmit.
        CallbackState::Exchanging { .. } => Vec::new(),
    }
}

/// What the cursor points at, detached from the snapshot borrow.
enum Target {
    Header(String),
    Sender {
        id: String,
        status: SenderStatus,
        category: String,
    },
}

fn target_at_cursor(state: &AppState) -> Option<Target> {
    let snapshot = state.dashboard.snapshot.as_ref()?;
    let rows = view::project(snapshot, &state.dashboard.filter);
    match rows.get(state.dashboard.cursor)? {
        Row::CategoryHeader { category, .. } => Some(Target::Header((*category).to_string())),
        Row::Sender(sender) => Some(Target::Sender {
            id: sender.id.clone(),
            status: sender.status,
            category: sender.category.clone(),
        }),
    }
}

fn row_count(state: &AppState) -> usize {
    state
        .dashboard
        .snapshot
        .as_ref()
        .map_or(0, |snapshot| view::project(snapshot, &state.dashboard.filter).len())
}

fn clamp_cursor(state: &mut AppState) {
    let count = row_count(state);
    if count == 0 {
        state.dashboard.cursor = 0;
    } else if state.dashboard.cursor >= count {
        state.dashboard.cursor = count - 1;
    }
}

fn handle_dashboard_key(state: &mut AppState, key: &KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Char('q') => vec![UiEffect::Quit],
        KeyCode::Char('l') => logout(state),
        KeyCode::Char('r') => {
            state.dashboard.loading = true;
            vec![UiEffect::LoadDashboard]
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let count = row_count(state);
            if count > 0 && state.dashboard.cursor + 1 < count {
                state.dashboard.cursor += 1;
            }
            Vec::new()
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.dashboard.cursor = state.dashboard.cursor.saturating_sub(1);
            Vec::new()
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(Target::Header(category)) = target_at_cursor(state) {
                state.dashboard.filter.toggle(&category);
                clamp_cursor(state);
            }
            Vec::new()
        }
        KeyCode::Char('f') => {
            cycle_filter(state);
            Vec::new()
        }
        KeyCode::Char('u') => unsubscribe_at_cursor(state),
        KeyCode::Char('c') => cycle_category_at_cursor(state),
        KeyCode::Char('s') => start_scan(state, ScanScope::All),
        KeyCode::Char('g') => start_scan(state, ScanScope::Gmail),
        KeyCode::Char('o') => start_scan(state, ScanScope::Outlook),
        KeyCode::Char('1') => connect_missing(state, AuthProvider::Google),
        KeyCode::Char('2') => connect_missing(state, AuthProvider::Microsoft),
        _ => Vec::new(),
    }
}

fn connect_missing(state: &mut AppState, provider: AuthProvider) -> Vec<UiEffect> {
    let user = state.session.session().user.clone();
    let already = match (provider, &user) {
        (AuthProvider::Google, Some(u)) => u.gmail_connected,
        (AuthProvider::Microsoft, Some(u)) => u.outlook_connected,
        (_, None) => return Vec::new(),
    };
    if already {
        return Vec::new();
    }
    connect(state, provider)
}

fn start_scan(state: &mut AppState, scope: ScanScope) -> Vec<UiEffect> {
    if state.dashboard.scanning {
        return Vec::new();
    }
    let Some(user) = &state.session.session().user else {
        return Vec::new();
    };
    let connected = match scope {
        ScanScope::Gmail => user.gmail_connected,
        ScanScope::Outlook => user.outlook_connected,
        ScanScope::All => user.gmail_connected || user.outlook_connected,
    };
    if !connected {
        state.status = Some("Connect a mailbox before scanning.".to_string());
        return Vec::new();
    }
    state.dashboard.scanning = true;
    state.dashboard.scan_status = Some("Scanning your inbox...".to_string());
    vec![UiEffect::Scan { scope }]
}

fn unsubscribe_at_cursor(state: &mut AppState) -> Vec<UiEffect> {
    let Some(Target::Sender { id, status, .. }) = target_at_cursor(state) else {
        return Vec::new();
    };
    if status == SenderStatus::Unsubscribed {
        return Vec::new();
    }
    if state.dashboard.in_flight_unsubscribes.contains(&id) {
        return Vec::new();
    }
    // A prior manual outcome means the next press opens the link instead
    // of re-requesting.
    if let Some(UnsubscribeOutcome::Succeeded {
        method: mailsweep_core::models::UnsubscribeMethod::Manual,
        url: Some(url),
    }) = state.dashboard.outcomes.get(&id)
    {
        return vec![UiEffect::OpenBrowser { url: url.clone() }];
    }
    state.dashboard.in_flight_unsubscribes.insert(id.clone());
    vec![UiEffect::Unsubscribe { sender_id: id }]
}

fn cycle_category_at_cursor(state: &mut AppState) -> Vec<UiEffect> {
    let Some(Target::Sender { id, category, .. }) = target_at_cursor(state) else {
        return Vec::new();
    };
    let next = CATEGORY_ORDER
        .iter()
        .position(|c| *c == category)
        .map_or(CATEGORY_ORDER[0], |i| {
            CATEGORY_ORDER[(i + 1) % CATEGORY_ORDER.len()]
        });
    vec![UiEffect::SetCategory {
        sender_id: id,
        category: next.to_string(),
    }]
}

fn cycle_filter(state: &mut AppState) {
    let Some(snapshot) = &state.dashboard.snapshot else {
        return;
    };
    let categories: Vec<String> = view::ordered_categories(snapshot)
        .into_iter()
        .map(str::to_string)
        .collect();
    let next = match &state.dashboard.filter.active_category {
        CategoryFilter::All => categories.first().cloned().map(CategoryFilter::Category),
        CategoryFilter::Category(current) => categories
            .iter()
            .position(|c| c == current)
            .and_then(|i| categories.get(i + 1))
            .cloned()
            .map(CategoryFilter::Category),
    };
    state.dashboard.filter.active_category = next.unwrap_or(CategoryFilter::All);
    state.dashboard.cursor = 0;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mailsweep_core::models::{
        AccountKind, DashboardSnapshot, ProviderScan, ScanOutcome, SessionPayload,
        SubscriptionSender, UnsubscribeMethod, UnsubscribeReply, UserProfile,
    };
    use mailsweep_core::session::SessionStore;
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            display_name: "Dana".to_string(),
            avatar_url: None,
            gmail_connected: true,
            outlook_connected: false,
        }
    }

    fn sender(id: &str, category: &str, status: SenderStatus) -> SubscriptionSender {
        SubscriptionSender {
            id: id.to_string(),
            sender_name: None,
            sender_email: format!("{id}@test"),
            account_type: AccountKind::Gmail,
            frequency: None,
            status,
            category: category.to_string(),
        }
    }

    fn snapshot() -> DashboardSnapshot {
        let mut categories = BTreeMap::new();
        categories.insert(
            "Jobs".to_string(),
            vec![
                sender("j1", "Jobs", SenderStatus::Active),
                sender("j2", "Jobs", SenderStatus::Active),
            ],
        );
        DashboardSnapshot {
            total_senders: 2,
            total_active: 2,
            total_unsubscribed: 0,
            categories,
        }
    }

    fn logged_out_state(dir: &tempfile::TempDir) -> AppState {
        AppState::new(SessionStore::new(dir.path().join("session.json")))
    }

    fn dashboard_state(dir: &tempfile::TempDir) -> AppState {
        let mut state = logged_out_state(dir);
        state.session.login("T".to_string(), profile());
        state.screen = Screen::Dashboard;
        state.dashboard.snapshot = Some(snapshot());
        state
    }

    fn press(c: char) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )))
    }

    fn press_code(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    /// Test: startup with nothing persisted neither verifies nor loads.
    #[test]
    fn startup_without_session_stays_on_landing() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = logged_out_state(&dir);

        let effects = update(&mut state, UiEvent::Started);
        assert_eq!(effects, Vec::new());
        assert!(matches!(state.screen, Screen::Landing));
    }

    /// Test: startup with a persisted session verifies it, and a good
    /// verification lands on the dashboard with a load in flight.
    #[test]
    fn startup_restores_and_verifies_session() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut seeded = logged_out_state(&dir);
            seeded.session.login("T".to_string(), profile());
            seeded.session.save_to_disk().unwrap();
        }
        let mut state = logged_out_state(&dir);

        let effects = update(&mut state, UiEvent::Started);
        assert_eq!(effects, vec![UiEffect::VerifySession]);
        assert!(state.session.session().is_loading);

        let effects = update(&mut state, UiEvent::RestoreResult(Ok(profile())));
        assert_eq!(effects, vec![UiEffect::LoadDashboard]);
        assert!(matches!(state.screen, Screen::Dashboard));
        assert!(state.dashboard.loading);
    }

    /// Test: failed verification clears the persisted session and routes
    /// to landing.
    #[test]
    fn failed_verification_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut seeded = logged_out_state(&dir);
            seeded.session.login("T".to_string(), profile());
            seeded.session.save_to_disk().unwrap();
        }
        let mut state = logged_out_state(&dir);
        update(&mut state, UiEvent::Started);

        let effects = update(&mut state, UiEvent::RestoreResult(Err("401".to_string())));
        assert_eq!(effects, vec![UiEffect::ClearPersistedSession]);
        assert!(matches!(state.screen, Screen::Landing));
        assert!(state.session.session().user.is_none());
    }

    /// Test: connecting from landing fetches the consent URL, and the
    /// result opens a browser and shows the code prompt.
    #[test]
    fn landing_connect_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = logged_out_state(&dir);

        let effects = update(&mut state, press('g'));
        assert_eq!(
            effects,
            vec![UiEffect::FetchAuthUrl {
                provider: AuthProvider::Google
            }]
        );

        let effects = update(
            &mut state,
            UiEvent::AuthUrlFetched {
                provider: AuthProvider::Google,
                result: Ok("https://consent.test/x".to_string()),
            },
        );
        assert_eq!(
            effects,
            vec![UiEffect::OpenBrowser {
                url: "https://consent.test/x".to_string()
            }]
        );
        assert!(matches!(
            state.screen,
            Screen::Callback(CallbackState::AwaitingCode { .. })
        ));
    }

    /// Test: a second Enter while an exchange is in flight starts nothing.
    #[test]
    fn callback_submit_runs_exchange_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = logged_out_state(&dir);
        state.screen = Screen::Callback(CallbackState::AwaitingCode {
            provider: AuthProvider::Google,
            auth_url: "https://consent.test/x".to_string(),
            input: "abc123".to_string(),
        });

        let effects = update(&mut state, press_code(KeyCode::Enter));
        assert_eq!(
            effects,
            vec![UiEffect::ExchangeCode {
                provider: AuthProvider::Google,
                code: "abc123".to_string()
            }]
        );
        assert!(matches!(
            state.screen,
            Screen::Callback(CallbackState::Exchanging { .. })
        ));

        let effects = update(&mut state, press_code(KeyCode::Enter));
        assert_eq!(effects, Vec::new());
    }

    /// Test: submitting input without a code routes back to landing.
    #[test]
    fn callback_without_code_returns_to_landing() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = logged_out_state(&dir);
        state.screen = Screen::Callback(CallbackState::AwaitingCode {
            provider: AuthProvider::Google,
            auth_url: "https://consent.test/x".to_string(),
            input: "https://app.test/callback?error=denied".to_string(),
        });

        let effects = update(&mut state, press_code(KeyCode::Enter));
        assert_eq!(effects, Vec::new());
        assert!(matches!(state.screen, Screen::Landing));
    }

    /// Test: a successful exchange logs in, persists, and loads the
    /// dashboard.
    #[test]
    fn exchange_success_logs_in() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = logged_out_state(&dir);
        state.screen = Screen::Callback(CallbackState::Exchanging {
            provider: AuthProvider::Google,
        });

        let effects = update(
            &mut state,
            UiEvent::ExchangeResult {
                provider: AuthProvider::Google,
                result: Ok(SessionPayload {
                    token: "T".to_string(),
                    user: profile(),
                }),
            },
        );
        assert_eq!(
            effects,
            vec![UiEffect::PersistSession, UiEffect::LoadDashboard]
        );
        assert!(matches!(state.screen, Screen::Dashboard));
        assert_eq!(state.session.session().credential.as_deref(), Some("T"));
    }

    /// Test: an exchange result arriving outside the exchanging state is
    /// ignored.
    #[test]
    fn stale_exchange_result_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = logged_out_state(&dir);

        let effects = update(
            &mut state,
            UiEvent::ExchangeResult {
                provider: AuthProvider::Google,
                result: Ok(SessionPayload {
                    token: "T".to_string(),
                    user: profile(),
                }),
            },
        );
        assert_eq!(effects, Vec::new());
        assert!(state.session.session().user.is_none());
        assert!(matches!(state.screen, Screen::Landing));
    }

    /// Test: only one scan may run at a time.
    #[test]
    fn scan_is_exclusive_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);

        let effects = update(&mut state, press('s'));
        assert_eq!(
            effects,
            vec![UiEffect::Scan {
                scope: ScanScope::All
            }]
        );
        assert!(state.dashboard.scanning);

        let effects = update(&mut state, press('s'));
        assert_eq!(effects, Vec::new());
    }

    /// Test: scanning a disconnected mailbox is refused.
    #[test]
    fn scan_requires_connected_mailbox() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);

        let effects = update(&mut state, press('o'));
        assert_eq!(effects, Vec::new());
        assert!(!state.dashboard.scanning);
    }

    /// Test: scan completion sums per-provider counts and stays busy
    /// until the trailing reload lands.
    #[test]
    fn scan_lifecycle_ends_with_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);
        update(&mut state, press('s'));

        let outcome = ScanOutcome::PerProvider {
            gmail: Some(ProviderScan { emails_scanned: 40 }),
            outlook: Some(ProviderScan { emails_scanned: 12 }),
        };
        let effects = update(
            &mut state,
            UiEvent::ScanFinished {
                scope: ScanScope::All,
                result: Ok(outcome),
            },
        );
        assert_eq!(effects, vec![UiEffect::LoadDashboard]);
        assert_eq!(
            state.dashboard.scan_status.as_deref(),
            Some("Scanned 52 emails. Refreshing...")
        );
        assert!(state.dashboard.scanning);

        update(&mut state, UiEvent::DashboardLoaded(Ok(snapshot())));
        assert!(!state.dashboard.scanning);
        assert_eq!(state.dashboard.scan_status, None);
    }

    /// Test: a failed scan frees the scan slot and reports it.
    #[test]
    fn failed_scan_releases_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);
        update(&mut state, press('s'));

        let effects = update(
            &mut state,
            UiEvent::ScanFinished {
                scope: ScanScope::All,
                result: Err("timeout".to_string()),
            },
        );
        assert_eq!(effects, Vec::new());
        assert!(!state.dashboard.scanning);
        assert_eq!(
            state.dashboard.scan_status.as_deref(),
            Some("Scan failed. Please try again.")
        );

        let effects = update(&mut state, press('s'));
        assert_eq!(
            effects,
            vec![UiEffect::Scan {
                scope: ScanScope::All
            }]
        );
    }

    /// Test: a failed load keeps the previous snapshot visible.
    #[test]
    fn failed_load_keeps_stale_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);

        update(
            &mut state,
            UiEvent::DashboardLoaded(Err("connection refused".to_string())),
        );
        assert!(state.dashboard.snapshot.is_some());
        assert!(state.dashboard.load_error.is_some());

        update(&mut state, UiEvent::DashboardLoaded(Ok(snapshot())));
        assert_eq!(state.dashboard.load_error, None);
    }

    /// Test: a new snapshot replaces the previous one wholesale; nothing
    /// from the old one survives a shrinking reload.
    #[test]
    fn successful_load_replaces_snapshot_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);

        let mut wide = BTreeMap::new();
        wide.insert(
            "Jobs".to_string(),
            vec![
                sender("j1", "Jobs", SenderStatus::Active),
                sender("j2", "Jobs", SenderStatus::Active),
            ],
        );
        wide.insert(
            "Finance".to_string(),
            vec![sender("f1", "Finance", SenderStatus::Active)],
        );
        update(
            &mut state,
            UiEvent::DashboardLoaded(Ok(DashboardSnapshot {
                total_senders: 3,
                total_active: 3,
                total_unsubscribed: 0,
                categories: wide,
            })),
        );

        let mut narrow = BTreeMap::new();
        narrow.insert(
            "Jobs".to_string(),
            vec![sender("j1", "Jobs", SenderStatus::Active)],
        );
        update(
            &mut state,
            UiEvent::DashboardLoaded(Ok(DashboardSnapshot {
                total_senders: 1,
                total_active: 1,
                total_unsubscribed: 0,
                categories: narrow,
            })),
        );

        let snapshot = state.dashboard.snapshot.as_ref().unwrap();
        assert_eq!(snapshot.total_senders, 1);
        assert_eq!(
            snapshot.categories.keys().collect::<Vec<_>>(),
            vec!["Jobs"]
        );
        assert_eq!(
            snapshot.categories["Jobs"]
                .iter()
                .map(|s| s.id.as_str())
                .collect::<Vec<_>>(),
            vec!["j1"]
        );
    }

    /// Test: a category update reloads on success and only reports on
    /// failure.
    #[test]
    fn category_update_reloads_on_success_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);

        let effects = update(
            &mut state,
            UiEvent::CategoryUpdated(Ok(sender("j1", "Finance", SenderStatus::Active))),
        );
        assert_eq!(effects, vec![UiEffect::LoadDashboard]);

        let effects = update(
            &mut state,
            UiEvent::CategoryUpdated(Err("500".to_string())),
        );
        assert_eq!(effects, Vec::new());
        assert_eq!(
            state.status.as_deref(),
            Some("Couldn't update the category.")
        );
    }

    /// Test: unsubscribe is exclusive per sender but independent across
    /// senders.
    #[test]
    fn unsubscribe_exclusive_per_sender() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);
        state.dashboard.cursor = 1; // first sender under the Jobs header

        let effects = update(&mut state, press('u'));
        assert_eq!(
            effects,
            vec![UiEffect::Unsubscribe {
                sender_id: "j1".to_string()
            }]
        );

        // Same sender again: in flight, refused.
        let effects = update(&mut state, press('u'));
        assert_eq!(effects, Vec::new());

        // A different sender is free to start.
        state.dashboard.cursor = 2;
        let effects = update(&mut state, press('u'));
        assert_eq!(
            effects,
            vec![UiEffect::Unsubscribe {
                sender_id: "j2".to_string()
            }]
        );
    }

    /// Test: a manual outcome with a link turns the next press into
    /// opening that link.
    #[test]
    fn manual_outcome_opens_link_on_next_press() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);
        state.dashboard.cursor = 1;
        update(&mut state, press('u'));

        let effects = update(
            &mut state,
            UiEvent::UnsubscribeFinished {
                sender_id: "j1".to_string(),
                result: Ok(UnsubscribeReply::Done {
                    method: UnsubscribeMethod::Manual,
                    url: Some("https://sender.test/unsub".to_string()),
                }),
            },
        );
        assert_eq!(effects, vec![UiEffect::LoadDashboard]);

        let effects = update(&mut state, press('u'));
        assert_eq!(
            effects,
            vec![UiEffect::OpenBrowser {
                url: "https://sender.test/unsub".to_string()
            }]
        );
    }

    /// Test: a transport failure records the outcome without reloading.
    #[test]
    fn failed_unsubscribe_skips_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);
        state.dashboard.cursor = 1;
        update(&mut state, press('u'));

        let effects = update(
            &mut state,
            UiEvent::UnsubscribeFinished {
                sender_id: "j1".to_string(),
                result: Err("connection reset".to_string()),
            },
        );
        assert_eq!(effects, Vec::new());
        assert!(matches!(
            state.dashboard.outcomes.get("j1"),
            Some(UnsubscribeOutcome::Failed { .. })
        ));
        assert!(!state.dashboard.in_flight_unsubscribes.contains("j1"));
    }

    /// Test: category cycling advances through the canonical order.
    #[test]
    fn category_cycles_in_canonical_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);
        state.dashboard.cursor = 1; // j1, category Jobs

        let effects = update(&mut state, press('c'));
        assert_eq!(
            effects,
            vec![UiEffect::SetCategory {
                sender_id: "j1".to_string(),
                category: "Finance".to_string()
            }]
        );
    }

    /// Test: an unauthorized signal expires the session everywhere.
    #[test]
    fn unauthorized_expires_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);

        let effects = update(&mut state, UiEvent::Unauthorized);
        assert_eq!(effects, vec![UiEffect::ClearPersistedSession]);
        assert!(matches!(state.screen, Screen::Landing));
        assert!(state.session.session().user.is_none());
        assert!(state.dashboard.snapshot.is_none());
        assert_eq!(
            state.status.as_deref(),
            Some("Session expired. Please sign in again.")
        );
    }

    /// Test: toggling a header collapses it and clamps the cursor.
    #[test]
    fn toggle_header_clamps_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = dashboard_state(&dir);

        // Collapse at the header: 3 rows become 1.
        state.dashboard.cursor = 0;
        update(&mut state, press_code(KeyCode::Enter));
        assert!(!state.dashboard.filter.is_expanded("Jobs"));

        state.dashboard.cursor = 0;
        let effects = update(&mut state, press('j'));
        assert_eq!(effects, Vec::new());
        assert_eq!(state.dashboard.cursor, 0);
    }
}
