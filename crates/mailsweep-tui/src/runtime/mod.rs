//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here. The
//! reducer stays pure and produces effects; this module executes them.
//!
//! Async results come back through an inbox channel: handlers send a
//! `UiEvent` when they finish and the loop drains the inbox each frame.
//! Unauthorized signals from the gateway client arrive on their own
//! channel and are folded into the same event stream.

mod handlers;

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use mailsweep_core::api::{ApiClient, Unauthorized};
use mailsweep_core::config::Config;
use mailsweep_core::session::SessionStore;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, CallbackState, Screen};
use crate::{render, terminal, update};

/// Target frame interval while something is in flight (~60fps).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll interval when idle. Longer timeout keeps CPU usage down.
const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal, the state, and the gateway client. Terminal state is
/// restored on drop, panic, and Ctrl+C.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    api: ApiClient,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    unauthorized_rx: mpsc::UnboundedReceiver<Unauthorized>,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self> {
        // Panic hook goes in before we enter the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (unauthorized_tx, unauthorized_rx) = mpsc::unbounded_channel();
        let api = ApiClient::new(
            config.base_url.clone(),
            session.credential_cell(),
            unauthorized_tx,
        );
        let state = AppState::new(session);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            api,
            inbox_tx,
            inbox_rx,
            unauthorized_rx,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until the reducer asks to quit.
    pub fn run(&mut self) -> Result<()> {
        self.dispatch_event(UiEvent::Started);

        let mut dirty = true;
        while !self.state.should_quit {
            let events = self.collect_events()?;

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Only Tick triggers a render; input and async results
                // batch their visual changes to the next tick.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                self.dispatch_event(event);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    /// Collects pending events: unauthorized signals, inbox results, then
    /// terminal input, then the tick.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // One Unauthorized per batch is enough; concurrent requests may
        // all have failed against the same dead credential.
        if self.unauthorized_rx.try_recv().is_ok() {
            while self.unauthorized_rx.try_recv().is_ok() {}
            events.push(UiEvent::Unauthorized);
        }

        while let Ok(event) = self.inbox_rx.try_recv() {
            events.push(event);
        }

        let tick_interval = if self.needs_fast_poll() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        // Block until the next tick is due, unless there is already work.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    /// Fast polling while async work is in flight or the user is active.
    fn needs_fast_poll(&self) -> bool {
        let state = &self.state;
        let exchanging = matches!(
            state.screen,
            Screen::Callback(CallbackState::Exchanging { .. })
        );
        state.session.session().is_loading
            || state.dashboard.loading
            || state.dashboard.scanning
            || !state.dashboard.in_flight_unsubscribes.is_empty()
            || exchanging
            || self.last_terminal_event.elapsed() < IDLE_POLL_DURATION
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler and forwards its result into the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let future = f(self.api.clone());
        tokio::spawn(async move {
            let _ = tx.send(future.await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::OpenBrowser { url } => {
                if let Err(err) = open::that(&url) {
                    tracing::warn!(error = %err, url, "failed to open browser");
                }
            }
            UiEffect::PersistSession => {
                if let Err(err) = self.state.session.save_to_disk() {
                    tracing::warn!(error = %err, "failed to persist session");
                }
            }
            UiEffect::ClearPersistedSession => {
                if let Err(err) = self.state.session.clear_disk() {
                    tracing::warn!(error = %err, "failed to clear persisted session");
                }
            }
            UiEffect::VerifySession => self.spawn_effect(handlers::verify_session),
            UiEffect::FetchAuthUrl { provider } => {
                self.spawn_effect(move |api| handlers::fetch_auth_url(api, provider));
            }
            UiEffect::ExchangeCode { provider, code } => {
                self.spawn_effect(move |api| handlers::exchange_code(api, provider, code));
            }
            UiEffect::LoadDashboard => self.spawn_effect(handlers::load_dashboard),
            UiEffect::Scan { scope } => {
                self.spawn_effect(move |api| handlers::run_scan(api, scope));
            }
            UiEffect::Unsubscribe { sender_id } => {
                self.spawn_effect(move |api| handlers::run_unsubscribe(api, sender_id));
            }
            UiEffect::SetCategory {
                sender_id,
                category,
            } => {
                self.spawn_effect(move |api| handlers::update_category(api, sender_id, category));
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
