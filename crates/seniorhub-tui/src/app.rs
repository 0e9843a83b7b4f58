//! Application state management for the SeniorHub TUI.
//!
//! `App` wraps the `SessionShell` with the UI state: which tile is selected,
//! the status line, and the sign-in attempt running in the background.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use seniorhub_core::auth::{AuthError, SignInCancel};
use seniorhub_core::models::{dashboard_tiles, MenuItem};
use seniorhub_core::{HouseholdStatus, Session, SessionShell, ShellView};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background sign-in channel.
/// Only one attempt runs at a time.
const CHANNEL_BUFFER_SIZE: usize = 1;

const HOUSEHOLD_TILE_ID: &str = "household";

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

type SignInResult = Result<Session, AuthError>;

/// Main application state container
pub struct App {
    pub shell: SessionShell,
    pub state: AppState,
    pub tiles: Vec<MenuItem>,
    pub selected_tile: usize,
    pub household_status: HouseholdStatus,
    pub status_message: Option<String>,

    sign_in_rx: mpsc::Receiver<SignInResult>,
    sign_in_tx: mpsc::Sender<SignInResult>,
    sign_in_cancel: Option<SignInCancel>,
}

impl App {
    pub fn new(shell: SessionShell) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            shell,
            state: AppState::Normal,
            tiles: dashboard_tiles(),
            selected_tile: 0,
            household_status: HouseholdStatus::None,
            status_message: None,
            sign_in_rx: rx,
            sign_in_tx: tx,
            sign_in_cancel: None,
        }
    }

    pub fn view(&self) -> ShellView {
        self.shell.view()
    }

    pub fn is_signing_in(&self) -> bool {
        self.sign_in_cancel.is_some()
    }

    /// Restore a saved session and refresh what the dashboard shows
    pub fn mount(&mut self) {
        if self.shell.mount() == ShellView::Dashboard {
            self.on_signed_in();
        }
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    /// Open the browser sign-in and wait for it in the background
    pub fn start_sign_in(&mut self) {
        if self.is_signing_in() {
            return;
        }
        let attempt = match self.shell.begin_sign_in() {
            Ok(attempt) => attempt,
            Err(e) => {
                warn!(error = %e, "Could not start sign-in");
                self.status_message = Some(e.to_string());
                return;
            }
        };

        let cancel = SignInCancel::new();
        self.sign_in_cancel = Some(cancel.clone());
        self.status_message = Some("Waiting for the browser sign-in...".to_string());

        let tx = self.sign_in_tx.clone();
        tokio::spawn(async move {
            let result = attempt.run(&cancel).await;
            if tx.send(result).await.is_err() {
                debug!("Sign-in result dropped, app is gone");
            }
        });
    }

    pub fn cancel_sign_in(&mut self) {
        if let Some(ref cancel) = self.sign_in_cancel {
            info!("Cancelling sign-in");
            cancel.cancel();
        }
    }

    /// Development-only shortcut with the demo user
    pub fn sign_in_demo(&mut self) {
        if self.shell.sign_in_demo().is_some() {
            self.on_signed_in();
        } else {
            self.status_message = Some("Demo sign-in is only available in development".to_string());
        }
    }

    pub fn logout(&mut self) {
        self.cancel_sign_in();
        self.shell.logout();
        self.selected_tile = 0;
        self.household_status = HouseholdStatus::None;
        self.status_message = Some("Signed out".to_string());
    }

    fn on_signed_in(&mut self) {
        self.household_status = self.shell.household_status();
        self.selected_tile = 0;
        self.status_message = self
            .shell
            .session()
            .map(|s| format!("Welcome, {}", s.user.display_name()));
    }

    /// Apply a finished sign-in attempt, if one has arrived
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.sign_in_rx.try_recv() {
            self.sign_in_cancel = None;
            match self.shell.complete_sign_in(result).map(|_| ()) {
                Ok(()) => self.on_signed_in(),
                Err(e) => self.status_message = Some(e.to_string()),
            }
        }
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    pub fn selected(&self) -> Option<&MenuItem> {
        self.tiles.get(self.selected_tile)
    }

    pub fn select_next(&mut self) {
        if !self.tiles.is_empty() {
            self.selected_tile = (self.selected_tile + 1) % self.tiles.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.tiles.is_empty() {
            self.selected_tile = (self.selected_tile + self.tiles.len() - 1) % self.tiles.len();
        }
    }

    /// Act on the selected tile. Only household setup does anything locally.
    pub fn activate_selected(&mut self) {
        let Some(tile) = self.selected() else {
            return;
        };
        if !tile.enabled {
            return;
        }
        if tile.id == HOUSEHOLD_TILE_ID {
            self.shell.mark_household_completed();
            self.household_status = self.shell.household_status();
            self.status_message = Some("Household set up".to_string());
        } else {
            self.status_message = Some(format!("{} is coming soon", tile.title));
        }
    }
}
