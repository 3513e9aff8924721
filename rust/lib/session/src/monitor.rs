//! Session expiry state machine.
//!
//! ```text
//!            observe(Some(t))                 tick: expired/invalid
//!   Idle ─────────────────────▶ Armed{t} ─────────────────────────▶ Fired{t}
//!    ▲                            │  ▲                                 │
//!    │      observe(None)         │  │ tick: valid                     │
//!    └────────────────────────────┘  └─┘                               │
//!    ▲                                                                 │
//!    └──────────── observe(None) / observe(Some(t')) re-arms ◀─────────┘
//! ```
//!
//! `Fired` is terminal for its token value: only observing a different
//! token (a new login) leaves it. Sign-out therefore fires at most once per
//! token without any flag to remember.
//!
//! This module is pure; the timer lives in [`crate::worker`].

use crate::decode::{Base64Decode, StandardAlphabet};
use crate::expiry::ExpiryStatus;
use crate::token::TokenCodec;

/// Monitor state for the watched token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorState {
    /// No token.
    Idle,
    /// Token present, not yet known to be expired.
    Armed { token: String },
    /// Sign-out has been requested for this token.
    Fired { token: String },
}

impl MonitorState {
    /// The token currently watched, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            MonitorState::Idle => None,
            MonitorState::Armed { token } | MonitorState::Fired { token } => Some(token),
        }
    }

    pub fn is_fired(&self) -> bool {
        matches!(self, MonitorState::Fired { .. })
    }
}

/// What the driver has to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorAction {
    /// Nothing.
    Continue,
    /// Invoke the sign-out effect, once. Carries the status that caused it.
    SignOut(ExpiryStatus),
}

/// Expiry state machine over a single watched token value.
#[derive(Debug, Clone)]
pub struct SessionMonitor<D = StandardAlphabet> {
    codec: TokenCodec<D>,
    state: MonitorState,
}

impl SessionMonitor<StandardAlphabet> {
    pub fn new() -> Self {
        Self::with_codec(TokenCodec::new(StandardAlphabet))
    }
}

impl Default for SessionMonitor<StandardAlphabet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Base64Decode> SessionMonitor<D> {
    pub fn with_codec(codec: TokenCodec<D>) -> Self {
        Self {
            codec,
            state: MonitorState::Idle,
        }
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Observe the watched token value.
    ///
    /// A value different from the current one re-arms the machine and
    /// evaluates it immediately, so an already-expired token is caught
    /// without waiting for the first tick. The same value is a no-op.
    pub fn observe(&mut self, token: Option<&str>, now: i64) -> MonitorAction {
        if self.state.token() == token {
            return MonitorAction::Continue;
        }
        match token {
            None => {
                self.state = MonitorState::Idle;
                MonitorAction::Continue
            }
            Some(token) => {
                self.state = MonitorState::Armed {
                    token: token.to_string(),
                };
                self.tick(now)
            }
        }
    }

    /// Periodic re-evaluation. Only `Armed` does any work.
    pub fn tick(&mut self, now: i64) -> MonitorAction {
        let MonitorState::Armed { token } = &self.state else {
            return MonitorAction::Continue;
        };

        let status = ExpiryStatus::evaluate(&self.codec.decode(Some(token)), now);
        if status.is_valid() {
            return MonitorAction::Continue;
        }

        let token = token.clone();
        self.state = MonitorState::Fired { token };
        MonitorAction::SignOut(status)
    }
}
