//! OpenERP session core: token expiry and permission snapshots for the
//! admin dashboard.
//!
//! The dashboard receives a session from its session provider
//! (`{data: {user: {token, permissionRes}}, status}`). This crate turns that
//! into the two things every page needs:
//!
//! - whether the session is still usable (token expiry, checked on a timer
//!   and signed out exactly once when it lapses),
//! - what the user may do (an immutable permission snapshot shared with
//!   every consumer).
//!
//! # Pipeline
//!
//! ```text
//! token ──TokenCodec──▶ Claims ──ExpiryStatus::evaluate(now)──▶ Valid/Expired/Invalid
//!                                      │
//!                   SessionMonitor ◀───┤ (worker::start polls, fires SignOut once)
//!                                      │
//! permissionRes ──PermissionSnapshot::build──▶ PermissionProvider ──▶ use_permission
//!                                      │
//!                   SessionGate ◀──────┘ (ShowLoading / Redirect / Render)
//! ```
//!
//! Everything except the worker is synchronous and pure or single-owner.
//! Nothing panics on malformed input: decode failures, missing claims and
//! unusable permission payloads all fail closed.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use openerp_session::*;
//!
//! let config = SessionConfig::default();
//! let provider = Arc::new(PermissionProvider::new());
//! let mut gate = SessionGate::new(provider.clone(), config.clone());
//!
//! match gate.guard(&session, page, SystemClock.now_unix()) {
//!     RenderDirective::ShowLoading => spinner(),
//!     RenderDirective::Redirect(r) => navigate(&r.location),
//!     RenderDirective::Render { children, permissions } => render(children, permissions),
//! }
//!
//! let (tokens, rx) = tokio::sync::watch::channel(session.token().map(String::from));
//! let monitor = worker::start(rx, Arc::new(my_sign_out), Arc::new(SystemClock), &config)?;
//! ```

pub mod claims;
pub mod clock;
pub mod config;
pub mod decode;
pub mod error;
pub mod expiry;
pub mod gate;
pub mod monitor;
pub mod permission;
pub mod provider;
pub mod token;
pub mod worker;

// Re-export primary types at crate root.
pub use claims::Claims;
pub use clock::{Clock, SystemClock};
pub use config::SessionConfig;
pub use decode::{Base64Decode, StandardAlphabet, UrlSafeAlphabet};
pub use error::{ConfigError, TokenError};
pub use expiry::{ExpiryStatus, format_remaining};
pub use gate::{LoginRedirect, RenderDirective, SessionData, SessionGate, SessionState, SessionStatus, SessionUser};
pub use monitor::{MonitorAction, MonitorState, SessionMonitor};
pub use permission::{PermissionGrant, PermissionPayload, PermissionSnapshot};
pub use provider::{PermissionProvider, SubscriptionId, use_permission};
pub use token::{TokenCodec, decode_token};
pub use worker::{MonitorHandle, SignOut, SignOutOptions};
