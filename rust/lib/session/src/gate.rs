//! Session gate: decides what a protected page renders.
//!
//! The gate is the single writer of the [`PermissionProvider`]. It turns the
//! session provider's state into one of three directives and keeps the
//! permission snapshot stable while the session is being refreshed.
//!
//! Trade-off: while the upstream session is `loading`, the previous snapshot
//! is kept. If permissions were revoked on the server in the meantime, the
//! user keeps them until the refresh resolves. Collapsing on every refresh
//! would instead hide pages the user is entitled to for the length of the
//! round-trip. Only `unauthenticated` resets the snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::decode::{Base64Decode, StandardAlphabet};
use crate::expiry::ExpiryStatus;
use crate::permission::PermissionSnapshot;
use crate::provider::PermissionProvider;
use crate::token::TokenCodec;

// ── Session provider input ──────────────────────────────────────────

/// Upstream session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// The signed-in user as the session provider reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default)]
    pub token: Option<String>,
    /// Raw permission payload, see [`crate::permission`].
    #[serde(default)]
    pub permission_res: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub user: Option<SessionUser>,
}

/// `{data: {user: {token, permissionRes}} | null, status}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub data: Option<SessionData>,
    pub status: SessionStatus,
}

impl SessionState {
    pub fn loading() -> Self {
        Self {
            data: None,
            status: SessionStatus::Loading,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            data: None,
            status: SessionStatus::Unauthenticated,
        }
    }

    pub fn authenticated(token: impl Into<String>, permissions: Option<Value>) -> Self {
        Self {
            data: Some(SessionData {
                user: Some(SessionUser {
                    token: Some(token.into()),
                    permission_res: permissions,
                }),
            }),
            status: SessionStatus::Authenticated,
        }
    }

    fn user(&self) -> Option<&SessionUser> {
        self.data.as_ref().and_then(|d| d.user.as_ref())
    }

    pub fn token(&self) -> Option<&str> {
        self.user().and_then(|u| u.token.as_deref())
    }

    pub fn permission_payload(&self) -> Option<&Value> {
        self.user().and_then(|u| u.permission_res.as_ref())
    }
}

// ── Directives ──────────────────────────────────────────────────────

/// Where to send a user without a valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    /// Full location, including the `expired` flag when set.
    pub location: String,
    /// A token was present but had expired or could not be read.
    pub expired: bool,
}

/// What a protected page should render.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderDirective<C> {
    /// Upstream session is still being resolved.
    ShowLoading,
    /// No valid session.
    Redirect(LoginRedirect),
    /// Valid session; render `children` with `permissions` attached.
    Render {
        children: C,
        permissions: Arc<PermissionSnapshot>,
    },
}

// ── SessionGate ─────────────────────────────────────────────────────

/// Snapshot currently published, with the payload it was built from.
struct Built {
    payload: Option<Value>,
    snapshot: Arc<PermissionSnapshot>,
}

/// Guards rendering and owns the permission snapshot lifecycle.
pub struct SessionGate<D = StandardAlphabet> {
    codec: TokenCodec<D>,
    provider: Arc<PermissionProvider>,
    config: SessionConfig,
    built: Option<Built>,
}

impl SessionGate<StandardAlphabet> {
    pub fn new(provider: Arc<PermissionProvider>, config: SessionConfig) -> Self {
        Self::with_codec(TokenCodec::new(StandardAlphabet), provider, config)
    }
}

impl<D: Base64Decode> SessionGate<D> {
    pub fn with_codec(
        codec: TokenCodec<D>,
        provider: Arc<PermissionProvider>,
        config: SessionConfig,
    ) -> Self {
        Self {
            codec,
            provider,
            config,
            built: None,
        }
    }

    /// The read channel consumers subscribe to.
    pub fn provider(&self) -> &Arc<PermissionProvider> {
        &self.provider
    }

    /// Decide what to render for `session` at `now` (unix seconds).
    pub fn guard<C>(&mut self, session: &SessionState, children: C, now: i64) -> RenderDirective<C> {
        match session.status {
            SessionStatus::Unauthenticated => {
                if self.built.take().is_some() {
                    info!("session ended, permissions reset");
                    self.provider.reset();
                }
                RenderDirective::Redirect(self.redirect(false))
            }
            SessionStatus::Loading => {
                // Keep showing the page across a background refresh.
                match &self.built {
                    Some(built) if self.token_status(session, now).is_valid() => {
                        RenderDirective::Render {
                            children,
                            permissions: Arc::clone(&built.snapshot),
                        }
                    }
                    _ => RenderDirective::ShowLoading,
                }
            }
            SessionStatus::Authenticated => {
                let status = self.token_status(session, now);
                if !status.is_valid() {
                    let expired = session.token().is_some();
                    debug!(status = status.label(), "session token rejected");
                    return RenderDirective::Redirect(self.redirect(expired));
                }
                let permissions = self.snapshot_for(session.permission_payload());
                RenderDirective::Render {
                    children,
                    permissions,
                }
            }
        }
    }

    fn token_status(&self, session: &SessionState, now: i64) -> ExpiryStatus {
        ExpiryStatus::evaluate(&self.codec.decode(session.token()), now)
    }

    fn redirect(&self, expired: bool) -> LoginRedirect {
        LoginRedirect {
            location: self.config.login_location(expired),
            expired,
        }
    }

    /// Current snapshot, rebuilt and published only when the payload changed.
    fn snapshot_for(&mut self, payload: Option<&Value>) -> Arc<PermissionSnapshot> {
        if let Some(built) = &self.built {
            if built.payload.as_ref() == payload {
                return Arc::clone(&built.snapshot);
            }
        }

        let snapshot = Arc::new(PermissionSnapshot::build(payload));
        debug!(
            admin = snapshot.is_admin(),
            modules = snapshot.modules().len(),
            "permission snapshot rebuilt"
        );
        self.provider.publish(Arc::clone(&snapshot));
        self.built = Some(Built {
            payload: payload.cloned(),
            snapshot: Arc::clone(&snapshot),
        });
        snapshot
    }
}
