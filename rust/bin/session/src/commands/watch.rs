//! `watch`: run the session monitor against the current context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use openerp_session::{SignOut, SignOutOptions, SystemClock, worker};
use tokio::sync::{mpsc, watch as channel};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;

/// Signs a context out by clearing its stored token, like `openerp logout`.
pub struct ContextSignOut {
    path: PathBuf,
    context: String,
    notify: mpsc::UnboundedSender<SignOutOptions>,
}

impl ContextSignOut {
    pub fn new(path: &Path, context: &str, notify: mpsc::UnboundedSender<SignOutOptions>) -> Self {
        Self {
            path: path.to_path_buf(),
            context: context.to_string(),
            notify,
        }
    }
}

/// Clear `context`'s token in the file at `path`.
fn clear_token(path: &Path, context: &str) -> Result<bool> {
    let mut config = ClientConfig::load(path)?;
    let cleared = config.clear_token(context);
    if cleared {
        config.save(path)?;
    }
    Ok(cleared)
}

impl SignOut for ContextSignOut {
    /// Rewrites the context file on the blocking pool, then notifies.
    fn sign_out(&self, options: SignOutOptions) {
        let path = self.path.clone();
        let context = self.context.clone();
        let notify = self.notify.clone();
        let job = move || {
            match clear_token(&path, &context) {
                Ok(true) => info!(context = %context, "token cleared"),
                Ok(false) => debug!(context = %context, "no token to clear"),
                Err(e) => warn!(context = %context, "failed to clear token: {}", e),
            }
            let _ = notify.send(options);
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
    }
}

/// Push `fresh` into the token channel if it differs. Returns true on change.
pub fn refresh(tokens: &channel::Sender<Option<String>>, fresh: Option<String>) -> bool {
    tokens.send_if_modified(|current| {
        if *current == fresh {
            return false;
        }
        *current = fresh;
        true
    })
}

/// Watch the current context's token until Ctrl-C (or sign-out, if asked).
pub async fn watch(exit_on_sign_out: bool, client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;
    config.session.validate()?;

    let ctx = config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `openerp use context <name>`."))?
        .name
        .clone();

    let (tokens, rx) = channel::channel(config.token_for(&ctx));
    let (notify, mut signed_out) = mpsc::unbounded_channel();
    let sign_out = ContextSignOut::new(client_config_path, &ctx, notify);

    let monitor = worker::start(rx, Arc::new(sign_out), Arc::new(SystemClock), &config.session)?;
    println!("Watching session for context \"{}\" (Ctrl-C to stop).", ctx);

    let mut reload = tokio::time::interval(config.session.check_interval());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            Some(options) = signed_out.recv() => {
                println!("Session expired. Log in again ({}).", options.callback_url);
                if exit_on_sign_out {
                    break;
                }
            }
            _ = reload.tick() => {
                match ClientConfig::load(client_config_path) {
                    Ok(fresh) => {
                        if refresh(&tokens, fresh.token_for(&ctx)) {
                            info!(context = %ctx, "stored token changed");
                        }
                    }
                    Err(e) => warn!("failed to reload {}: {}", client_config_path.display(), e),
                }
            }
        }
    }

    monitor.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Context;

    fn write_config(path: &Path, token: &str) {
        let config = ClientConfig {
            current_context: "stage".to_string(),
            contexts: vec![Context {
                name: "stage".to_string(),
                config_path: String::new(),
                server: "http://localhost:8080".to_string(),
                token: token.to_string(),
            }],
            session: Default::default(),
        };
        config.save(path).unwrap();
    }

    // =====================================================================
    // Sign-out effect
    // =====================================================================

    #[tokio::test]
    async fn sign_out_clears_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_config(&path, "a.b.c");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sign_out = ContextSignOut::new(&path, "stage", tx);
        sign_out.sign_out(SignOutOptions {
            callback_url: "/login?expired=true".to_string(),
        });

        // Notification follows the file write.
        assert_eq!(rx.recv().await.unwrap().callback_url, "/login?expired=true");
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.token_for("stage"), None);
        assert_eq!(config.contexts[0].server, "http://localhost:8080");
    }

    #[tokio::test]
    async fn sign_out_notifies_even_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let (tx, mut rx) = mpsc::unbounded_channel();
        ContextSignOut::new(&path, "stage", tx).sign_out(SignOutOptions {
            callback_url: "/login?expired=true".to_string(),
        });

        assert!(rx.recv().await.is_some());
        assert!(!path.exists());
    }

    #[test]
    fn sign_out_outside_runtime_runs_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_config(&path, "a.b.c");

        let (tx, mut rx) = mpsc::unbounded_channel();
        ContextSignOut::new(&path, "stage", tx).sign_out(SignOutOptions {
            callback_url: "/login?expired=true".to_string(),
        });

        assert!(rx.try_recv().is_ok());
        assert_eq!(ClientConfig::load(&path).unwrap().token_for("stage"), None);
    }

    // =====================================================================
    // Token reload
    // =====================================================================

    #[test]
    fn refresh_only_on_change() {
        let (tokens, mut rx) = channel::channel(Some("a".to_string()));
        rx.borrow_and_update();

        assert!(!refresh(&tokens, Some("a".to_string())));
        assert!(!rx.has_changed().unwrap());

        assert!(refresh(&tokens, Some("b".to_string())));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("b"));

        assert!(refresh(&tokens, None));
        assert_eq!(*rx.borrow(), None);
    }
}
