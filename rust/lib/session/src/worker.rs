use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::ConfigError;
use crate::monitor::{MonitorAction, SessionMonitor};

/// Options passed to the sign-out effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutOptions {
    /// Where to land after sign-out.
    pub callback_url: String,
}

/// Sign-out side effect (clear credentials, navigate to login).
///
/// Fire-and-forget: the monitor does not wait for it and ignores failures.
/// Implementations that need async work spawn it themselves.
pub trait SignOut: Send + Sync {
    fn sign_out(&self, options: SignOutOptions);
}

impl<F> SignOut for F
where
    F: Fn(SignOutOptions) + Send + Sync,
{
    fn sign_out(&self, options: SignOutOptions) {
        self(options)
    }
}

/// Handle to a running monitor.
///
/// Dropping the handle cancels the monitor; [`MonitorHandle::stop`] also
/// waits for the task to finish.
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Cancel the monitor and wait for its timer to be released.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start the session monitor loop.
///
/// - The initial token is evaluated immediately, before the first tick.
/// - Every `check_interval` the current token is re-evaluated.
/// - A new token value re-arms the monitor and restarts the interval.
/// - Sign-out fires at most once per token value.
///
/// The loop ends when the handle is stopped or dropped, or when the token
/// sender goes away.
///
/// Fails with [`ConfigError::ZeroInterval`] before spawning anything when the
/// configured interval is zero.
pub fn start(
    mut tokens: watch::Receiver<Option<String>>,
    sign_out: Arc<dyn SignOut>,
    clock: Arc<dyn Clock>,
    config: &SessionConfig,
) -> Result<MonitorHandle, ConfigError> {
    config.validate()?;

    let cancel = CancellationToken::new();
    let period = config.check_interval();
    let callback_url = config.login_location(true);

    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            info!("session monitor started (interval={period:?})");

            let mut monitor = SessionMonitor::new();
            let apply = |action: MonitorAction| {
                if let MonitorAction::SignOut(status) = action {
                    info!(status = status.label(), "session ended, signing out");
                    sign_out.sign_out(SignOutOptions {
                        callback_url: callback_url.clone(),
                    });
                }
            };

            let initial = tokens.borrow_and_update().clone();
            apply(monitor.observe(initial.as_deref(), clock.now_unix()));

            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("session monitor stopped");
                        break;
                    }
                    changed = tokens.changed() => {
                        if changed.is_err() {
                            info!("session monitor stopped: token source closed");
                            break;
                        }
                        let token = tokens.borrow_and_update().clone();
                        debug!(present = token.is_some(), "session token changed");
                        apply(monitor.observe(token.as_deref(), clock.now_unix()));
                        interval.reset();
                    }
                    _ = interval.tick() => {
                        apply(monitor.tick(clock.now_unix()));
                    }
                }
            }
        })
    };

    Ok(MonitorHandle {
        cancel,
        task: Some(task),
    })
}
