//! # Loop Supervisor
//!
//! Keeps long-running service loops alive across panics.
//!
//! ```text
//! spawn(loop) ──returns──→ [DONE]
//!     │
//!     └──panics──→ log ──cool-down──→ spawn(loop) ...
//! ```
//!
//! The supervised loop is expected to watch its own stop token and return
//! normally once it fires. The supervisor only decides whether to restart.

use std::any::Any;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::cancel::CancelToken;

/// Default pause before restarting a loop that panicked.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Run the loop produced by `factory`, restarting it after a panic.
///
/// `factory` is called once per (re)start, so it must rebuild the loop from
/// state that survives a panic (shared handles, not owned locals).
pub fn supervise<F, Fut>(
    name: &'static str,
    cooldown: Duration,
    stop: CancelToken,
    mut factory: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut restarts: u64 = 0;
        loop {
            match tokio::spawn(factory()).await {
                Ok(()) => {
                    debug!(loop_name = name, restarts, "Supervised loop exited");
                    return;
                }
                Err(err) if err.is_panic() => {
                    restarts += 1;
                    error!(
                        loop_name = name,
                        restarts,
                        panic = %panic_message(err.into_panic()),
                        cooldown_ms = cooldown.as_millis() as u64,
                        "Supervised loop panicked; restarting after cool-down"
                    );
                }
                Err(_) => {
                    debug!(loop_name = name, "Supervised loop aborted");
                    return;
                }
            }

            if stop
                .run_until_cancelled(tokio::time::sleep(cooldown))
                .await
                .is_none()
            {
                return;
            }
        }
    })
}

/// Render a panic payload for logging.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
