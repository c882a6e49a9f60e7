//! # Cancellation Tokens
//!
//! Caller-side cancellation built on `tokio::sync::watch` shutdown channels.
//!
//! A [`CancelToken`] fires when any of the following happens:
//!
//! - its own [`CancelHandle`] (or any ancestor's) calls `cancel()`
//! - that handle is dropped
//! - the token's deadline passes
//!
//! Children inherit every ancestor signal and the earliest deadline, so a
//! per-round token derived from a service-wide token stops with either.

use futures::future::select_all;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Owning side of a cancellation signal.
#[derive(Debug)]
#[must_use = "dropping a CancelHandle cancels its tokens"]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether `cancel()` has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observing side of one or more cancellation signals plus an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    signals: Vec<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Create a fresh root token and its handle.
    pub fn new() -> (CancelHandle, CancelToken) {
        CancelToken::never().child()
    }

    /// A token that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// Derive a child that fires with this token or with its own handle.
    pub fn child(&self) -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        let mut signals = self.signals.clone();
        signals.push(rx);
        (
            CancelHandle { tx },
            CancelToken {
                signals,
                deadline: self.deadline,
            },
        )
    }

    /// Derive a token that additionally fires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a token that additionally fires at `deadline`.
    ///
    /// The earlier of the inherited and the new deadline wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing <= deadline => existing,
            _ => deadline,
        };
        Self {
            signals: self.signals.clone(),
            deadline: Some(deadline),
        }
    }

    /// Absolute deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if any.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Non-blocking check.
    pub fn is_cancelled(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        self.signals
            .iter()
            .any(|rx| *rx.borrow() || rx.has_changed().is_err())
    }

    /// Resolve once the token fires.
    pub async fn cancelled(&self) {
        let waits: Vec<_> = self
            .signals
            .iter()
            .cloned()
            .map(|mut rx| {
                Box::pin(async move {
                    // Err means the handle was dropped, which also cancels.
                    let _ = rx.wait_for(|cancelled| *cancelled).await;
                })
            })
            .collect();

        let signal = async move {
            if waits.is_empty() {
                std::future::pending::<()>().await;
            } else {
                select_all(waits).await;
            }
        };

        let timer = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = signal => {}
            _ = timer => {}
        }
    }

    /// Drive `fut` to completion unless the token fires first.
    ///
    /// Returns `None` when cancelled; `fut` is dropped in that case.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}
