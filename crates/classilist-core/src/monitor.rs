//! Progress reporting and cooperative cancellation

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Signal raised when a cancellation request has been observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execution cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Shared cancellation flag.
///
/// Clones observe the same flag, so a caller can hand one clone to a writer
/// and keep another to request cancellation (from another thread, a timer,
/// or a UI callback).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Receives progress updates and answers cancellation polls.
///
/// Writers call [`set_progress`](ExecutionMonitor::set_progress) once per row
/// and [`check_cancelled`](ExecutionMonitor::check_cancelled) at every row
/// boundary.
pub trait ExecutionMonitor {
    /// Report progress. `fraction` is in `0.0..=1.0` when the total amount
    /// of work is known, `None` otherwise.
    fn set_progress(&mut self, fraction: Option<f64>, message: &str);

    /// Check whether cancellation has been requested
    fn is_cancelled(&self) -> bool;

    /// Return [`Cancelled`] if cancellation has been requested
    fn check_cancelled(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

impl ExecutionMonitor for CancellationToken {
    fn set_progress(&mut self, _fraction: Option<f64>, _message: &str) {}

    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

impl<M: ExecutionMonitor + ?Sized> ExecutionMonitor for &mut M {
    fn set_progress(&mut self, fraction: Option<f64>, message: &str) {
        (**self).set_progress(fraction, message)
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Monitor that logs progress through `tracing` and delegates cancellation
/// to a [`CancellationToken`]
#[derive(Debug, Clone, Default)]
pub struct LoggingMonitor {
    token: CancellationToken,
    last_fraction: Option<f64>,
}

impl LoggingMonitor {
    /// Create a monitor observing the given token
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            last_fraction: None,
        }
    }

    /// The token this monitor observes
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Last reported progress fraction, if any
    pub fn last_fraction(&self) -> Option<f64> {
        self.last_fraction
    }
}

impl ExecutionMonitor for LoggingMonitor {
    fn set_progress(&mut self, fraction: Option<f64>, message: &str) {
        if fraction.is_some() {
            self.last_fraction = fraction;
        }
        match fraction {
            Some(f) => tracing::debug!(progress = f, "{message}"),
            None => tracing::debug!("{message}"),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
