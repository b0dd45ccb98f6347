// src/cancellation.rs
//
// Cooperative cancellation for units of work.
//
// The caller (e.g. the HTTP host when a client disconnects) holds the
// `CancellationSource`; every repository call, `save_changes` and `commit`
// check the `CancellationSignal` first. Staged mutations live in memory until
// commit, so a cancelled unit of work never leaves partial writes behind.

use tokio::sync::watch;

use crate::error::{AppError, AppResult};

/// Owner side: flips the flag for every signal handed out.
#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

/// Observer side. Cheap to clone, `Send + Sync`.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Request cancellation. Has no effect on work already committed.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSignal {
    /// A signal that is never cancelled.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// `Err(AppError::Cancelled)` once cancellation was requested.
    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_is_not_cancelled() {
        let signal = CancellationSignal::never();
        assert!(!signal.is_cancelled());
        assert!(signal.check().is_ok());
    }

    #[test]
    fn test_cancel_reaches_all_signals() {
        let source = CancellationSource::new();
        let first = source.signal();
        let second = first.clone();
        assert!(!first.is_cancelled());

        source.cancel();

        assert!(source.is_cancelled());
        assert!(first.is_cancelled());
        assert!(matches!(second.check(), Err(AppError::Cancelled)));
    }

    #[test]
    fn test_signal_outlives_source() {
        let source = CancellationSource::new();
        let signal = source.signal();
        source.cancel();
        drop(source);
        assert!(signal.is_cancelled());
    }
}
