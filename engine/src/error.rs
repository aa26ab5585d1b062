//! Error handling for the matching core.
//!
//! Per §7 of the spec, malformed ingress and unknown cancel targets are
//! ordinary, recoverable conditions; internal invariant violations are not.
//! There's no transactional rollback for a half-mutated book, so a detected
//! invariant violation aborts the process rather than limping on.

use thiserror::Error;

/// Errors surfaced while decoding a single ingress frame into a [`crate::Command`].
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed command frame: {0}")]
    Malformed(String),
    #[error("connection read error: {0}")]
    Io(String),
}

/// Logs and aborts the process. Used exclusively for conditions that §7
/// classifies as fatal invariant violations (e.g. an attempt to rest an
/// order with zero remaining count). Recovering would require transactional
/// books, which this engine does not have.
#[track_caller]
pub fn fatal(msg: &str) -> ! {
    let location = std::panic::Location::caller();
    tracing::error!(target: "engine::invariant", %msg, %location, "fatal invariant violation; aborting process");
    std::process::abort()
}
