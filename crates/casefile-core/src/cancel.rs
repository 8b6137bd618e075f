//! Cooperative cancellation shared between a caller and repository calls.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use crate::{Error, Result};

/// Shared cancellation signal. Clones observe the same flag.
///
/// Repository operations check the token on entry and after every storage
/// round-trip; a token that is already cancelled when an operation starts
/// guarantees that no write happens.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
  cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
  pub fn new() -> Self { Self::default() }

  /// Signal cancellation.
  pub fn cancel(&self) { self.cancelled.store(true, Ordering::Release); }

  pub fn is_cancelled(&self) -> bool { self.cancelled.load(Ordering::Acquire) }

  /// Fail with [`Error::OperationCancelled`] if the signal is set.
  pub fn check(&self) -> Result<()> {
    if self.is_cancelled() {
      Err(Error::OperationCancelled)
    } else {
      Ok(())
    }
  }
}
