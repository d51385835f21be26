use thiserror::Error;

use crate::context::Context;

/// Failures surfaced to the operator
///
/// Every failure aborts the current invocation; nothing is retried
#[derive(Debug, Error)]
pub enum Error {
  #[error("{} is not a valid context, valid contexts are: {}", .given.as_deref().unwrap_or("<none>"), Context::names().join(", "))]
  InvalidContext { given: Option<String> },

  #[error("no context is set, run `govukctl set-context <name>` first")]
  ContextNotSet,

  #[error("a username is required, run `govukctl set-username <name>`")]
  MissingUsername,

  /// The identity provider call failed; its exit status and stderr are surfaced verbatim
  #[error("credential exchange failed (exit status {status}): {stderr}")]
  CredentialExchangeFailed { status: i32, stderr: String },

  #[error("profile configuration: {0}")]
  Config(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Process exit status for this failure
  ///
  /// Credential exchange failures re-raise the provider's own exit status,
  /// everything else exits 1
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::CredentialExchangeFailed { status, .. } => *status,
      _ => 1,
    }
  }
}
